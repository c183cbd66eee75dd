//! Admin editor state for composing or editing a post.

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use toolreview_core::domain::{Post, Section, SectionBody, SectionKind, parse_tag_list};

use crate::api::{ClientError, ImageAttachment, PostDraft};
use crate::cache::PostCache;

/// Editable section fields. Which ones matter depends on the section type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Content,
    /// One item per line.
    Items,
    ToolName,
    ToolBestFor,
    /// One entry per line.
    ToolPros,
    /// One entry per line.
    ToolCons,
}

impl EditorField {
    fn tool_key(self) -> Option<&'static str> {
        match self {
            EditorField::ToolName => Some("name"),
            EditorField::ToolBestFor => Some("bestFor"),
            EditorField::ToolPros => Some("pros"),
            EditorField::ToolCons => Some("cons"),
            EditorField::Content | EditorField::Items => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("no section at index {index} (the post has {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("unknown section type `{0}`")]
    UnknownType(String),

    #[error("Title is required")]
    MissingTitle,
}

#[derive(Debug, Clone, Default)]
pub struct PostEditor {
    editing: Option<Uuid>,
    title: String,
    summary: String,
    tags: String,
    sections: Vec<Section>,
    image: Option<ImageAttachment>,
}

impl PostEditor {
    /// An empty editor for a new post.
    pub fn new() -> Self {
        Self::default()
    }

    /// An editor seeded with an existing post.
    pub fn for_post(post: &Post) -> Self {
        Self {
            editing: Some(post.id),
            title: post.title.clone(),
            summary: post.summary.clone().unwrap_or_default(),
            tags: post.tags.join(", "),
            sections: post.sections.clone(),
            image: None,
        }
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    /// Comma separated, as typed.
    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.tags = tags.into();
    }

    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.image = Some(image);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Append an empty text section.
    pub fn add_section(&mut self) {
        self.sections.push(Section::empty(SectionKind::Text));
    }

    pub fn remove_section(&mut self, index: usize) -> Result<Section, EditorError> {
        self.check(index)?;
        Ok(self.sections.remove(index))
    }

    /// Replace the section with an empty one of another type. Content is lost.
    pub fn change_section_type(&mut self, index: usize, type_name: &str) -> Result<(), EditorError> {
        self.check(index)?;
        let kind: SectionKind = type_name
            .parse()
            .map_err(|_| EditorError::UnknownType(type_name.to_string()))?;
        self.sections[index] = Section::empty(kind);
        Ok(())
    }

    /// Set one field of a section. A field the section's type does not use
    /// is kept on the section but has no effect on how it renders.
    pub fn edit_field(
        &mut self,
        index: usize,
        field: EditorField,
        value: &str,
    ) -> Result<(), EditorError> {
        self.check(index)?;
        let section = &mut self.sections[index];

        match (&mut section.body, field) {
            (
                SectionBody::Text { content }
                | SectionBody::Heading { content }
                | SectionBody::Image { content },
                EditorField::Content,
            ) => *content = value.to_string(),
            (
                SectionBody::List { items } | SectionBody::Checklist { items },
                EditorField::Items,
            ) => *items = lines(value),
            (SectionBody::Tool(tool), EditorField::ToolName) => tool.name = value.to_string(),
            (SectionBody::Tool(tool), EditorField::ToolBestFor) => {
                tool.best_for = value.to_string()
            }
            (SectionBody::Tool(tool), EditorField::ToolPros) => tool.pros = lines(value),
            (SectionBody::Tool(tool), EditorField::ToolCons) => tool.cons = lines(value),
            (_, field) => stash(&mut section.extra, field, value),
        }
        Ok(())
    }

    /// The complete submission.
    pub fn draft(&self) -> Result<PostDraft, EditorError> {
        if self.title.trim().is_empty() {
            return Err(EditorError::MissingTitle);
        }

        Ok(PostDraft {
            title: self.title.trim().to_string(),
            summary: self.summary.clone(),
            tags: parse_tag_list(&self.tags),
            sections: self.sections.clone(),
            image: self.image.clone(),
        })
    }

    /// Create or update the post through the cache.
    pub async fn submit(&self, cache: &PostCache) -> Result<Post, ClientError> {
        let draft = self
            .draft()
            .map_err(|e| ClientError::InvalidInput(e.to_string()))?;

        match self.editing {
            Some(id) => cache.edit_post(id, &draft).await,
            None => cache.add_post(&draft).await,
        }
    }

    fn check(&self, index: usize) -> Result<(), EditorError> {
        if index < self.sections.len() {
            Ok(())
        } else {
            Err(EditorError::OutOfRange {
                index,
                len: self.sections.len(),
            })
        }
    }
}

fn lines(value: &str) -> Vec<String> {
    value.lines().map(str::to_string).collect()
}

fn strings(values: Vec<String>) -> Value {
    Value::Array(values.into_iter().map(Value::String).collect())
}

/// Store a field the active type ignores under its wire name.
fn stash(extra: &mut Map<String, Value>, field: EditorField, value: &str) {
    match field.tool_key() {
        None => {
            let stored = match field {
                EditorField::Items => strings(lines(value)),
                _ => Value::String(value.to_string()),
            };
            let key = if field == EditorField::Items { "items" } else { "content" };
            extra.insert(key.to_string(), stored);
        }
        Some(key) => {
            let stored = match field {
                EditorField::ToolPros | EditorField::ToolCons => strings(lines(value)),
                _ => Value::String(value.to_string()),
            };
            let tool = extra
                .entry("tool")
                .or_insert_with(|| Value::Object(Map::new()));
            if !tool.is_object() {
                *tool = Value::Object(Map::new());
            }
            if let Value::Object(map) = tool {
                map.insert(key.to_string(), stored);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolreview_core::domain::ToolReview;

    fn editor_with(sections: Vec<Section>) -> PostEditor {
        let mut editor = PostEditor::new();
        editor.sections = sections;
        editor
    }

    #[test]
    fn test_add_section_appends_empty_text() {
        let mut editor = PostEditor::new();

        editor.add_section();
        editor.add_section();

        assert_eq!(editor.sections(), &[Section::text(""), Section::text("")]);
    }

    #[test]
    fn test_remove_section_keeps_order() {
        let mut editor = editor_with(vec![
            Section::heading("a"),
            Section::text("b"),
            Section::text("c"),
        ]);

        let removed = editor.remove_section(1).unwrap();

        assert_eq!(removed, Section::text("b"));
        assert_eq!(editor.sections(), &[Section::heading("a"), Section::text("c")]);
    }

    #[test]
    fn test_change_type_discards_content() {
        let mut editor = editor_with(vec![Section::text("lost")]);

        editor.change_section_type(0, "tool").unwrap();

        assert_eq!(editor.sections()[0], Section::tool(ToolReview::default()));
        assert_eq!(
            editor.change_section_type(0, "poll"),
            Err(EditorError::UnknownType("poll".to_string()))
        );
    }

    #[test]
    fn test_edit_fields_by_type() {
        let mut editor = editor_with(vec![
            Section::empty(SectionKind::List),
            Section::empty(SectionKind::Tool),
        ]);

        editor.edit_field(0, EditorField::Items, "one\ntwo").unwrap();
        editor.edit_field(1, EditorField::ToolName, "Zed").unwrap();
        editor.edit_field(1, EditorField::ToolBestFor, "speed").unwrap();
        editor.edit_field(1, EditorField::ToolPros, "fast\nnative").unwrap();

        assert_eq!(editor.sections()[0], Section::list(["one", "two"]));
        assert_eq!(
            editor.sections()[1],
            Section::tool(ToolReview {
                name: "Zed".into(),
                best_for: "speed".into(),
                pros: vec!["fast".into(), "native".into()],
                cons: vec![],
            })
        );
    }

    #[test]
    fn test_irrelevant_field_is_stored_but_ignored() {
        let mut editor = editor_with(vec![Section::heading("Keep")]);

        editor.edit_field(0, EditorField::Items, "x").unwrap();
        editor.edit_field(0, EditorField::ToolName, "Zed").unwrap();

        let section = &editor.sections()[0];
        assert_eq!(section.body, SectionBody::Heading { content: "Keep".into() });
        assert_eq!(section.extra["items"], serde_json::json!(["x"]));
        assert_eq!(section.extra["tool"]["name"], "Zed");
    }

    #[test]
    fn test_out_of_range_index() {
        let mut editor = editor_with(vec![Section::text("only")]);

        assert_eq!(
            editor.edit_field(3, EditorField::Content, "x"),
            Err(EditorError::OutOfRange { index: 3, len: 1 })
        );
        assert!(editor.remove_section(1).is_err());
    }

    #[test]
    fn test_draft_splits_tags_and_requires_title() {
        let mut editor = PostEditor::new();
        assert_eq!(editor.draft(), Err(EditorError::MissingTitle));

        editor.set_title("  Review ");
        editor.set_tags("ai, coding ,, ");
        editor.add_section();
        editor.edit_field(0, EditorField::Content, "Hello").unwrap();

        let draft = editor.draft().unwrap();
        assert_eq!(draft.title, "Review");
        assert_eq!(draft.tags, vec!["ai", "coding"]);
        assert_eq!(draft.sections, vec![Section::text("Hello")]);
    }
}
