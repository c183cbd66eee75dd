//! Typed content blocks that make up a post body.
//!
//! On the wire a section is a JSON object discriminated by its `type` field.
//! Known types carry a typed payload; everything else on the object (fields
//! that belong to another type, or a whole section of a type this build does
//! not know about) is kept in [`Section::extra`] and written back unchanged.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Discriminant of the section types this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Text,
    Heading,
    List,
    Checklist,
    Tool,
    Image,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Text,
        SectionKind::Heading,
        SectionKind::List,
        SectionKind::Checklist,
        SectionKind::Tool,
        SectionKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Text => "text",
            SectionKind::Heading => "heading",
            SectionKind::List => "list",
            SectionKind::Checklist => "checklist",
            SectionKind::Tool => "tool",
            SectionKind::Image => "image",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SectionError::UnknownKind(s.to_string()))
    }
}

/// Payload of a `tool` review block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolReview {
    pub name: String,
    pub best_for: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl ToolReview {
    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert("bestFor".into(), Value::String(self.best_for.clone()));
        map.insert("pros".into(), strings_value(&self.pros));
        map.insert("cons".into(), strings_value(&self.cons));
        Value::Object(map)
    }
}

/// The typed payload of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Text { content: String },
    Heading { content: String },
    List { items: Vec<String> },
    Checklist { items: Vec<String> },
    Tool(ToolReview),
    Image { content: String },
    /// A `type` this build does not recognise. Its fields live in `extra`.
    Unknown { type_name: String },
}

/// One ordered block of a post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub body: SectionBody,
    /// Fields not consumed by `body`, preserved verbatim.
    pub extra: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("section is missing a string `type` tag")]
    MissingType,

    #[error("unknown section type `{0}`")]
    UnknownKind(String),

    #[error("section of type `{kind}` has an invalid `{field}` field: {source}")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Section {
    pub fn new(body: SectionBody) -> Self {
        Self {
            body,
            extra: Map::new(),
        }
    }

    /// An empty section of the given kind, as the editor creates it.
    pub fn empty(kind: SectionKind) -> Self {
        let body = match kind {
            SectionKind::Text => SectionBody::Text {
                content: String::new(),
            },
            SectionKind::Heading => SectionBody::Heading {
                content: String::new(),
            },
            SectionKind::List => SectionBody::List { items: Vec::new() },
            SectionKind::Checklist => SectionBody::Checklist { items: Vec::new() },
            SectionKind::Tool => SectionBody::Tool(ToolReview::default()),
            SectionKind::Image => SectionBody::Image {
                content: String::new(),
            },
        };
        Self::new(body)
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(SectionBody::Text {
            content: content.into(),
        })
    }

    pub fn heading(content: impl Into<String>) -> Self {
        Self::new(SectionBody::Heading {
            content: content.into(),
        })
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SectionBody::List {
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn checklist<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SectionBody::Checklist {
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn tool(tool: ToolReview) -> Self {
        Self::new(SectionBody::Tool(tool))
    }

    pub fn image(content: impl Into<String>) -> Self {
        Self::new(SectionBody::Image {
            content: content.into(),
        })
    }

    /// The recognised kind, or `None` for a section of an unknown type.
    pub fn kind(&self) -> Option<SectionKind> {
        match &self.body {
            SectionBody::Text { .. } => Some(SectionKind::Text),
            SectionBody::Heading { .. } => Some(SectionKind::Heading),
            SectionBody::List { .. } => Some(SectionKind::List),
            SectionBody::Checklist { .. } => Some(SectionKind::Checklist),
            SectionBody::Tool(_) => Some(SectionKind::Tool),
            SectionBody::Image { .. } => Some(SectionKind::Image),
            SectionBody::Unknown { .. } => None,
        }
    }

    /// The `type` tag as it appears on the wire.
    pub fn type_name(&self) -> &str {
        match &self.body {
            SectionBody::Unknown { type_name } => type_name,
            _ => self.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Build a section from its raw JSON object.
    ///
    /// Missing payload fields of a known type default to empty values.
    pub fn from_raw(mut raw: Map<String, Value>) -> Result<Self, SectionError> {
        let type_name = match raw.remove("type") {
            Some(Value::String(name)) => name,
            _ => return Err(SectionError::MissingType),
        };

        let body = match type_name.as_str() {
            "text" => SectionBody::Text {
                content: take_field(&mut raw, "text", "content")?,
            },
            "heading" => SectionBody::Heading {
                content: take_field(&mut raw, "heading", "content")?,
            },
            "list" => SectionBody::List {
                items: take_field(&mut raw, "list", "items")?,
            },
            "checklist" => SectionBody::Checklist {
                items: take_field(&mut raw, "checklist", "items")?,
            },
            "tool" => SectionBody::Tool(take_field(&mut raw, "tool", "tool")?),
            "image" => SectionBody::Image {
                content: take_field(&mut raw, "image", "content")?,
            },
            _ => SectionBody::Unknown {
                type_name: type_name.clone(),
            },
        };

        Ok(Self { body, extra: raw })
    }

    /// The raw JSON object for this section, payload and extras merged.
    pub fn to_raw(&self) -> Map<String, Value> {
        let mut raw = self.extra.clone();
        raw.insert("type".into(), Value::String(self.type_name().to_string()));
        match &self.body {
            SectionBody::Text { content }
            | SectionBody::Heading { content }
            | SectionBody::Image { content } => {
                raw.insert("content".into(), Value::String(content.clone()));
            }
            SectionBody::List { items } | SectionBody::Checklist { items } => {
                raw.insert("items".into(), strings_value(items));
            }
            SectionBody::Tool(tool) => {
                raw.insert("tool".into(), tool.to_value());
            }
            SectionBody::Unknown { .. } => {}
        }
        raw
    }
}

fn take_field<T>(
    raw: &mut Map<String, Value>,
    kind: &'static str,
    field: &'static str,
) -> Result<T, SectionError>
where
    T: DeserializeOwned + Default,
{
    match raw.remove(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|source| SectionError::InvalidField { kind, field, source }),
    }
}

fn strings_value(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Section::from_raw(raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sections_keep_order_and_payload() {
        let raw = json!([
            { "type": "heading", "content": "H" },
            { "type": "list", "items": ["a", "b"] }
        ]);

        let sections: Vec<Section> = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(sections[0], Section::heading("H"));
        assert_eq!(sections[1], Section::list(["a", "b"]));
        assert_eq!(serde_json::to_value(&sections).unwrap(), raw);
    }

    #[test]
    fn test_tool_section_uses_camel_case() {
        let raw = json!({
            "type": "tool",
            "tool": { "name": "Copilot", "bestFor": "Pairing", "pros": ["fast"], "cons": [] }
        });

        let section: Section = serde_json::from_value(raw.clone()).unwrap();

        match &section.body {
            SectionBody::Tool(tool) => {
                assert_eq!(tool.name, "Copilot");
                assert_eq!(tool.best_for, "Pairing");
                assert_eq!(tool.pros, vec!["fast".to_string()]);
            }
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(serde_json::to_value(&section).unwrap(), raw);
    }

    #[test]
    fn test_irrelevant_fields_are_preserved() {
        let raw = json!({ "type": "text", "content": "hello", "items": ["stale"] });

        let section: Section = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(section.kind(), Some(SectionKind::Text));
        assert_eq!(section.extra.get("items"), Some(&json!(["stale"])));
        assert_eq!(serde_json::to_value(&section).unwrap(), raw);
    }

    #[test]
    fn test_unknown_type_round_trips_verbatim() {
        let raw = json!({ "type": "video", "url": "https://example.com/v.mp4", "autoplay": true });

        let section: Section = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(section.kind(), None);
        assert_eq!(section.type_name(), "video");
        assert_eq!(serde_json::to_value(&section).unwrap(), raw);
    }

    #[test]
    fn test_missing_payload_defaults_to_empty() {
        let section: Section = serde_json::from_value(json!({ "type": "checklist" })).unwrap();

        assert_eq!(section, Section::empty(SectionKind::Checklist));
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let result = serde_json::from_value::<Section>(json!({ "content": "orphan" }));

        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_payload_shape_is_rejected() {
        let result = Section::from_raw(
            json!({ "type": "list", "items": "not-a-list" })
                .as_object()
                .cloned()
                .unwrap(),
        );

        assert!(matches!(
            result,
            Err(SectionError::InvalidField { field: "items", .. })
        ));
    }

    #[test]
    fn test_kind_parses_from_tag() {
        assert_eq!("tool".parse::<SectionKind>().unwrap(), SectionKind::Tool);
        assert!("video".parse::<SectionKind>().is_err());
    }
}
