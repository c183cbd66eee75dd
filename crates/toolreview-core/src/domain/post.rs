use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::section::Section;
use crate::error::DomainError;

/// Post entity - a published tool review article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Filename of the transcoded cover image under `/uploads`.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes: BTreeSet<String>,
    pub date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The admin-editable part of a post. Edits replace all of it at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
    pub title: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub sections: Vec<Section>,
}

impl PostContent {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        Ok(())
    }
}

impl Post {
    /// Create a new post from validated content.
    pub fn new(author_id: Option<Uuid>, content: PostContent, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: content.title,
            summary: content.summary,
            tags: content.tags,
            image,
            sections: content.sections,
            comments: Vec::new(),
            likes: BTreeSet::new(),
            date: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields. Fields absent from `content` are cleared.
    pub fn replace_content(&mut self, content: PostContent) {
        self.title = content.title;
        self.summary = content.summary;
        self.tags = content.tags;
        self.sections = content.sections;
        self.updated_at = Utc::now();
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.contains(user_id)
    }
}

/// A reader comment embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Only meaningful within the owning post.
    pub id: Uuid,
    pub text: String,
    pub author: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: String, author: String, author_email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            author,
            author_email,
            date: Utc::now(),
        }
    }
}

/// A comment listed outside its post, e.g. on a user's activity page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub post_id: Uuid,
    pub post_title: String,
}

/// Like-set state after a like or unlike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub likes: usize,
    pub liked: bool,
}

/// Split a comma separated tag field, dropping blanks.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: &str) -> PostContent {
        PostContent {
            title: title.to_string(),
            summary: Some("short".to_string()),
            tags: vec!["ai".to_string()],
            sections: vec![Section::text("body")],
        }
    }

    #[test]
    fn test_blank_title_is_invalid() {
        assert!(content("   ").validate().is_err());
        assert!(content("Cursor review").validate().is_ok());
    }

    #[test]
    fn test_replace_content_clears_omitted_fields() {
        let mut post = Post::new(None, content("Before"), Some("cover.webp".to_string()));

        post.replace_content(PostContent {
            title: "After".to_string(),
            ..Default::default()
        });

        assert_eq!(post.title, "After");
        assert_eq!(post.summary, None);
        assert!(post.tags.is_empty());
        assert!(post.sections.is_empty());
        assert_eq!(post.image.as_deref(), Some("cover.webp"));
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(
            parse_tag_list(" chatbots, ,coding ,"),
            vec!["chatbots".to_string(), "coding".to_string()]
        );
        assert!(parse_tag_list("").is_empty());
    }
}
