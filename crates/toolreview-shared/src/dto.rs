//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued on login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Tags arrive either as a JSON array or as one comma separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Joined(String),
}

impl Default for TagsInput {
    fn default() -> Self {
        TagsInput::List(Vec::new())
    }
}

/// Sections arrive either as a JSON array or as a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionsInput {
    List(Vec<Value>),
    Encoded(String),
}

impl Default for SectionsInput {
    fn default() -> Self {
        SectionsInput::List(Vec::new())
    }
}

/// Body of `PUT /api/posts/:id`. Omitted fields are cleared on the post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: TagsInput,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: SectionsInput,
}

/// An explicit `null` clears the field like an omitted one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub likes: usize,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSignupRequest {
    #[serde(default)]
    pub email: String,
}

/// Query string of the newsletter confirmation link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsletterConfirmQuery {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_request_accepts_both_shapes() {
        let joined: PostRequest = serde_json::from_str(
            r#"{"title":"T","tags":"a, b","sections":"[{\"type\":\"text\",\"content\":\"x\"}]"}"#,
        )
        .unwrap();
        assert_eq!(joined.tags, TagsInput::Joined("a, b".to_string()));
        assert!(matches!(joined.sections, SectionsInput::Encoded(_)));

        let listed: PostRequest = serde_json::from_str(
            r#"{"title":"T","tags":["a"],"sections":[{"type":"heading","content":"H"}]}"#,
        )
        .unwrap();
        assert_eq!(listed.tags, TagsInput::List(vec!["a".to_string()]));
        assert!(matches!(listed.sections, SectionsInput::List(ref s) if s.len() == 1));
    }

    #[test]
    fn test_omitted_post_fields_default_to_empty() {
        let request: PostRequest = serde_json::from_str(r#"{"title":"Only"}"#).unwrap();

        assert_eq!(request.summary, None);
        assert_eq!(request.tags, TagsInput::default());
        assert_eq!(request.sections, SectionsInput::default());
    }

    #[test]
    fn test_null_post_fields_clear() {
        let request: PostRequest =
            serde_json::from_str(r#"{"title":"T","summary":null,"tags":null,"sections":null}"#)
                .unwrap();

        assert_eq!(request.summary, None);
        assert_eq!(request.tags, TagsInput::default());
        assert_eq!(request.sections, SectionsInput::default());
    }

    #[test]
    fn test_auth_response_is_camel_case() {
        let json = serde_json::to_value(AuthResponse {
            token: "t".to_string(),
            role: "admin".to_string(),
            expires_in: 60,
        })
        .unwrap();

        assert_eq!(json["expiresIn"], 60);
    }
}
