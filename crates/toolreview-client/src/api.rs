//! HTTP access to the tool review API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use toolreview_core::domain::{Comment, Post, Section};
use toolreview_shared::dto::{
    AuthResponse, CommentRequest, LikeResponse, LoginRequest, PostRequest, RegisterUserRequest,
    SectionsInput, TagsInput,
};
use toolreview_shared::{ErrorResponse, MessageResponse};

use crate::session::SessionContext;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body; `message` is its detail.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server's explanation when there is one, otherwise `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Cover image sent along with a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A complete post submission as produced by the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub sections: Vec<Section>,
    /// Only sent on create.
    pub image: Option<ImageAttachment>,
}

impl PostDraft {
    fn to_request(&self) -> PostRequest {
        PostRequest {
            title: self.title.clone(),
            summary: Some(self.summary.clone()),
            tags: TagsInput::List(self.tags.clone()),
            sections: SectionsInput::List(
                self.sections
                    .iter()
                    .map(|s| Value::Object(s.to_raw()))
                    .collect(),
            ),
        }
    }

    fn to_form(&self) -> Result<Form, ClientError> {
        let sections = serde_json::to_string(&self.sections)
            .map_err(|e| ClientError::InvalidInput(e.to_string()))?;

        let mut form = Form::new()
            .text("title", self.title.clone())
            .text("summary", self.summary.clone())
            .text("tags", self.tags.join(","))
            .text("sections", sections);

        if let Some(image) = &self.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.filename.clone())
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

/// The post operations the cache depends on.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError>;
    async fn get_post(&self, id: Uuid) -> Result<Post, ClientError>;
    async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError>;
    async fn update_post(&self, id: Uuid, draft: &PostDraft) -> Result<Post, ClientError>;
    async fn delete_post(&self, id: Uuid) -> Result<(), ClientError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionContext) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            http,
            base,
            session,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("toolreview-client/", env!("CARGO_PKG_VERSION"))
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = RegisterUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        };
        let auth: AuthResponse = self.send_json(Method::POST, "api/auth/register", &body).await?;
        self.session.start(&auth).await;
        Ok(auth)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.send_json(Method::POST, "api/auth/login", &body).await?;
        self.session.start(&auth).await;
        Ok(auth)
    }

    pub async fn logout(&self) {
        self.session.clear().await;
    }

    pub async fn like_post(&self, id: Uuid) -> Result<LikeResponse, ClientError> {
        let req = self.request(Method::POST, &format!("api/posts/{id}/like")).await?;
        Self::handle(req.send().await?).await
    }

    pub async fn unlike_post(&self, id: Uuid) -> Result<LikeResponse, ClientError> {
        let req = self
            .request(Method::POST, &format!("api/posts/{id}/unlike"))
            .await?;
        Self::handle(req.send().await?).await
    }

    pub async fn add_comment(&self, post_id: Uuid, text: &str) -> Result<Comment, ClientError> {
        let body = CommentRequest {
            text: text.to_string(),
        };
        self.send_json(Method::POST, &format!("api/posts/{post_id}/comments"), &body)
            .await
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(ClientError::Url)
    }

    /// A request carrying the session's bearer token, if any.
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let mut req = self.http.request(method, self.url(path)?);
        if let Some(token) = self.session.token().await {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let req = self.request(method, path).await?.json(body);
        Self::handle(req.send().await?).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorResponse>(body)
        .map(|problem| problem.message().to_string())
        .or_else(|_| serde_json::from_slice::<MessageResponse>(body).map(|m| m.message))
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    tracing::debug!(status = status.as_u16(), %message, "API request failed");
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PostsApi for ApiClient {
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        let req = self.request(Method::GET, "api/posts").await?;
        Self::handle(req.send().await?).await
    }

    async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        let req = self.request(Method::GET, &format!("api/posts/{id}")).await?;
        Self::handle(req.send().await?).await
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError> {
        let form = draft.to_form()?;
        let req = self.request(Method::POST, "api/posts").await?.multipart(form);
        Self::handle(req.send().await?).await
    }

    async fn update_post(&self, id: Uuid, draft: &PostDraft) -> Result<Post, ClientError> {
        self.send_json(Method::PUT, &format!("api/posts/{id}"), &draft.to_request())
            .await
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("api/posts/{id}")).await?;
        let _: MessageResponse = Self::handle(req.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_problem_detail() {
        let body = br#"{"type":"about:blank","title":"Forbidden","status":403,"detail":"admin role required"}"#;

        let err = api_error(StatusCode::FORBIDDEN, body);

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "admin role required");
    }

    #[test]
    fn test_api_error_without_body_uses_reason() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"<html>");

        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.display_message("Error fetching posts"), "Bad Gateway");
    }

    #[test]
    fn test_draft_request_shapes() {
        let draft = PostDraft {
            title: "T".to_string(),
            summary: String::new(),
            tags: vec!["a".to_string(), "b".to_string()],
            sections: vec![Section::heading("H")],
            image: None,
        };

        let json = serde_json::to_value(draft.to_request()).unwrap();

        assert_eq!(json["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(json["sections"][0]["type"], "heading");
    }

    #[test]
    fn test_base_path_is_kept() {
        for base in ["http://host.test/blog", "http://host.test/blog/"] {
            let client = ApiClient::new(base, SessionContext::new()).unwrap();

            assert_eq!(
                client.url("api/posts").unwrap().as_str(),
                "http://host.test/blog/api/posts"
            );
        }

        let client = ApiClient::new("http://host.test", SessionContext::new()).unwrap();
        assert_eq!(
            client.url("api/posts").unwrap().as_str(),
            "http://host.test/api/posts"
        );
    }

    #[tokio::test]
    async fn test_requests_carry_the_session_token() {
        let client = ApiClient::new("http://host.test/", SessionContext::new()).unwrap();
        let authorization = |req: reqwest::Request| {
            req.headers()
                .get(reqwest::header::AUTHORIZATION)
                .map(|v| v.to_str().unwrap().to_string())
        };

        let req = client.request(Method::GET, "api/posts").await.unwrap();
        assert_eq!(authorization(req.build().unwrap()), None);

        client
            .session()
            .start(&AuthResponse {
                token: "abc.def".to_string(),
                role: "admin".to_string(),
                expires_in: 3600,
            })
            .await;
        let req = client.request(Method::POST, "api/posts").await.unwrap();
        assert_eq!(
            authorization(req.build().unwrap()).as_deref(),
            Some("Bearer abc.def")
        );

        client.logout().await;
        let req = client.request(Method::GET, "api/posts").await.unwrap();
        assert_eq!(authorization(req.build().unwrap()), None);
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", SessionContext::new()),
            Err(ClientError::Url(_))
        ));
    }
}
