//! Post handlers: CRUD and likes.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;
use serde_json::Value;
use uuid::Uuid;

use toolreview_core::domain::{PostContent, Section, parse_tag_list};
use toolreview_core::ports::{ImageError, ImageUpload};
use toolreview_shared::MessageResponse;
use toolreview_shared::dto::{LikeResponse, PostRequest, SectionsInput, TagsInput};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Limit for the non-file parts of a post form.
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

/// Turn the loosely typed wire shape into validated post content.
pub(crate) fn post_content(request: PostRequest) -> AppResult<PostContent> {
    let tags = match request.tags {
        TagsInput::List(tags) => tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        TagsInput::Joined(raw) => parse_tag_list(&raw),
    };

    let raw_sections = match request.sections {
        SectionsInput::List(values) => values,
        SectionsInput::Encoded(raw) if raw.trim().is_empty() => Vec::new(),
        SectionsInput::Encoded(raw) => serde_json::from_str::<Vec<Value>>(&raw)
            .map_err(|e| AppError::BadRequest(format!("sections must be a JSON array: {e}")))?,
    };

    let sections = raw_sections
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(map) => Section::from_raw(map)
                .map_err(|e| AppError::BadRequest(format!("section {i}: {e}"))),
            _ => Err(AppError::BadRequest(format!("section {i}: expected an object"))),
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(PostContent {
        title: request.title.trim().to_string(),
        summary: request.summary.filter(|s| !s.trim().is_empty()),
        tags,
        sections,
    })
}

async fn read_field(field: &mut Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buf.len() + chunk.len() > limit {
            return Err(ImageError::TooLarge { limit }.into());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn text(bytes: Vec<u8>, name: &str) -> AppResult<String> {
    String::from_utf8(bytes).map_err(|_| AppError::BadRequest(format!("{name} must be UTF-8 text")))
}

/// Read the multipart create form: `title`, `summary`, `tags`, `sections`
/// and an optional `image` file.
async fn read_post_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> AppResult<(PostRequest, Option<ImageUpload>)> {
    let mut request = PostRequest::default();
    let mut image = None;

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field.content_type().map(|m| m.essence_str().to_string());
                let bytes = read_field(&mut field, max_image_bytes).await?;
                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        original_name,
                        content_type,
                        bytes,
                    });
                }
            }
            "title" | "summary" | "tags" | "sections" => {
                let value = text(read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?, &name)?;
                match name.as_str() {
                    "title" => request.title = value,
                    "summary" => request.summary = Some(value),
                    "tags" => request.tags = TagsInput::Joined(value),
                    _ => request.sections = SectionsInput::Encoded(value),
                }
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
                read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?;
            }
        }
    }

    Ok((request, image))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.list().await?))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.get(path.into_inner()).await?))
}

/// POST /api/posts (multipart)
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (request, image) = read_post_form(payload, state.max_image_bytes).await?;
    let content = post_content(request)?;

    let post = state.posts.create(&identity, content, image).await?;

    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id} (JSON)
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let content = post_content(body.into_inner())?;

    let post = state.posts.edit(&identity, path.into_inner(), content).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}

/// POST /api/posts/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let liked = state.posts.like(&identity, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        likes: liked.likes,
        liked: liked.liked,
    }))
}

/// POST /api/posts/{id}/unlike
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let unliked = state.posts.unlike(&identity, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        likes: unliked.likes,
        liked: unliked.liked,
    }))
}
