//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use toolreview_shared::MessageResponse;
use toolreview_shared::dto::CommentRequest;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.comments(path.into_inner()).await?))
}

/// POST /api/posts/{id}/comments
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .posts
        .add_comment(&identity, path.into_inner(), body.into_inner().text)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .posts
        .edit_comment(&identity, post_id, comment_id, body.into_inner().text)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .posts
        .delete_comment(&identity, post_id, comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment deleted")))
}
