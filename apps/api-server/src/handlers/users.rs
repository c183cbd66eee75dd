//! User profile and activity.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users/{id}
pub async fn profile(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.accounts.profile(path.into_inner()).await?))
}

/// GET /api/users/{id}/posts
pub async fn posts(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.posts_by_author(path.into_inner()).await?))
}

/// GET /api/users/{id}/comments
pub async fn comments(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.comments_by_author(path.into_inner()).await?))
}
