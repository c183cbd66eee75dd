//! Newsletter signup, confirmation and admin listing.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use toolreview_core::domain::ConfirmOutcome;
use toolreview_shared::MessageResponse;
use toolreview_shared::dto::{NewsletterConfirmQuery, NewsletterSignupRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/newsletter
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<NewsletterSignupRequest>,
) -> AppResult<HttpResponse> {
    state.newsletter.signup(&body.email).await?;

    Ok(HttpResponse::Created().json(MessageResponse::new(
        "Please check your email to confirm your subscription.",
    )))
}

/// GET /api/newsletter/confirm?token=..&email=..
pub async fn confirm(
    state: web::Data<AppState>,
    query: web::Query<NewsletterConfirmQuery>,
) -> AppResult<HttpResponse> {
    let message = match state.newsletter.confirm(&query.token, &query.email).await? {
        ConfirmOutcome::Confirmed => "Subscription confirmed! Thank you.",
        ConfirmOutcome::AlreadyConfirmed => "Subscription already confirmed.",
    };

    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

/// GET /api/newsletter/all - admin only
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.newsletter.list(&identity).await?))
}

/// DELETE /api/newsletter/{id} - admin only
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.newsletter.delete(&identity, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Deleted")))
}
