//! Authentication handlers.

use actix_web::{HttpResponse, web};

use toolreview_core::domain::Role;
use toolreview_core::services::AuthSession;
use toolreview_shared::MessageResponse;
use toolreview_shared::dto::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterUserRequest, ResetPasswordRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn auth_response(session: AuthSession) -> AuthResponse {
    AuthResponse {
        token: session.token,
        role: session.role.to_string(),
        expires_in: session.expires_in,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let role = req
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let session = state.accounts.register(&req.email, &req.password, role).await?;

    Ok(HttpResponse::Created().json(auth_response(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.accounts.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(auth_response(session)))
}

/// POST /api/auth/forgot-password
///
/// Answers the same way whether or not the account exists.
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    state.accounts.forgot_password(&body.email).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If an account with that email exists, a reset link has been sent.",
    )))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state.accounts.reset_password(&req.token, &req.password).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password has been reset successfully")))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.accounts.profile(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(user))
}
