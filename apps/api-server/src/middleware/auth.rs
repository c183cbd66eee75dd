//! Bearer token authentication extractor.

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use toolreview_core::domain::Actor;
use toolreview_core::ports::AuthError;
use toolreview_shared::ErrorResponse;

use crate::state::AppState;

/// The authenticated caller.
///
/// The token is verified and the user is looked up on every request, so a
/// deleted account loses access immediately.
/// ```ignore
/// async fn like(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub Actor);

impl Deref for Identity {
    type Target = Actor;

    fn deref(&self) -> &Actor {
        &self.0
    }
}

/// Error type for authentication failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(pub AuthError);

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match &self.0 {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::HashingError(_) | AuthError::Backend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(_) => {
                ErrorResponse::new(401, "Invalid Token").with_detail("Invalid token")
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("No token provided"),
            AuthError::UnknownUser => {
                ErrorResponse::new(401, "Unauthorized").with_detail("User not found")
            }
            AuthError::InvalidCredentials => {
                ErrorResponse::unauthorized().with_detail("Invalid credentials")
            }
            AuthError::InsufficientPermissions => {
                ErrorResponse::forbidden("Insufficient permissions")
            }
            AuthError::HashingError(msg) | AuthError::Backend(msg) => {
                tracing::error!(error = %msg, "Authentication backend failure");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token.map_err(AuthenticationError)?;
            let state = state.ok_or_else(|| {
                tracing::error!("AppState not found in app data");
                AuthenticationError(AuthError::Backend("Server configuration error".to_string()))
            })?;

            let actor = state
                .accounts
                .authenticate(&token)
                .await
                .map_err(AuthenticationError)?;
            Ok(Identity(actor))
        })
    }
}
