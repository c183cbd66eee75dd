//! Contact form.

use actix_web::{HttpResponse, web};

use toolreview_core::services::ContactMessage;
use toolreview_shared::MessageResponse;
use toolreview_shared::dto::ContactRequest;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/contact
pub async fn send(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state
        .contact
        .send(ContactMessage {
            name: req.name,
            email: req.email,
            message: req.message,
        })
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Message sent successfully.")))
}
