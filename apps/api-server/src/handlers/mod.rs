//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod contact;
mod health;
mod newsletter;
mod posts;
mod users;


use actix_web::{HttpRequest, error::JsonPayloadError, error::PathError, error::QueryPayloadError, web};

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Ids that are not UUIDs cannot name anything.
fn path_error(_err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::NotFound("Resource not found".to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Auth routes
                .service(
                    web::scope("/auth")
                        .wrap(RateLimitMiddleware::new(state.auth_limiter.clone()))
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/forgot-password", web::post().to(auth::forgot_password))
                        .route("/reset-password", web::post().to(auth::reset_password))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        .route("/{id}", web::get().to(posts::get))
                        .route("/{id}", web::put().to(posts::update))
                        .route("/{id}", web::delete().to(posts::delete))
                        .route("/{id}/comments", web::get().to(comments::list))
                        .route("/{id}/comments", web::post().to(comments::add))
                        .route(
                            "/{post_id}/comments/{comment_id}",
                            web::put().to(comments::edit),
                        )
                        .route(
                            "/{post_id}/comments/{comment_id}",
                            web::delete().to(comments::delete),
                        )
                        .route("/{id}/like", web::post().to(posts::like))
                        .route("/{id}/unlike", web::post().to(posts::unlike)),
                )
                .service(
                    web::scope("/newsletter")
                        .route("", web::post().to(newsletter::signup))
                        .route("/confirm", web::get().to(newsletter::confirm))
                        .route("/all", web::get().to(newsletter::list))
                        .route("/{id}", web::delete().to(newsletter::delete)),
                )
                .service(
                    web::scope("/users")
                        .route("/{id}", web::get().to(users::profile))
                        .route("/{id}/posts", web::get().to(users::posts))
                        .route("/{id}/comments", web::get().to(users::comments)),
                )
                .route("/contact", web::post().to(contact::send)),
        )
        .service(actix_files::Files::new("/uploads", state.upload_dir.clone()));
}
