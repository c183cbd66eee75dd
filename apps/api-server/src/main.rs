//! # Tool Review API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    let config = AppConfig::from_env();

    tracing::info!(
        service = %telemetry.service_name,
        environment = %config.environment,
        "Starting API server on {}:{}",
        config.host,
        config.port
    );

    if config.is_production() && config.allow_admin_registration {
        tracing::warn!("ALLOW_ADMIN_REGISTRATION is enabled in production");
    }

    let state = AppState::new(&config).await;
    std::fs::create_dir_all(&state.upload_dir)?;

    let data = web::Data::new(state.clone());
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(|cfg| handlers::configure_routes(cfg, &state))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
