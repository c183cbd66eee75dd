//! Application configuration loaded from environment variables.

use std::env;

use toolreview_infra::{ImageStoreConfig, JwtConfig, RateLimitConfig};

#[cfg(feature = "postgres")]
use toolreview_infra::DatabaseConfig;

const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `RUST_ENV`; `production`/`prod` hides internal error details.
    pub environment: String,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub images: ImageStoreConfig,
    pub jwt: JwtConfig,
    /// Applied to `/api/auth/*`.
    pub rate_limit: RateLimitConfig,
    /// Reader site, used in password reset links.
    pub client_url: String,
    /// Reader site, used in newsletter confirmation links.
    pub frontend_url: String,
    pub contact_receiver: Option<String>,
    pub allow_admin_registration: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "development".to_string(),
            #[cfg(feature = "postgres")]
            database: None,
            images: ImageStoreConfig::default(),
            jwt: JwtConfig::default(),
            rate_limit: RateLimitConfig::default(),
            client_url: DEFAULT_SITE_URL.to_string(),
            frontend_url: DEFAULT_SITE_URL.to_string(),
            contact_receiver: None,
            allow_admin_registration: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            environment: env::var("RUST_ENV").unwrap_or(defaults.environment),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            images: ImageStoreConfig::from_env(),
            jwt: JwtConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            client_url: env::var("CLIENT_URL").unwrap_or(defaults.client_url),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            contact_receiver: env::var("CONTACT_RECEIVER_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            allow_admin_registration: env::var("ALLOW_ADMIN_REGISTRATION")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn is_production(&self) -> bool {
        is_production_env(&self.environment)
    }
}

pub fn is_production_env(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.port, 5000);
        assert_eq!(config.images.max_width, 1200);
        assert_eq!(config.images.max_bytes, 2 * 1024 * 1024);
        assert!(!config.allow_admin_registration);
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_names() {
        assert!(is_production_env("production"));
        assert!(is_production_env("prod"));
        assert!(!is_production_env("staging"));
    }
}
