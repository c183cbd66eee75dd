//! Application state - shared across all handlers.

use std::sync::Arc;

use chrono::TimeDelta;

use toolreview_core::ports::{
    ImageStore, Mailer, NewsletterRepository, PostRepository, RateLimiter, SecretGenerator,
    UserRepository,
};
use toolreview_core::services::{
    AccountService, AccountSettings, ContactService, NewsletterService, PostService,
};
use toolreview_infra::{
    Argon2PasswordService, InMemoryNewsletterRepository, InMemoryPostRepository,
    InMemoryRateLimiter, InMemoryUserRepository, JwtTokenService, LogMailer,
    RandomSecretGenerator, WebpImageStore,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub accounts: AccountService,
    pub newsletter: NewsletterService,
    pub contact: ContactService,
    pub auth_limiter: Arc<dyn RateLimiter>,
    /// Where `/uploads` is served from.
    pub upload_dir: std::path::PathBuf,
    pub max_image_bytes: usize,
    pub storage: &'static str,
}

/// The three stores, whichever backend provides them.
struct Repositories {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    newsletter: Arc<dyn NewsletterRepository>,
    backend: &'static str,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            newsletter: Arc::new(InMemoryNewsletterRepository::new()),
            backend: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Self {
        use toolreview_infra::database::connect;
        use toolreview_infra::{
            PostgresNewsletterRepository, PostgresPostRepository, PostgresUserRepository,
        };

        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match connect(db_config).await {
            Ok(conn) => {
                let conn = Arc::new(conn);
                Self {
                    users: Arc::new(PostgresUserRepository::new(conn.clone())),
                    posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                    newsletter: Arc::new(PostgresNewsletterRepository::new(conn)),
                    backend: "postgres",
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to database. Using in-memory fallback."
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the state, connecting to Postgres when configured.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Repositories::connect(config).await;
        let state = Self::assemble(config, repos, Arc::new(LogMailer));
        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    /// State backed by the in-memory stores.
    pub fn in_memory(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::assemble(config, Repositories::in_memory(), mailer)
    }

    fn assemble(config: &AppConfig, repos: Repositories, mailer: Arc<dyn Mailer>) -> Self {
        let secrets: Arc<dyn SecretGenerator> = Arc::new(RandomSecretGenerator);
        let images: Arc<dyn ImageStore> = Arc::new(WebpImageStore::new(config.images.clone()));

        let accounts = AccountService::new(
            repos.users,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            secrets.clone(),
            mailer.clone(),
            AccountSettings {
                client_url: config.client_url.clone(),
                allow_admin_registration: config.allow_admin_registration,
                reset_token_ttl: TimeDelta::hours(1),
            },
        );

        Self {
            posts: PostService::new(repos.posts, images),
            accounts,
            newsletter: NewsletterService::new(
                repos.newsletter,
                secrets,
                mailer.clone(),
                config.frontend_url.clone(),
            ),
            contact: ContactService::new(mailer, config.contact_receiver.clone()),
            auth_limiter: Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())),
            upload_dir: config.images.root.clone(),
            max_image_bytes: config.images.max_bytes,
            storage: repos.backend,
        }
    }
}
