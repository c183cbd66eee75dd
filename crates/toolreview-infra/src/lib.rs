//! # Tool Review Infrastructure
//!
//! Concrete implementations of the ports defined in `toolreview-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM. Without it
//!   only the in-memory stores are available.

pub mod auth;
pub mod images;
pub mod mail;
pub mod memory;
pub mod rate_limit;

#[cfg(feature = "postgres")]
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, RandomSecretGenerator};
pub use images::{ImageStoreConfig, WebpImageStore};
pub use mail::LogMailer;
pub use memory::{InMemoryNewsletterRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresNewsletterRepository, PostgresPostRepository, PostgresUserRepository,
};
