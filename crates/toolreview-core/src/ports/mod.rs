//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod images;
mod mail;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, SecretGenerator, TokenClaims, TokenService};
pub use images::{ImageError, ImageStore, ImageUpload};
pub use mail::{MailError, Mailer, OutgoingEmail};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{BaseRepository, NewsletterRepository, PostRepository, UserRepository};
