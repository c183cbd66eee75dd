//! Authentication implementations.

mod jwt;
mod password;
mod secret;

pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
pub use secret::RandomSecretGenerator;
