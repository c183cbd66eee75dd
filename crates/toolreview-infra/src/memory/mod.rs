//! In-memory repositories.
//!
//! Used when no database is configured and throughout the service tests.
//! Data is lost on process restart.

mod newsletter;
mod posts;
mod users;

pub use newsletter::InMemoryNewsletterRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;

#[cfg(test)]
mod tests;
