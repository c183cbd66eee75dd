//! Application services - use cases composed from domain rules and ports.

mod accounts;
mod contact;
mod newsletter;
mod posts;

pub use accounts::{AccountService, AccountSettings, AuthSession};
pub use contact::{ContactMessage, ContactService};
pub use newsletter::NewsletterService;
pub use posts::PostService;
