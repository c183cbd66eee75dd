//! # Tool Review Client
//!
//! Everything a front end needs to talk to the API: an explicit session,
//! a reqwest-backed API client, the post cache, the section renderer and
//! the admin editor.

pub mod api;
pub mod cache;
pub mod editor;
pub mod render;
pub mod session;

pub use api::{ApiClient, ClientError, ImageAttachment, PostDraft, PostsApi};
pub use cache::PostCache;
pub use editor::{EditorError, EditorField, PostEditor};
pub use render::{ChecklistItem, Fragment, render_post, render_section};
pub use session::{Session, SessionContext};

#[cfg(test)]
mod tests;
