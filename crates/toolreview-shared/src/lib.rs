//! # Tool Review Shared
//!
//! Wire types shared by the API server and the Rust client.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
