//! SeaORM entities for the Postgres schema.

pub mod comment;
pub mod like;
pub mod newsletter;
pub mod post;
pub mod user;
