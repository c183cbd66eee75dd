//! # Tool Review Core
//!
//! The domain layer of the tool review CMS.
//! This crate contains the content model, business rules and the ports
//! infrastructure must implement. It has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
