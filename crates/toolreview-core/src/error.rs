//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::ports::{AuthError, ImageError};

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity_type, id }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::NotFound => DomainError::Internal("entity vanished mid-operation".into()),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth
            | AuthError::UnknownUser => DomainError::Unauthorized,
            AuthError::InsufficientPermissions => {
                DomainError::Forbidden("insufficient permissions".into())
            }
            AuthError::HashingError(msg) | AuthError::Backend(msg) => DomainError::Internal(msg),
        }
    }
}

impl From<ImageError> for DomainError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::UnsupportedType(_) | ImageError::TooLarge { .. } | ImageError::Decode(_) => {
                DomainError::Validation(err.to_string())
            }
            ImageError::Encode(_) | ImageError::Io(_) => DomainError::Internal(err.to_string()),
        }
    }
}

/// Map a repository `NotFound` onto the entity the caller was looking for.
pub(crate) fn missing(entity_type: &'static str, id: Uuid) -> impl FnOnce(RepoError) -> DomainError {
    move |err| match err {
        RepoError::NotFound => DomainError::not_found(entity_type, id),
        other => other.into(),
    }
}
