//! The caller's login state, passed explicitly to whatever sends requests.

use std::sync::Arc;

use tokio::sync::RwLock;

use toolreview_core::domain::Role;
use toolreview_shared::dto::AuthResponse;

/// A logged-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

/// Shared handle on the current session. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from a login or registration response.
    ///
    /// An unrecognised role is treated as a plain user.
    pub async fn start(&self, auth: &AuthResponse) -> Session {
        let session = Session {
            token: auth.token.clone(),
            role: auth.role.parse().unwrap_or_default(),
        };
        *self.inner.write().await = Some(session.clone());
        session
    }

    /// Log out.
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn is_admin(&self) -> bool {
        self.inner
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.role == Role::Admin)
    }
}
