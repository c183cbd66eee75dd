use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A newsletter subscription awaiting or holding confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSignup {
    pub id: Uuid,
    pub email: String,
    pub confirmed: bool,
    #[serde(skip_serializing, default)]
    pub confirm_token: Option<String>,
    pub date: DateTime<Utc>,
}

/// Result of following a confirmation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    AlreadyConfirmed,
}

impl NewsletterSignup {
    pub fn new(email: String, confirm_token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            confirmed: false,
            confirm_token: Some(confirm_token),
            date: Utc::now(),
        }
    }

    /// Whether a confirmation link carrying `token` belongs to this signup.
    pub fn token_matches(&self, token: &str) -> bool {
        self.confirm_token.as_deref() == Some(token)
    }

    /// Flip to confirmed and burn the token.
    pub fn confirm(&mut self) -> ConfirmOutcome {
        if self.confirmed {
            return ConfirmOutcome::AlreadyConfirmed;
        }
        self.confirmed = true;
        self.confirm_token = None;
        ConfirmOutcome::Confirmed
    }
}
