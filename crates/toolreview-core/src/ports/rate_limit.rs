//! Request throttling port, applied to the authentication endpoints.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and report whether it may proceed.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Outcome of a single check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the next request for the key would be accepted.
    pub reset_after: Duration,
}

impl RateLimitResult {
    /// Whole seconds for a `Retry-After` header, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_after.as_secs().max(1)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter backend failed: {0}")]
    Backend(String),
}
