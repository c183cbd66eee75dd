//! Mail delivery.

use async_trait::async_trait;

use toolreview_core::ports::{MailError, Mailer, OutgoingEmail};

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body_len = email.html.len(),
            "Outgoing email (log transport)"
        );
        tracing::debug!(html = %email.html, "Outgoing email body");
        Ok(())
    }
}
