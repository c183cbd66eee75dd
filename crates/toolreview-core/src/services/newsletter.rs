//! Newsletter signup with double opt-in.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::email::{is_valid_email, mask_email, normalize_email};
use crate::domain::{Actor, ConfirmOutcome, NewsletterSignup};
use crate::error::{DomainError, missing};
use crate::ports::{Mailer, NewsletterRepository, OutgoingEmail, SecretGenerator};

#[derive(Clone)]
pub struct NewsletterService {
    signups: Arc<dyn NewsletterRepository>,
    secrets: Arc<dyn SecretGenerator>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl NewsletterService {
    pub fn new(
        signups: Arc<dyn NewsletterRepository>,
        secrets: Arc<dyn SecretGenerator>,
        mailer: Arc<dyn Mailer>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            signups,
            secrets,
            mailer,
            frontend_url: frontend_url.into(),
        }
    }

    /// Record an unconfirmed signup and mail the confirmation link.
    pub async fn signup(&self, email: &str) -> Result<NewsletterSignup, DomainError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation("Invalid email address.".to_string()));
        }
        if self.signups.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already subscribed.".to_string()));
        }

        let token = self.secrets.generate();
        let signup = self
            .signups
            .create(NewsletterSignup::new(email, token.clone()))
            .await?;

        // Delivery problems do not undo the signup.
        if let Err(err) = self.mailer.send(self.confirmation_email(&signup.email, &token)).await {
            tracing::error!(
                subscriber = %mask_email(&signup.email),
                error = %err,
                "Failed to send confirmation email"
            );
        }

        tracing::info!(signup_id = %signup.id, "Newsletter signup recorded");
        Ok(signup)
    }

    pub async fn confirm(&self, token: &str, email: &str) -> Result<ConfirmOutcome, DomainError> {
        if token.is_empty() || email.is_empty() {
            return Err(DomainError::Validation("Invalid confirmation link.".to_string()));
        }

        let invalid =
            || DomainError::Validation("Invalid or expired confirmation link.".to_string());
        let mut signup = self
            .signups
            .find_by_email(&normalize_email(email))
            .await?
            .filter(|signup| signup.token_matches(token))
            .ok_or_else(invalid)?;

        let outcome = signup.confirm();
        if outcome == ConfirmOutcome::Confirmed {
            let id = signup.id;
            self.signups
                .update(signup)
                .await
                .map_err(missing("Newsletter signup", id))?;
            tracing::info!(signup_id = %id, "Newsletter signup confirmed");
        }
        Ok(outcome)
    }

    /// Every signup, newest first. Admin only.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<NewsletterSignup>, DomainError> {
        require_admin(actor)?;
        Ok(self.signups.find_all().await?)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        require_admin(actor)?;
        self.signups
            .delete(id)
            .await
            .map_err(missing("Newsletter signup", id))
    }

    fn confirmation_email(&self, email: &str, token: &str) -> OutgoingEmail {
        let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        let confirm_url = format!(
            "{}/newsletter-confirm?token={}&email={}",
            self.frontend_url.trim_end_matches('/'),
            token,
            encoded
        );

        OutgoingEmail {
            to: email.to_string(),
            subject: "Confirm your subscription to AI Tools Review Newsletter".to_string(),
            html: format!(
                "<h2>Confirm your subscription</h2>\
                 <p>Thank you for signing up! Please <a href=\"{confirm_url}\">click here to \
                 confirm your subscription</a> to start receiving our newsletter.</p>\
                 <p>If you did not subscribe, you can ignore this email.</p>"
            ),
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), DomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden("Forbidden".to_string()))
    }
}
