//! Contact form relay.

use std::sync::Arc;

use ammonia::clean_text;

use crate::error::DomainError;
use crate::ports::{Mailer, OutgoingEmail};

#[derive(Debug, Clone, Default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone)]
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    receiver: Option<String>,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, receiver: Option<String>) -> Self {
        Self { mailer, receiver }
    }

    pub async fn send(&self, msg: ContactMessage) -> Result<(), DomainError> {
        if [&msg.name, &msg.email, &msg.message]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(DomainError::Validation("All fields are required.".to_string()));
        }

        let Some(receiver) = &self.receiver else {
            tracing::error!("CONTACT_RECEIVER_EMAIL is not configured");
            return Err(DomainError::Internal(
                "Contact email configuration is missing.".to_string(),
            ));
        };

        self.mailer
            .send(OutgoingEmail {
                to: receiver.clone(),
                subject: format!("New Contact Message from {}", subject_line(&msg.name)),
                html: format!(
                    "<h3>Contact Form Submission</h3>\
                     <p><strong>Name:</strong> {}</p>\
                     <p><strong>Email:</strong> {}</p>\
                     <p><strong>Message:</strong><br/>{}</p>",
                    clean_text(&msg.name),
                    clean_text(&msg.email),
                    clean_text(&msg.message)
                ),
            })
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tracing::info!("Contact message relayed");
        Ok(())
    }
}

/// Collapse whitespace so a name cannot break the subject header.
fn subject_line(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
