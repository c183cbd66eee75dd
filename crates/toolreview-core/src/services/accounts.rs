//! Registration, login, password reset and token authentication.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::email::{is_valid_email, mask_email, normalize_email};
use crate::domain::{Actor, Role, User};
use crate::error::DomainError;
use crate::ports::{
    AuthError, Mailer, OutgoingEmail, PasswordService, SecretGenerator, TokenService,
    UserRepository,
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Base URL of the reader-facing site, used in reset links.
    pub client_url: String,
    pub allow_admin_registration: bool,
    pub reset_token_ttl: TimeDelta,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            client_url: "http://localhost:5173".to_string(),
            allow_admin_registration: false,
            reset_token_ttl: TimeDelta::hours(1),
        }
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub role: Role,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    secrets: Arc<dyn SecretGenerator>,
    mailer: Arc<dyn Mailer>,
    settings: AccountSettings,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        secrets: Arc<dyn SecretGenerator>,
        mailer: Arc<dyn Mailer>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            secrets,
            mailer,
            settings,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<AuthSession, DomainError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation("Invalid email address".to_string()));
        }
        validate_password(password)?;

        let role = role.unwrap_or_default();
        if role == Role::Admin && !self.settings.allow_admin_registration {
            return Err(DomainError::Forbidden(
                "Admin registration is disabled".to_string(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()));
        }

        let password_hash = self.passwords.hash(password)?;
        let user = self
            .users
            .create(User::new(email, password_hash, role))
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.issue(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_email = %mask_email(&email), "Password mismatch");
            return Err(DomainError::Unauthorized);
        }

        self.issue(&user)
    }

    /// Store a reset token and mail the link. Silent when the account is unknown.
    pub async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let email = normalize_email(email);
        let Some(mut user) = self.users.find_by_email(&email).await? else {
            tracing::debug!(user_email = %mask_email(&email), "Reset requested for unknown account");
            return Ok(());
        };

        let token = self.secrets.generate();
        let now = Utc::now();
        user.reset_token = Some(token.clone());
        user.reset_expires = Some(now + self.settings.reset_token_ttl);
        user.updated_at = now;
        let user = self.users.update(user).await?;

        let reset_url = format!(
            "{}/reset-password/{}",
            self.settings.client_url.trim_end_matches('/'),
            token
        );
        self.mailer
            .send(OutgoingEmail {
                to: user.email.clone(),
                subject: "Password Reset".to_string(),
                html: format!(
                    "<p>You requested a password reset.</p>\
                     <p>Click <a href=\"{reset_url}\">here</a> to reset your password. \
                     This link will expire in 1 hour.</p>"
                ),
            })
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "Password reset link sent");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), DomainError> {
        if token.is_empty() {
            return Err(DomainError::Validation("Invalid or expired token".to_string()));
        }
        validate_password(password)?;

        let mut user = self
            .users
            .find_by_reset_token(token, Utc::now())
            .await?
            .ok_or_else(|| DomainError::Validation("Invalid or expired token".to_string()))?;

        user.password_hash = self.passwords.hash(password)?;
        user.reset_token = None;
        user.reset_expires = None;
        user.updated_at = Utc::now();
        let user = self.users.update(user).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    /// Resolve a bearer token to the caller. The role comes from the token;
    /// the store is only asked whether the user still exists.
    pub async fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = self.tokens.validate_token(token)?;
        let role = claims.role();

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .ok_or(AuthError::UnknownUser)?;

        Ok(Actor {
            user_id: user.id,
            email: user.email,
            role,
        })
    }

    fn issue(&self, user: &User) -> Result<AuthSession, DomainError> {
        let token =
            self.tokens
                .generate_token(user.id, &user.email, vec![user.role.as_str().to_string()])?;

        Ok(AuthSession {
            token,
            role: user.role,
            expires_in: self.tokens.expiration_seconds(),
        })
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
