//! Password Reset Use Cases
//!
//! `RequestPasswordResetUseCase` mails a signed link; the link carries the
//! encoded user id and a stateless token checked by
//! `ConfirmPasswordResetUseCase`.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::validation::ValidationErrors;
use platform::mail::Mailer;

use crate::application::config::AccountConfig;
use crate::application::mail_outbox::MailOutbox;
use crate::domain::entity::outbound_email::OutboundEmail;
use crate::domain::repository::{EmailOutboxRepository, UserRepository};
use crate::domain::services::PasswordResetTokens;
use crate::domain::value_object::{
    email::Email,
    user_id::{decode_uid, encode_uid},
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AccountError, AccountResult};

pub const INVALID_UID_MESSAGE: &str = "Invalid user id or user doesn't exist.";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token.";

// ============================================================================
// Request
// ============================================================================

pub struct RequestPasswordResetUseCase<R, M> {
    repo: Arc<R>,
    outbox: MailOutbox<R, M>,
    config: Arc<AccountConfig>,
}

impl<R, M> RequestPasswordResetUseCase<R, M>
where
    R: UserRepository + EmailOutboxRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, outbox: MailOutbox<R, M>, config: Arc<AccountConfig>) -> Self {
        Self {
            repo,
            outbox,
            config,
        }
    }

    /// Queue the reset link; delivery happens in the background
    pub async fn execute(&self, email: Email) -> AccountResult<()> {
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::NotFound)?;

        let tokens = PasswordResetTokens::new(
            &self.config.jwt_secret,
            self.config.password_reset_timeout,
        );
        let link = self
            .config
            .password_reset_link(&encode_uid(&user.user_id), &tokens.make_token(&user));

        let email_id = self
            .outbox
            .enqueue(OutboundEmail::password_reset(&user, &link))
            .await?;

        tracing::info!(user_id = %user.user_id, %email_id, "Password reset requested");
        Ok(())
    }
}

// ============================================================================
// Confirm
// ============================================================================

#[derive(Debug)]
pub struct ConfirmPasswordResetInput {
    pub uid: String,
    pub token: String,
    pub new_password: RawPassword,
}

pub struct ConfirmPasswordResetUseCase<R> {
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> ConfirmPasswordResetUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: ConfirmPasswordResetInput) -> AccountResult<()> {
        let user = match decode_uid(&input.uid) {
            Some(user_id) => self.repo.find_by_id(&user_id).await?,
            None => None,
        };
        let Some(user) = user else {
            return Err(AccountError::field("uid", INVALID_UID_MESSAGE));
        };

        let tokens = PasswordResetTokens::new(
            &self.config.jwt_secret,
            self.config.password_reset_timeout,
        );
        if !tokens.check_token(&user, &input.token) {
            tracing::debug!(user_id = %user.user_id, "Password reset token rejected");
            return Err(AccountError::field("token", INVALID_TOKEN_MESSAGE));
        }

        let mut errors = ValidationErrors::new();
        if let Err(e) = input
            .new_password
            .ensure_not_similar("username", user.user_name.original())
            .and_then(|()| {
                input
                    .new_password
                    .ensure_not_similar("email address", user.email.as_str())
            })
        {
            errors.add("new_password", e.to_string());
        }
        errors.into_result(())?;

        // The token signs the current hash; swapping only an unchanged hash
        // keeps it single-use
        let new_password = UserPassword::from_raw(&input.new_password, self.config.pepper())?;
        let replaced = self
            .repo
            .replace_password(&user.user_id, &user.password, &new_password, Utc::now())
            .await?;
        if !replaced {
            tracing::debug!(user_id = %user.user_id, "Password reset token already used");
            return Err(AccountError::field("token", INVALID_TOKEN_MESSAGE));
        }

        tracing::info!(user_id = %user.user_id, "Password reset");
        Ok(())
    }
}
