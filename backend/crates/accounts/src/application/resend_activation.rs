//! Resend Activation Code Use Case
//!
//! Sends the stored confirmation number again, inline, so the caller learns
//! whether the mail went out. The user record is never touched.

use std::sync::Arc;

use platform::mail::Mailer;

use crate::application::mail_outbox::MailOutbox;
use crate::domain::entity::outbound_email::OutboundEmail;
use crate::domain::repository::{EmailOutboxRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AccountError, AccountResult};

pub const ALREADY_CONFIRMED_MESSAGE: &str = "This email address is already confirmed.";

pub struct ResendActivationUseCase<R, M> {
    repo: Arc<R>,
    outbox: MailOutbox<R, M>,
}

impl<R, M> ResendActivationUseCase<R, M>
where
    R: UserRepository + EmailOutboxRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, outbox: MailOutbox<R, M>) -> Self {
        Self { repo, outbox }
    }

    /// Mail timeout surfaces as `AccountError::Mail(MailError::Timeout)`
    pub async fn execute(&self, email: Email) -> AccountResult<()> {
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::NotFound)?;

        if user.is_confirmed {
            return Err(AccountError::field("email", ALREADY_CONFIRMED_MESSAGE));
        }

        let sent = self
            .outbox
            .deliver_now(OutboundEmail::verification_code(&user))
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            email_id = %sent.email_id,
            "Activation code re-sent"
        );
        Ok(())
    }
}
