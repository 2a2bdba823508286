//! Register Use Case
//!
//! Creates an unconfirmed account and queues the verification code email.

use std::sync::Arc;

use kernel::error::validation::ValidationErrors;
use platform::mail::Mailer;

use crate::application::config::AccountConfig;
use crate::application::mail_outbox::MailOutbox;
use crate::domain::entity::{outbound_email::OutboundEmail, user::User};
use crate::domain::repository::{EmailOutboxRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AccountResult;

pub const DUPLICATE_USER_NAME_MESSAGE: &str = "A user with that username already exists.";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "user with this email already exists.";

/// Register input (already format-checked)
#[derive(Debug)]
pub struct RegisterInput {
    pub user_name: UserName,
    pub email: Email,
    pub password: RawPassword,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_name: String,
    pub email: String,
    pub message: String,
}

/// Register use case
pub struct RegisterUseCase<R, M> {
    repo: Arc<R>,
    outbox: MailOutbox<R, M>,
    config: Arc<AccountConfig>,
}

impl<R, M> RegisterUseCase<R, M>
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

    pub async fn execute(&self, input: RegisterInput) -> AccountResult<RegisterOutput> {
        let RegisterInput {
            user_name,
            email,
            password,
        } = input;

        let mut errors = ValidationErrors::new();

        if self.repo.exists_by_user_name(&user_name).await? {
            errors.add("username", DUPLICATE_USER_NAME_MESSAGE);
        }
        if self.repo.exists_by_email(&email).await? {
            errors.add("email", DUPLICATE_EMAIL_MESSAGE);
        }
        if let Err(e) = password
            .ensure_not_similar("username", user_name.original())
            .and_then(|()| password.ensure_not_similar("email address", email.as_str()))
        {
            errors.add("password", e.to_string());
        }
        errors.into_result(())?;

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        let user = User::new(user_name, email, password_hash);

        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        // Registration stands even if the email cannot be queued
        if let Err(e) = self
            .outbox
            .enqueue(OutboundEmail::verification_code(&user))
            .await
        {
            tracing::error!(
                user_id = %user.user_id,
                error = %e,
                "Failed to queue verification email"
            );
        }

        Ok(RegisterOutput {
            message: format!(
                "Registration Successful. Please confirm your email with code send to your email {}",
                user.email
            ),
            user_name: user.user_name.to_string(),
            email: user.email.into_db(),
        })
    }
}
