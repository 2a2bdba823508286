//! Verify Email Use Case

use std::sync::Arc;

use chrono::Utc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::{confirm_number::ConfirmNumber, email::Email};
use crate::error::{AccountError, AccountResult};

#[derive(Debug)]
pub struct VerifyEmailInput {
    pub email: Email,
    pub confirm_number: ConfirmNumber,
}

pub struct VerifyEmailUseCase<R> {
    repo: Arc<R>,
}

impl<R> VerifyEmailUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Unknown email, wrong code and an already confirmed account all
    /// produce the same `NotFound`
    pub async fn execute(&self, input: VerifyEmailInput) -> AccountResult<()> {
        let user = self
            .repo
            .confirm_user(&input.email, &input.confirm_number, Utc::now())
            .await?
            .ok_or(AccountError::NotFound)?;

        tracing::info!(user_id = %user.user_id, "Email verified");
        Ok(())
    }
}
