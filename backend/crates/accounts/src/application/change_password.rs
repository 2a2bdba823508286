//! Change Password Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::error::validation::ValidationErrors;

use crate::application::config::AccountConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AccountError, AccountResult};

pub const WRONG_OLD_PASSWORD_MESSAGE: &str =
    "Your old password was entered incorrectly. Please enter it again.";
pub const SAME_PASSWORD_MESSAGE: &str = "The new password must differ from the old password.";

/// Change password input
///
/// `old_password` is only compared against the stored hash; `new_password`
/// has already passed the password policy.
#[derive(Debug)]
pub struct ChangePasswordInput {
    pub old_password: RawPassword,
    pub new_password: RawPassword,
}

pub struct ChangePasswordUseCase<R> {
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user: User, input: ChangePasswordInput) -> AccountResult<()> {
        let pepper = self.config.pepper();
        let mut errors = ValidationErrors::new();

        if !user.password.verify(&input.old_password, pepper) {
            errors.add("old_password", WRONG_OLD_PASSWORD_MESSAGE);
        }
        if user.password.verify(&input.new_password, pepper) {
            errors.add("new_password", SAME_PASSWORD_MESSAGE);
        }
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

        let new_password = UserPassword::from_raw(&input.new_password, pepper)?;
        let replaced = self
            .repo
            .replace_password(&user.user_id, &user.password, &new_password, Utc::now())
            .await?;
        if !replaced {
            tracing::debug!(user_id = %user.user_id, "Password changed concurrently");
            return Err(AccountError::field("old_password", WRONG_OLD_PASSWORD_MESSAGE));
        }

        tracing::info!(user_id = %user.user_id, "Password changed");
        Ok(())
    }
}
