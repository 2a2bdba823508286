//! Obtain Token Use Case
//!
//! Username-or-email + password login issuing a JWT pair. Confirmation is
//! not required here; confirmed-only routes enforce it themselves.

use std::sync::{Arc, OnceLock};

use crate::application::config::AccountConfig;
use crate::application::tokens::{TokenIssuer, TokenPair};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AccountError, AccountResult};

#[derive(Debug)]
pub struct ObtainTokenInput {
    /// User name or email
    pub identifier: String,
    pub password: RawPassword,
}

pub struct ObtainTokenUseCase<R> {
    repo: Arc<R>,
    issuer: TokenIssuer,
    config: Arc<AccountConfig>,
}

impl<R> ObtainTokenUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, issuer: TokenIssuer, config: Arc<AccountConfig>) -> Self {
        Self {
            repo,
            issuer,
            config,
        }
    }

    pub async fn execute(&self, input: ObtainTokenInput) -> AccountResult<TokenPair> {
        let Some(mut user) = self.find_user(&input.identifier).await? else {
            // Same Argon2 cost as a wrong password for an existing account
            if let Some(dummy) = dummy_password() {
                dummy.verify(&input.password, self.config.pepper());
            }
            return Err(AccountError::InvalidCredentials);
        };

        if !user.password.verify(&input.password, self.config.pepper()) {
            tracing::debug!(user_id = %user.user_id, "Password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        let at = user.record_login();
        self.repo.record_login(&user.user_id, at).await?;

        let pair = self.issuer.issue_pair(&user)?;

        tracing::info!(user_id = %user.user_id, "Token pair issued");
        Ok(pair)
    }

    /// Usernames cannot contain '@', so anything with one is an email
    async fn find_user(&self, identifier: &str) -> AccountResult<Option<User>> {
        if identifier.contains('@') {
            match Email::new(identifier) {
                Ok(email) => self.repo.find_by_email(&email).await,
                Err(_) => Ok(None),
            }
        } else {
            match UserName::new(identifier) {
                Ok(user_name) => self.repo.find_by_user_name(&user_name).await,
                Err(_) => Ok(None),
            }
        }
    }
}

/// Hash verified against when no account matches the identifier
fn dummy_password() -> Option<&'static UserPassword> {
    static DUMMY: OnceLock<Option<UserPassword>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let raw = RawPassword::candidate("no-such-account".to_string());
            UserPassword::from_raw(&raw, None).ok()
        })
        .as_ref()
}
