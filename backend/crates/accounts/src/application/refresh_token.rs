//! Refresh Token Use Case

use std::sync::Arc;

use crate::application::tokens::{TokenIssuer, TokenType};
use crate::domain::repository::{TokenBlacklistRepository, UserRepository};
use crate::error::{AccountError, AccountResult};

pub struct RefreshTokenUseCase<R> {
    repo: Arc<R>,
    issuer: TokenIssuer,
}

impl<R> RefreshTokenUseCase<R>
where
    R: UserRepository + TokenBlacklistRepository,
{
    pub fn new(repo: Arc<R>, issuer: TokenIssuer) -> Self {
        Self { repo, issuer }
    }

    /// New access token for a valid, non-blacklisted refresh token
    ///
    /// Claims come from the stored user, so a confirmation made after login
    /// shows up in the new token. A deleted user invalidates the token.
    pub async fn execute(&self, refresh: &str) -> AccountResult<String> {
        let claims = self.issuer.decode(refresh, TokenType::Refresh)?;

        if self.repo.is_blacklisted(&claims.jti()?).await? {
            return Err(AccountError::TokenBlacklisted);
        }

        let user = self
            .repo
            .find_by_id(&claims.user_id()?)
            .await?
            .ok_or(AccountError::TokenInvalid)?;

        self.issuer.issue_access(&user)
    }
}
