//! Logout Use Case
//!
//! Blacklists the presented refresh token so it can no longer be exchanged
//! for access tokens.

use std::sync::Arc;

use crate::application::tokens::{TokenIssuer, TokenType};
use crate::domain::entity::blacklisted_token::BlacklistedToken;
use crate::domain::repository::TokenBlacklistRepository;
use crate::error::{AccountError, AccountResult};

pub struct LogoutUseCase<R> {
    repo: Arc<R>,
    issuer: TokenIssuer,
}

impl<R> LogoutUseCase<R>
where
    R: TokenBlacklistRepository,
{
    pub fn new(repo: Arc<R>, issuer: TokenIssuer) -> Self {
        Self { repo, issuer }
    }

    pub async fn execute(&self, refresh: &str) -> AccountResult<()> {
        let claims = self.issuer.decode(refresh, TokenType::Refresh)?;
        let token = BlacklistedToken::new(claims.jti()?, claims.user_id()?, claims.expires_at()?);

        if !self.repo.blacklist(&token).await? {
            return Err(AccountError::TokenBlacklisted);
        }

        tracing::info!(user_id = %token.user_id, jti = %token.jti, "Refresh token blacklisted");
        Ok(())
    }
}
