//! Authenticate Use Case
//!
//! Resolves a bearer access token to the user it was issued for.

use std::sync::Arc;

use crate::application::tokens::{TokenIssuer, TokenType};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AccountError, AccountResult};

pub struct AuthenticateUseCase<R> {
    repo: Arc<R>,
    issuer: TokenIssuer,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, issuer: TokenIssuer) -> Self {
        Self { repo, issuer }
    }

    pub async fn execute(&self, access: &str) -> AccountResult<User> {
        let claims = self.issuer.decode(access, TokenType::Access)?;
        let user_id = claims.user_id()?;

        self.repo.find_by_id(&user_id).await?.ok_or_else(|| {
            tracing::debug!(%user_id, "Token subject no longer exists");
            AccountError::TokenInvalid
        })
    }
}
