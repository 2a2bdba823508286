//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names are unique across traits so one store can implement all of
//! them without ambiguous calls.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{
    blacklisted_token::BlacklistedToken, outbound_email::OutboundEmail, user::User,
};
use crate::domain::value_object::{
    confirm_number::ConfirmNumber, email::Email, email_id::EmailId, user_id::UserId,
    user_name::UserName, user_password::UserPassword,
};
use crate::error::AccountResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user; a duplicate username or email is a validation error
    async fn create(&self, user: &User) -> AccountResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AccountResult<Option<User>>;

    /// Lookup by canonical (lowercase) user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AccountResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AccountResult<bool>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AccountResult<bool>;

    /// Confirm the unconfirmed user matching both values in one write and
    /// return it; `None` when no such user exists
    async fn confirm_user(
        &self,
        email: &Email,
        confirm_number: &ConfirmNumber,
        at: DateTime<Utc>,
    ) -> AccountResult<Option<User>>;

    /// Touches only the login timestamp
    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AccountResult<()>;

    /// Swap the password hash if it still equals `current`.
    /// Returns `false` when another write changed it first.
    async fn replace_password(
        &self,
        user_id: &UserId,
        current: &UserPassword,
        new: &UserPassword,
        at: DateTime<Utc>,
    ) -> AccountResult<bool>;
}

/// Revoked refresh tokens
#[trait_variant::make(TokenBlacklistRepository: Send)]
pub trait LocalTokenBlacklistRepository {
    /// Returns `false` when the token was already blacklisted
    async fn blacklist(&self, token: &BlacklistedToken) -> AccountResult<bool>;

    async fn is_blacklisted(&self, jti: &Uuid) -> AccountResult<bool>;

    /// Delete entries whose token has expired anyway
    async fn cleanup_expired(&self) -> AccountResult<u64>;
}

/// Persisted queue of outbound emails
#[trait_variant::make(EmailOutboxRepository: Send)]
pub trait LocalEmailOutboxRepository {
    async fn enqueue(&self, email: &OutboundEmail) -> AccountResult<()>;

    async fn find_email(&self, email_id: &EmailId) -> AccountResult<Option<OutboundEmail>>;

    /// Pending emails, oldest first
    async fn pending_emails(&self) -> AccountResult<Vec<OutboundEmail>>;

    /// Store status, attempts, last error, sent time and the (cleared) body
    async fn record_delivery(&self, email: &OutboundEmail) -> AccountResult<()>;
}

/// Everything the account service needs from its store
pub trait AccountStore:
    UserRepository + TokenBlacklistRepository + EmailOutboxRepository + Send + Sync + 'static
{
}

impl<T> AccountStore for T where
    T: UserRepository + TokenBlacklistRepository + EmailOutboxRepository + Send + Sync + 'static
{
}
