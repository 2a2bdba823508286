//! Blacklisted Token Entity
//!
//! A refresh token revoked before its expiry. Rows are useless once
//! `expires_at` has passed and are purged at startup.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistedToken {
    /// `jti` claim of the revoked token
    pub jti: Uuid,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub blacklisted_at: DateTime<Utc>,
}

impl BlacklistedToken {
    pub fn new(jti: Uuid, user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti,
            user_id,
            expires_at,
            blacklisted_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
