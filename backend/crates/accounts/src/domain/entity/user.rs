//! User Entity
//!
//! Account record: identity, credentials and email confirmation state.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    confirm_number::ConfirmNumber, email::Email, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};

#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Unique, case-insensitive
    pub user_name: UserName,
    /// Unique, lowercase
    pub email: Email,
    pub password: UserPassword,
    /// Flipped once by email verification, never back
    pub is_confirmed: bool,
    /// Code generated at registration
    pub confirm_number: ConfirmNumber,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unconfirmed user with a fresh confirmation number
    pub fn new(user_name: UserName, email: Email, password: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password,
            is_confirmed: false,
            confirm_number: ConfirmNumber::generate(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login, returning its timestamp
    pub fn record_login(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
        now
    }
}
