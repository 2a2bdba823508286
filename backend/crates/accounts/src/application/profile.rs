//! Profile ("me")
//!
//! Read-only view of the authenticated user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entity::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOutput {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_confirmed: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for ProfileOutput {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            username: user.user_name.to_string(),
            email: user.email.to_string(),
            is_confirmed: user.is_confirmed,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}
