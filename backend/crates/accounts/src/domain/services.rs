//! Domain Services
//!
//! Password reset tokens: `<issued-at base36>-<signature>`.
//!
//! The signature is an HMAC-SHA256 over the user's id, email, password hash,
//! last login and the issue time. Nothing is stored: a token stops verifying
//! when it expires, when the password changes, or when the user logs in.

use std::time::Duration;

use chrono::Utc;
use platform::crypto;

use crate::domain::entity::user::User;

/// Domain separation for the HMAC input
const KEY_PURPOSE: &str = "accounts.password-reset";

pub struct PasswordResetTokens<'a> {
    secret: &'a [u8],
    timeout: Duration,
}

impl<'a> PasswordResetTokens<'a> {
    pub fn new(secret: &'a [u8], timeout: Duration) -> Self {
        Self { secret, timeout }
    }

    pub fn make_token(&self, user: &User) -> String {
        self.make_token_at(user, Utc::now().timestamp())
    }

    pub fn check_token(&self, user: &User, token: &str) -> bool {
        self.check_token_at(user, token, Utc::now().timestamp())
    }

    fn make_token_at(&self, user: &User, issued_at: i64) -> String {
        let signature = crypto::hmac_sha256(self.secret, &Self::hash_value(user, issued_at));
        format!(
            "{}-{}",
            to_base36(issued_at as u64),
            crypto::to_base64url(&signature)
        )
    }

    fn check_token_at(&self, user: &User, token: &str, now: i64) -> bool {
        let Some((ts, signature)) = token.trim().split_once('-') else {
            return false;
        };
        let Some(issued_at) = from_base36(ts).and_then(|t| i64::try_from(t).ok()) else {
            return false;
        };
        let Ok(signature) = crypto::from_base64url(signature) else {
            return false;
        };

        if !crypto::verify_hmac_sha256(
            self.secret,
            &Self::hash_value(user, issued_at),
            &signature,
        ) {
            return false;
        }

        let age = now - issued_at;
        age >= 0 && (age as u64) <= self.timeout.as_secs()
    }

    fn hash_value(user: &User, issued_at: i64) -> Vec<u8> {
        let last_login = user
            .last_login_at
            .map(|t| t.timestamp_micros().to_string())
            .unwrap_or_default();

        format!(
            "{KEY_PURPOSE}|{}|{}|{}|{}|{}",
            user.user_id,
            user.email,
            user.password.as_phc_string(),
            last_login,
            issued_at
        )
        .into_bytes()
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn from_base36(s: &str) -> Option<u64> {
    // u64::MAX is 13 base36 digits
    if s.is_empty() || s.len() > 13 {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}
