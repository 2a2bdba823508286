//! JWT Token Issuer
//!
//! HS256 access/refresh pairs. Both tokens carry the user's name, email and
//! confirmation flag as custom claims. Revocation of refresh tokens lives in
//! the blacklist repository, not here.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AccountError, AccountResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub jti: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_confirmed: Option<bool>,
}

impl Claims {
    pub fn user_id(&self) -> AccountResult<UserId> {
        self.sub.parse().map_err(|_| AccountError::TokenInvalid)
    }

    pub fn jti(&self) -> AccountResult<Uuid> {
        Uuid::parse_str(&self.jti).map_err(|_| AccountError::TokenInvalid)
    }

    pub fn expires_at(&self) -> AccountResult<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0).ok_or(AccountError::TokenInvalid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenIssuer {
    pub fn new(config: &AccountConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            validation,
            access_ttl: ttl_secs(config.access_token_ttl),
            refresh_ttl: ttl_secs(config.refresh_token_ttl),
        }
    }

    /// Fresh access + refresh pair for a user
    pub fn issue_pair(&self, user: &User) -> AccountResult<TokenPair> {
        let now = Utc::now().timestamp();
        let access = self.claims_for(user, TokenType::Access, now, self.access_ttl);
        let refresh = self.claims_for(user, TokenType::Refresh, now, self.refresh_ttl);

        Ok(TokenPair {
            access: self.encode(&access)?,
            refresh: self.encode(&refresh)?,
        })
    }

    /// Access token alone, with claims taken from the user as stored now
    pub fn issue_access(&self, user: &User) -> AccountResult<String> {
        let now = Utc::now().timestamp();
        self.encode(&self.claims_for(user, TokenType::Access, now, self.access_ttl))
    }

    /// Verify signature and expiry, then check the token type
    pub fn decode(&self, token: &str, expected: TokenType) -> AccountResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.token_type != expected {
            tracing::debug!(
                expected = ?expected,
                actual = ?claims.token_type,
                "Token type mismatch"
            );
            return Err(AccountError::TokenInvalid);
        }

        Ok(claims)
    }

    pub(crate) fn encode(&self, claims: &Claims) -> AccountResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AccountError::Internal(format!("Token encoding failed: {e}")))
    }

    fn claims_for(&self, user: &User, token_type: TokenType, now: i64, ttl: i64) -> Claims {
        Claims {
            sub: user.user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            iat: now,
            exp: now.saturating_add(ttl),
            username: Some(user.user_name.to_string()),
            email: Some(user.email.to_string()),
            is_confirmed: Some(user.is_confirmed),
        }
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}
