//! Application Configuration
//!
//! Configuration for the account application layer.

use std::time::Duration;

use platform::config::{ConfigError, Env};
use platform::crypto;

pub const DEFAULT_FRONT_END_URL: &str = "http://localhost:40922/password/reset/";

/// Upper bound for access and refresh token lifetimes (one year)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// HS256 signing key; also keys password reset tokens
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime (5 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (1 day)
    pub refresh_token_ttl: Duration,
    /// Password reset link lifetime (3 days)
    pub password_reset_timeout: Duration,
    /// Base of the reset link; `uid/token` is appended
    pub front_end_url: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            jwt_secret: vec![0u8; 32],
            access_token_ttl: Duration::from_secs(5 * 60),
            refresh_token_ttl: Duration::from_secs(24 * 3600),
            password_reset_timeout: Duration::from_secs(3 * 24 * 3600),
            front_end_url: DEFAULT_FRONT_END_URL.to_string(),
            password_pepper: None,
        }
    }
}

impl AccountConfig {
    /// Create config with a random signing secret
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: crypto::random_bytes(64),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Read configuration from the environment
    ///
    /// `JWT_SECRET` is required unless `allow_random_secret` is set (debug
    /// builds), in which case a missing secret is replaced by a random one
    /// and every restart invalidates issued tokens.
    pub fn from_env(env: &Env, allow_random_secret: bool) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = match env.base64("JWT_SECRET")? {
            Some(secret) if secret.len() >= 32 => secret,
            Some(_) => {
                return Err(ConfigError::Invalid {
                    name: "JWT_SECRET".to_string(),
                    reason: "must decode to at least 32 bytes".to_string(),
                });
            }
            None if allow_random_secret => {
                tracing::warn!("JWT_SECRET not set, using a random secret");
                crypto::random_bytes(64)
            }
            None => {
                return Err(ConfigError::Missing {
                    name: "JWT_SECRET".to_string(),
                });
            }
        };

        Ok(Self {
            jwt_secret,
            access_token_ttl: token_ttl(env, "ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: token_ttl(env, "REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl)?,
            password_reset_timeout: env
                .secs_or("PASSWORD_RESET_TIMEOUT_SECS", defaults.password_reset_timeout)?,
            front_end_url: env.string_or("FRONT_END_URL", DEFAULT_FRONT_END_URL),
            password_pepper: env.base64("PASSWORD_PEPPER")?,
        })
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// `FRONT_END_URL + uid + "/" + token`
    pub fn password_reset_link(&self, uid: &str, token: &str) -> String {
        format!("{}{}/{}", self.front_end_url, uid, token)
    }
}

/// Whole seconds, at most [`MAX_TOKEN_TTL`]
fn token_ttl(env: &Env, name: &str, default: Duration) -> Result<Duration, ConfigError> {
    let ttl = env.secs_or(name, default)?;
    if ttl > MAX_TOKEN_TTL {
        return Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("must be between 1 and {} seconds", MAX_TOKEN_TTL.as_secs()),
        });
    }
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AccountConfig::default();
        assert_eq!(config.access_token_ttl, Duration::from_secs(300));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(86400));
        assert_eq!(config.password_reset_timeout, Duration::from_secs(259200));
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_reset_link() {
        let config = AccountConfig {
            front_end_url: "https://app.example.com/reset/".to_string(),
            ..AccountConfig::default()
        };
        assert_eq!(
            config.password_reset_link("MTIz", "abc-def"),
            "https://app.example.com/reset/MTIz/abc-def"
        );
    }

    #[test]
    fn test_from_env() {
        let secret = crypto::to_base64(&[7u8; 32]);
        let env = Env::from_pairs([
            ("JWT_SECRET", secret.as_str()),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("FRONT_END_URL", "https://app.example.com/reset/"),
        ]);

        let config = AccountConfig::from_env(&env, false).unwrap();
        assert_eq!(config.jwt_secret, vec![7u8; 32]);
        assert_eq!(config.access_token_ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(86400));
        assert_eq!(config.front_end_url, "https://app.example.com/reset/");
    }

    #[test]
    fn test_from_env_secret_rules() {
        let empty = Env::default();
        assert!(matches!(
            AccountConfig::from_env(&empty, false),
            Err(ConfigError::Missing { .. })
        ));
        assert_eq!(
            AccountConfig::from_env(&empty, true).unwrap().jwt_secret.len(),
            64
        );

        let short = Env::from_pairs([("JWT_SECRET", crypto::to_base64(b"short"))]);
        assert!(matches!(
            AccountConfig::from_env(&short, true),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_from_env_token_ttl_bounds() {
        for (name, value) in [
            ("ACCESS_TOKEN_TTL_SECS", "0"),
            ("ACCESS_TOKEN_TTL_SECS", "18446744073709551615"),
            ("REFRESH_TOKEN_TTL_SECS", "31536001"),
        ] {
            let env = Env::from_pairs([(name, value)]);
            assert!(
                matches!(
                    AccountConfig::from_env(&env, true),
                    Err(ConfigError::Invalid { name: ref invalid, .. }) if invalid == name
                ),
                "{name}={value}"
            );
        }

        let env = Env::from_pairs([("REFRESH_TOKEN_TTL_SECS", "31536000")]);
        assert_eq!(
            AccountConfig::from_env(&env, true).unwrap().refresh_token_ttl,
            MAX_TOKEN_TTL
        );
    }
}
