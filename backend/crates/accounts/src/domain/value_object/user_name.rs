//! User Name Value Object
//!
//! Public handle used for login and display.
//!
//! ## Rules
//! - NFKC normalization, trim, then validation of the lowercase form
//! - ASCII only: a-z, 0-9 and `_ . - +`
//! - 3 to 30 characters
//! - Starts and ends with a letter, digit or `_`
//! - No `..`, at least one letter or digit, not a reserved word
//!
//! `@` is never allowed, so a login identifier containing `@` is always an
//! email address.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-', '+'];

const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "support",
    "api",
    "auth",
    "login",
    "logout",
    "register",
    "password",
    "token",
    "me",
    "null",
    "undefined",
    "anonymous",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("This field may not be blank.")]
    Empty,

    #[error("Ensure this field has at least {min} characters.")]
    TooShort { length: usize, min: usize },

    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { length: usize, max: usize },

    #[error("Enter a valid username. Only letters, digits and _ . - + are allowed.")]
    InvalidCharacter { char: char },

    #[error("A username must start and end with a letter, digit or underscore.")]
    InvalidEdge { char: char },

    #[error("A username cannot contain consecutive dots.")]
    ConsecutiveDots,

    #[error("A username must contain at least one letter or digit.")]
    NoAlphanumeric,

    #[error("This username is reserved.")]
    Reserved,
}

/// Validated, normalized user name
///
/// `original` keeps the user's casing for display; `canonical` is the
/// lowercase form used for uniqueness and lookups.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = input.as_ref().nfkc().collect::<String>().trim().to_string();
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        let (Some(first), Some(last)) = (canonical.chars().next(), canonical.chars().next_back())
        else {
            return Err(UserNameError::Empty);
        };

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some(char) = canonical.chars().find(|&c| !is_valid_char(c)) {
            return Err(UserNameError::InvalidCharacter { char });
        }

        for char in [first, last] {
            if !(char.is_ascii_alphanumeric() || char == '_') {
                return Err(UserNameError::InvalidEdge { char });
            }
        }

        if canonical.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        if !canonical.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        if RESERVED_WORDS.contains(&canonical) {
            return Err(UserNameError::Reserved);
        }

        Ok(())
    }
}

#[inline]
fn is_valid_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&c)
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({})", self.original)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["amina", "Baraka_99", "j.doe", "kilimanjaro-2026", "_x_"] {
            assert!(UserName::new(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_canonical_form() {
        let name = UserName::new("  Amina.Juma ").unwrap();
        assert_eq!(name.original(), "Amina.Juma");
        assert_eq!(name.canonical(), "amina.juma");
        assert_eq!(name.to_string(), "Amina.Juma");
    }

    #[test]
    fn test_nfkc_fullwidth() {
        let name = UserName::new("ａｍｉｎａ").unwrap();
        assert_eq!(name.canonical(), "amina");
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
        assert!(matches!(UserName::new("ab"), Err(UserNameError::TooShort { .. })));
        assert!(matches!(
            UserName::new("a".repeat(31)),
            Err(UserNameError::TooLong { .. })
        ));
        assert_eq!(
            UserName::new("amina@example.com"),
            Err(UserNameError::InvalidCharacter { char: '@' })
        );
        assert_eq!(
            UserName::new("amina juma"),
            Err(UserNameError::InvalidCharacter { char: ' ' })
        );
        assert_eq!(
            UserName::new(".amina"),
            Err(UserNameError::InvalidEdge { char: '.' })
        );
        assert_eq!(UserName::new("a..b"), Err(UserNameError::ConsecutiveDots));
        assert_eq!(UserName::new("Admin"), Err(UserNameError::Reserved));
    }
}
