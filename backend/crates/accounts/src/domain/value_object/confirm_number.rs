//! Confirmation Number
//!
//! Six-digit code emailed at registration to prove ownership of the address.

use std::fmt;

use rand::Rng;
use thiserror::Error;

pub const CONFIRM_NUMBER_DIGITS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Enter a valid 6-digit confirmation number.")]
pub struct ConfirmNumberError;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConfirmNumber(String);

impl ConfirmNumber {
    /// Fresh random code, zero padded ("004821")
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    pub fn parse(input: &str) -> Result<Self, ConfirmNumberError> {
        let input = input.trim();
        if input.len() == CONFIRM_NUMBER_DIGITS && input.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(ConfirmNumberError)
        }
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ConfirmNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmNumber(******)")
    }
}
