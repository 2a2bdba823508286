//! API DTOs (Data Transfer Objects)
//!
//! Request fields are optional at the serde level so that a missing field is
//! reported next to the others instead of failing the whole body.

use std::fmt::Display;

use kernel::error::validation::ValidationErrors;
use serde::{Deserialize, Serialize};

use crate::application::{
    ChangePasswordInput, ConfirmPasswordResetInput, ObtainTokenInput, RegisterInput,
    VerifyEmailInput,
};
use crate::domain::value_object::{
    confirm_number::ConfirmNumber, email::Email, user_name::UserName, user_password::RawPassword,
};
use crate::presentation::action::Schema;
use crate::presentation::extract::RequestSchema;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

/// Present and not blank
fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        Some(_) => {
            errors.add(field, BLANK_MESSAGE);
            None
        }
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            None
        }
    }
}

/// Required, then parsed into a value object
fn parse<T, E: Display>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
    parser: impl FnOnce(String) -> Result<T, E>,
) -> Option<T> {
    let value = required(errors, field, value)?;
    match parser(value) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RequestSchema for RegisterRequest {
    const SCHEMA: Schema = Schema::UserRegistration;
    type Valid = RegisterInput;

    fn validate(self) -> Result<RegisterInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let user_name = parse(&mut errors, "username", self.username, UserName::new);
        let email = parse(&mut errors, "email", self.email, Email::new);
        let password = parse(&mut errors, "password", self.password, RawPassword::new);

        match (user_name, email, password) {
            (Some(user_name), Some(email), Some(password)) => Ok(RegisterInput {
                user_name,
                email,
                password,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
    pub message: String,
}

// ============================================================================
// Email-only bodies
// ============================================================================

/// Resend activation code
#[derive(Debug, Clone, Deserialize)]
pub struct ResendActivationRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl RequestSchema for ResendActivationRequest {
    const SCHEMA: Schema = Schema::ResendActivationCode;
    type Valid = Email;

    fn validate(self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        parse(&mut errors, "email", self.email, Email::new).ok_or(errors)
    }
}

/// Password reset request
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl RequestSchema for PasswordResetRequest {
    const SCHEMA: Schema = Schema::SendPasswordResetEmail;
    type Valid = Email;

    fn validate(self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        parse(&mut errors, "email", self.email, Email::new).ok_or(errors)
    }
}

// ============================================================================
// Passwords
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

impl RequestSchema for ChangePasswordRequest {
    const SCHEMA: Schema = Schema::UserChangePassword;
    type Valid = ChangePasswordInput;

    fn validate(self) -> Result<ChangePasswordInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let old_password = required(&mut errors, "old_password", self.old_password)
            .map(RawPassword::candidate);
        let new_password = parse(&mut errors, "new_password", self.new_password, RawPassword::new);

        match (old_password, new_password) {
            (Some(old_password), Some(new_password)) => Ok(ChangePasswordInput {
                old_password,
                new_password,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetConfirmRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

impl RequestSchema for PasswordResetConfirmRequest {
    const SCHEMA: Schema = Schema::PasswordResetConfirm;
    type Valid = ConfirmPasswordResetInput;

    fn validate(self) -> Result<ConfirmPasswordResetInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let uid = required(&mut errors, "uid", self.uid);
        let token = required(&mut errors, "token", self.token);
        let new_password = parse(&mut errors, "new_password", self.new_password, RawPassword::new);

        match (uid, token, new_password) {
            (Some(uid), Some(token), Some(new_password)) => Ok(ConfirmPasswordResetInput {
                uid,
                token,
                new_password,
            }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// Verify Email
// ============================================================================

/// Confirmation numbers arrive as `"012345"` or `12345`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CodeField {
    Text(String),
    Number(u64),
}

impl From<CodeField> for String {
    fn from(code: CodeField) -> Self {
        match code {
            CodeField::Text(text) => text,
            CodeField::Number(n) => format!("{n:06}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub confirm_number: Option<CodeField>,
}

impl RequestSchema for VerifyEmailRequest {
    const SCHEMA: Schema = Schema::VerificationEmail;
    type Valid = VerifyEmailInput;

    fn validate(self) -> Result<VerifyEmailInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = parse(&mut errors, "email", self.email, Email::new);
        let confirm_number = parse(
            &mut errors,
            "confirm_number",
            self.confirm_number.map(String::from),
            |code| ConfirmNumber::parse(&code),
        );

        match (email, confirm_number) {
            (Some(email), Some(confirm_number)) => Ok(VerifyEmailInput {
                email,
                confirm_number,
            }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ObtainTokenRequest {
    /// User name or email
    #[serde(default, alias = "username", alias = "email")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RequestSchema for ObtainTokenRequest {
    const SCHEMA: Schema = Schema::ObtainToken;
    type Valid = ObtainTokenInput;

    fn validate(self) -> Result<ObtainTokenInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let identifier = required(&mut errors, "identifier", self.identifier);
        let password = required(&mut errors, "password", self.password);

        match (identifier, password) {
            (Some(identifier), Some(password)) => Ok(ObtainTokenInput {
                identifier: identifier.trim().to_string(),
                password: RawPassword::candidate(password),
            }),
            _ => Err(errors),
        }
    }
}

/// Logout body
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBlacklistRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

impl RequestSchema for TokenBlacklistRequest {
    const SCHEMA: Schema = Schema::TokenBlacklist;
    type Valid = String;

    fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "refresh", self.refresh).ok_or(errors)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

impl RequestSchema for TokenRefreshRequest {
    const SCHEMA: Schema = Schema::TokenRefresh;
    type Valid = String;

    fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "refresh", self.refresh).ok_or(errors)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

// ============================================================================
// Common
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body<T: RequestSchema>(json: &str) -> Result<T::Valid, ValidationErrors> {
        serde_json::from_str::<T>(json).unwrap().validate()
    }

    #[test]
    fn test_register_collects_all_field_errors() {
        let errors = body::<RegisterRequest>(r#"{"email": "nope", "password": "123"}"#)
            .unwrap_err();

        assert_eq!(errors.messages("username"), [REQUIRED_MESSAGE]);
        assert_eq!(errors.messages("email"), ["Enter a valid email address."]);
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_register_valid() {
        let input = body::<RegisterRequest>(
            r#"{"username": "Amina", "email": "Amina@Example.com", "password": "Kilimanjaro#2026"}"#,
        )
        .unwrap();
        assert_eq!(input.user_name.original(), "Amina");
        assert_eq!(input.email.as_str(), "amina@example.com");
    }

    #[test]
    fn test_blank_is_not_missing() {
        let errors = body::<ResendActivationRequest>(r#"{"email": "  "}"#).unwrap_err();
        assert_eq!(errors.messages("email"), [BLANK_MESSAGE]);
    }

    #[test]
    fn test_confirm_number_as_string_or_number() {
        let input = body::<VerifyEmailRequest>(
            r#"{"email": "amina@example.com", "confirm_number": "012345"}"#,
        )
        .unwrap();
        assert_eq!(input.confirm_number.as_str(), "012345");

        let input = body::<VerifyEmailRequest>(
            r#"{"email": "amina@example.com", "confirm_number": 12345}"#,
        )
        .unwrap();
        assert_eq!(input.confirm_number.as_str(), "012345");

        let errors = body::<VerifyEmailRequest>(
            r#"{"email": "amina@example.com", "confirm_number": "12ab56"}"#,
        )
        .unwrap_err();
        assert!(errors.contains("confirm_number"));
    }

    #[test]
    fn test_old_password_skips_policy() {
        let input = body::<ChangePasswordRequest>(
            r#"{"old_password": "123", "new_password": "Serengeti#2027"}"#,
        );
        assert!(input.is_ok());

        let errors = body::<ChangePasswordRequest>(
            r#"{"old_password": "123", "new_password": "123"}"#,
        )
        .unwrap_err();
        assert!(!errors.contains("old_password"));
        assert!(errors.contains("new_password"));
    }

    #[test]
    fn test_obtain_token_accepts_username_alias() {
        let input =
            body::<ObtainTokenRequest>(r#"{"username": " amina ", "password": "x"}"#).unwrap();
        assert_eq!(input.identifier, "amina");
    }

    #[test]
    fn test_refresh_required() {
        let errors = body::<TokenBlacklistRequest>("{}").unwrap_err();
        assert_eq!(errors.messages("refresh"), [REQUIRED_MESSAGE]);
    }
}
