//! Account Error Types
//!
//! Account-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, validation::ValidationErrors};
use platform::mail::MailError;
use thiserror::Error;

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

pub const NOT_FOUND_MESSAGE: &str = "Not found.";
pub const MAIL_FAILURE_MESSAGE: &str = "An error occurred while sending email";

#[derive(Debug, Error)]
pub enum AccountError {
    /// Field-level validation failures
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    /// Lookup failed; never says which part of the lookup did not match
    #[error("Not found.")]
    NotFound,

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    /// Bad signature, expired, wrong token type or unknown subject
    #[error("Token is invalid or expired")]
    TokenInvalid,

    #[error("Token is blacklisted")]
    TokenBlacklisted,

    #[error("Please confirm your email address before continuing.")]
    EmailNotConfirmed,

    #[error("Mail delivery failed: {0}")]
    Mail(MailError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Single-field validation error
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AccountError::Validation(ValidationErrors::field(field, message))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Validation(_) => ErrorKind::BadRequest,
            AccountError::NotFound => ErrorKind::NotFound,
            AccountError::NotAuthenticated
            | AccountError::InvalidCredentials
            | AccountError::TokenInvalid
            | AccountError::TokenBlacklisted => ErrorKind::Unauthorized,
            AccountError::EmailNotConfirmed => ErrorKind::Forbidden,
            AccountError::Mail(e) if e.is_timeout() => ErrorKind::RequestTimeout,
            AccountError::Mail(_) => ErrorKind::ServiceUnavailable,
            AccountError::Database(_) | AccountError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError; internal details stay in the logs
    pub fn to_app_error(&self) -> AppError {
        match self {
            AccountError::Validation(errors) => AppError::validation(errors.clone()),
            AccountError::NotFound => AppError::not_found(NOT_FOUND_MESSAGE),
            AccountError::Mail(_) => AppError::new(self.kind(), MAIL_FAILURE_MESSAGE)
                .with_action("Please try again later"),
            AccountError::Database(_) | AccountError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::Mail(e) => {
                tracing::error!(error = %e, "Email delivery failed");
            }
            AccountError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AccountError::TokenBlacklisted => {
                tracing::warn!("Blacklisted token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<ValidationErrors> for AccountError {
    fn from(errors: ValidationErrors) -> Self {
        AccountError::Validation(errors)
    }
}

impl From<MailError> for AccountError {
    fn from(err: MailError) -> Self {
        AccountError::Mail(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AccountError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(error = %err, "Token rejected");
        AccountError::TokenInvalid
    }
}

impl From<AppError> for AccountError {
    fn from(err: AppError) -> Self {
        AccountError::Internal(err.to_string())
    }
}
