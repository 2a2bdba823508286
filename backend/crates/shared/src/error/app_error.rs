//! Application Error
//!
//! [`AppError`] is what every crate hands to the HTTP layer: a classification,
//! a user-facing `detail`, an optional next step and optional field errors.

use std::borrow::Cow;
use std::fmt;

use super::kind::ErrorKind;
use super::validation::ValidationErrors;

/// Unified application error
///
/// Crates keep their own `thiserror` enums and convert at the boundary.
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::RequestTimeout, "An error occurred while sending email")
///     .with_action("Please try again later");
/// assert_eq!(err.status_code(), 408);
/// ```
#[derive(Debug, Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    action: Option<Cow<'static, str>>,
    errors: Option<ValidationErrors>,
}

/// `Result<T, AppError>` shorthand
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            errors: None,
        }
    }

    /// 400 with field-level messages
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(ErrorKind::BadRequest, "Invalid input.")
        }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status_code(), self.kind, self.message)?;
        if let Some(errors) = &self.errors {
            write!(f, " ({errors})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Not found.");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Not found.");
        assert!(err.action().is_none());
        assert!(err.validation_errors().is_none());
    }

    #[test]
    fn test_validation_error() {
        let err: AppError = ValidationErrors::field("email", "Already taken.").into();
        assert_eq!(err.status_code(), 400);
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.messages("email"), ["Already taken.".to_string()]);
        assert!(err.to_string().contains("email: Already taken."));
    }

    #[test]
    fn test_display() {
        let err = AppError::new(ErrorKind::ServiceUnavailable, "Mail relay down")
            .with_action("Please try again later");
        assert_eq!(err.to_string(), "503 Service Unavailable: Mail relay down");
        assert_eq!(err.action(), Some("Please try again later"));
    }
}
