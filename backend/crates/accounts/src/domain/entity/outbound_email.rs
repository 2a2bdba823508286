//! Outbound Email Entity
//!
//! A row in the email outbox. Created `pending`, then moved exactly once to
//! `sent` or `failed` by the dispatcher. Failed emails are not retried.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use platform::mail::OutgoingMail;

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, email_id::EmailId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    VerificationCode,
    PasswordReset,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::VerificationCode => "verification_code",
            EmailKind::PasswordReset => "password_reset",
        }
    }
}

impl FromStr for EmailKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verification_code" => Ok(EmailKind::VerificationCode),
            "password_reset" => Ok(EmailKind::PasswordReset),
            other => Err(format!("unknown email kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "sent" => Ok(DeliveryStatus::Sent),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub email_id: EmailId,
    pub recipient: Email,
    pub kind: EmailKind,
    pub subject: String,
    pub body: String,
    pub status: DeliveryStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl OutboundEmail {
    fn new(recipient: Email, kind: EmailKind, subject: &str, body: String) -> Self {
        let now = Utc::now();

        Self {
            email_id: EmailId::new(),
            recipient,
            kind,
            subject: subject.to_string(),
            body,
            status: DeliveryStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
            sent_at: None,
        }
    }

    /// Email carrying the user's confirmation number
    pub fn verification_code(user: &User) -> Self {
        let body = format!(
            "Hi {},\n\n\
             Use the code below to confirm your email address:\n\n\
             {}\n\n\
             If you did not create an account, you can ignore this email.\n",
            user.user_name, user.confirm_number
        );
        Self::new(
            user.email.clone(),
            EmailKind::VerificationCode,
            "Confirm your email",
            body,
        )
    }

    /// Email carrying a password reset link
    pub fn password_reset(user: &User, link: &str) -> Self {
        let body = format!(
            "Hi {},\n\n\
             Click the link below to reset your password:\n\n\
             {}\n\n\
             If you did not request a password reset, you can ignore this email.\n",
            user.user_name, link
        );
        Self::new(
            user.email.clone(),
            EmailKind::PasswordReset,
            "Reset Your Password",
            body,
        )
    }

    pub fn to_mail(&self) -> OutgoingMail {
        OutgoingMail::new(self.recipient.as_str(), &self.subject, &self.body)
    }

    pub fn is_pending(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }

    /// Delivery outcomes drop the body: it holds a live code or reset link
    /// that nothing reads again
    pub fn mark_sent(&mut self) {
        let now = Utc::now();
        self.body.clear();
        self.status = DeliveryStatus::Sent;
        self.attempts += 1;
        self.last_error = None;
        self.sent_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.body.clear();
        self.status = DeliveryStatus::Failed;
        self.attempts += 1;
        self.last_error = Some(error.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };

    fn user() -> User {
        let raw = RawPassword::candidate("Kilimanjaro#2026".to_string());
        User::new(
            UserName::new("Amina").unwrap(),
            Email::new("amina@example.com").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
        )
    }

    #[test]
    fn test_verification_code_email() {
        let user = user();
        let email = OutboundEmail::verification_code(&user);

        assert_eq!(email.kind, EmailKind::VerificationCode);
        assert!(email.is_pending());
        assert!(email.body.contains(user.confirm_number.as_str()));
        assert!(email.body.starts_with("Hi Amina,"));
        assert_eq!(email.to_mail().to, "amina@example.com");
    }

    #[test]
    fn test_password_reset_email() {
        let email = OutboundEmail::password_reset(&user(), "http://front/reset/uid/token");
        assert_eq!(email.subject, "Reset Your Password");
        assert!(email.body.contains("http://front/reset/uid/token"));
    }

    #[test]
    fn test_status_transitions() {
        let mut email = OutboundEmail::password_reset(&user(), "link");

        email.mark_failed("connection refused");
        assert_eq!(email.status, DeliveryStatus::Failed);
        assert_eq!(email.attempts, 1);
        assert_eq!(email.last_error.as_deref(), Some("connection refused"));
        assert!(email.sent_at.is_none());
        assert!(email.body.is_empty());

        let mut email = OutboundEmail::verification_code(&user());
        email.mark_sent();
        assert_eq!(email.status, DeliveryStatus::Sent);
        assert!(email.sent_at.is_some());
        assert!(email.body.is_empty());
    }

    #[test]
    fn test_status_strings() {
        for status in [DeliveryStatus::Pending, DeliveryStatus::Sent, DeliveryStatus::Failed] {
            assert_eq!(status.as_str().parse::<DeliveryStatus>(), Ok(status));
        }
        assert_eq!(
            "password_reset".parse::<EmailKind>(),
            Ok(EmailKind::PasswordReset)
        );
        assert!("newsletter".parse::<EmailKind>().is_err());
    }
}
