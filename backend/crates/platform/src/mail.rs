//! Outbound Mail
//!
//! [`Mailer`] is the seam between the application and the mail transport.
//! [`SmtpMailer`] relays through an SMTP server with STARTTLS;
//! [`LogMailer`] only logs that a message was due (development builds).

use std::time::Duration;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::{ConfigError, Env};

/// A plain-text message ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("Timed out while sending email")]
    Timeout,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}

impl MailError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, MailError::Timeout)
    }
}

#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

// ============================================================================
// SMTP
// ============================================================================

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender mailbox, e.g. `Accounts <no-reply@example.com>`
    pub from: String,
    pub timeout: Duration,
}

impl SmtpSettings {
    /// `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `MAIL_FROM`,
    /// `MAIL_TIMEOUT_SECS`
    ///
    /// Without `SMTP_HOST` this is `None` if `allow_log_mailer` is set and a
    /// [`ConfigError::Missing`] otherwise.
    pub fn from_env(env: &Env, allow_log_mailer: bool) -> Result<Option<Self>, ConfigError> {
        let host = match env.get("SMTP_HOST") {
            Some(host) => host,
            None if allow_log_mailer => return Ok(None),
            None => env.require("SMTP_HOST")?,
        };

        Ok(Some(Self {
            host: host.to_string(),
            port: env.parse_or("SMTP_PORT", 587)?,
            username: env.get("SMTP_USERNAME").map(str::to_string),
            password: env.get("SMTP_PASSWORD").map(str::to_string),
            from: env.string_or("MAIL_FROM", "no-reply@localhost"),
            timeout: env.secs_or("MAIL_TIMEOUT_SECS", Duration::from_secs(10))?,
        }))
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {e}", settings.from)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .timeout(Some(settings.timeout));

        if let (Some(username), Some(password)) = (settings.username, settings.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            timeout: settings.timeout,
        })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, MailError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {e}", mail.to)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = self.build_message(mail)?;

        // The transport timeout covers single socket operations only
        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Err(_) => Err(MailError::Timeout),
            Ok(Err(e)) if e.is_timeout() => Err(MailError::Timeout),
            Ok(Err(e)) => Err(MailError::Transport(e.to_string())),
            Ok(Ok(response)) => {
                tracing::debug!(code = %response.code(), "SMTP relay accepted message");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Log only
// ============================================================================

/// Logs recipient and subject instead of sending
///
/// Bodies carry confirmation codes and reset links, so they never reach
/// the log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if !mail.to.contains('@') {
            return Err(MailError::InvalidAddress(mail.to.clone()));
        }
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            body_len = mail.body.len(),
            "Email not sent (log mailer)"
        );
        Ok(())
    }
}
