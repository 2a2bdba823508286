//! Mail Outbox
//!
//! Emails are persisted as `pending` before anything is sent. Queued emails
//! are delivered by a single dispatcher task fed through an unbounded
//! channel; `deliver_now` sends inline for callers that must report the
//! outcome. Either way the final status lands on the outbox row.

use std::sync::Arc;

use platform::mail::{MailError, Mailer};
use tokio::sync::mpsc;

use crate::domain::entity::outbound_email::OutboundEmail;
use crate::domain::repository::EmailOutboxRepository;
use crate::domain::value_object::email_id::EmailId;
use crate::error::{AccountError, AccountResult};

pub struct MailOutbox<R, M> {
    repo: Arc<R>,
    mailer: Arc<M>,
    queue: mpsc::UnboundedSender<EmailId>,
}

// Manual impl: derive would require R: Clone and M: Clone
impl<R, M> Clone for MailOutbox<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<R, M> MailOutbox<R, M>
where
    R: EmailOutboxRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    /// Spawn the dispatcher task; must be called inside a Tokio runtime
    ///
    /// The dispatcher stops once every clone of the outbox is dropped.
    pub fn start(repo: Arc<R>, mailer: Arc<M>) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();

        tokio::spawn(dispatch(repo.clone(), mailer.clone(), receiver));

        Self {
            repo,
            mailer,
            queue,
        }
    }

    /// Persist the email and hand it to the dispatcher
    pub async fn enqueue(&self, email: OutboundEmail) -> AccountResult<EmailId> {
        self.repo.enqueue(&email).await?;

        let email_id = email.email_id;
        self.queue
            .send(email_id)
            .map_err(|_| AccountError::Internal("Mail dispatcher stopped".to_string()))?;

        tracing::debug!(%email_id, kind = email.kind.as_str(), "Email queued");
        Ok(email_id)
    }

    /// Persist and send inline, returning the delivery error if any
    pub async fn deliver_now(&self, mut email: OutboundEmail) -> AccountResult<OutboundEmail> {
        self.repo.enqueue(&email).await?;

        match deliver(&*self.repo, &*self.mailer, &mut email).await {
            Ok(()) => Ok(email),
            Err(e) => Err(AccountError::Mail(e)),
        }
    }

    /// Re-queue emails left pending by a previous process
    pub async fn recover_pending(&self) -> AccountResult<usize> {
        let pending = self.repo.pending_emails().await?;
        let count = pending.len();

        for email in pending {
            self.queue
                .send(email.email_id)
                .map_err(|_| AccountError::Internal("Mail dispatcher stopped".to_string()))?;
        }

        if count > 0 {
            tracing::info!(emails = count, "Re-queued pending emails");
        }
        Ok(count)
    }
}

async fn dispatch<R, M>(
    repo: Arc<R>,
    mailer: Arc<M>,
    mut receiver: mpsc::UnboundedReceiver<EmailId>,
) where
    R: EmailOutboxRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    while let Some(email_id) = receiver.recv().await {
        let mut email = match repo.find_email(&email_id).await {
            Ok(Some(email)) if email.is_pending() => email,
            Ok(Some(_)) => {
                tracing::debug!(%email_id, "Email already delivered, skipping");
                continue;
            }
            Ok(None) => {
                tracing::warn!(%email_id, "Queued email not found in outbox");
                continue;
            }
            Err(e) => {
                tracing::error!(%email_id, error = %e, "Failed to load queued email");
                continue;
            }
        };

        // Failure is already recorded and logged by `deliver`
        let _ = deliver(&*repo, &*mailer, &mut email).await;
    }

    tracing::info!("Mail outbox closed - stopping dispatcher");
}

/// Send one email and record the outcome on its row
async fn deliver<R, M>(repo: &R, mailer: &M, email: &mut OutboundEmail) -> Result<(), MailError>
where
    R: EmailOutboxRepository,
    M: Mailer,
{
    let result = mailer.send(&email.to_mail()).await;

    match &result {
        Ok(()) => {
            email.mark_sent();
            tracing::info!(
                email_id = %email.email_id,
                kind = email.kind.as_str(),
                "Email sent"
            );
        }
        Err(e) => {
            email.mark_failed(e.to_string());
            tracing::error!(
                email_id = %email.email_id,
                kind = email.kind.as_str(),
                error = %e,
                "Email delivery failed"
            );
        }
    }

    if let Err(e) = repo.record_delivery(email).await {
        tracing::error!(
            email_id = %email.email_id,
            status = %email.status,
            error = %e,
            "Failed to record email delivery"
        );
    }

    result
}
