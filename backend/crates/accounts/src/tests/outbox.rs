//! Mail outbox and token blacklist against the in-memory store

use std::sync::Arc;

use chrono::{Duration, Utc};
use platform::mail::MailError;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use super::support::{MemoryStore, PASSWORD, RecordingMailer, eventually};
use crate::application::mail_outbox::MailOutbox;
use crate::domain::entity::{
    blacklisted_token::BlacklistedToken,
    outbound_email::{DeliveryStatus, OutboundEmail},
    user::User,
};
use crate::domain::repository::{EmailOutboxRepository, TokenBlacklistRepository};
use crate::domain::value_object::{
    email::Email,
    user_id::UserId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AccountError;

fn user() -> User {
    let raw = RawPassword::candidate(PASSWORD.to_string());
    User::new(
        UserName::new("amina").unwrap(),
        Email::new("amina@example.com").unwrap(),
        UserPassword::from_raw(&raw, None).unwrap(),
    )
}

#[tokio::test]
async fn test_recover_pending_delivers_leftovers() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());

    // Left behind by a previous process
    let leftover = OutboundEmail::verification_code(&user());
    assert_ok!(EmailOutboxRepository::enqueue(&*store, &leftover).await);

    let outbox = MailOutbox::start(store.clone(), mailer.clone());
    assert_eq!(outbox.recover_pending().await.unwrap(), 1);

    eventually(|| store.emails()[0].status == DeliveryStatus::Sent).await;
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(outbox.recover_pending().await.unwrap(), 0);
}

#[tokio::test]
async fn test_deliver_now_reports_and_records_failure() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let outbox = MailOutbox::start(store.clone(), mailer.clone());

    let sent = outbox
        .deliver_now(OutboundEmail::verification_code(&user()))
        .await
        .unwrap();
    assert_eq!(sent.status, DeliveryStatus::Sent);

    mailer.fail_with(MailError::Timeout);
    let result = outbox
        .deliver_now(OutboundEmail::verification_code(&user()))
        .await;
    assert!(matches!(result, Err(AccountError::Mail(MailError::Timeout))));

    let statuses: Vec<_> = store.emails().iter().map(|e| e.status).collect();
    assert_eq!(statuses, [DeliveryStatus::Sent, DeliveryStatus::Failed]);
}

#[tokio::test]
async fn test_delivered_rows_keep_no_secret() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let outbox = MailOutbox::start(store.clone(), mailer.clone());
    let user = user();

    outbox
        .enqueue(OutboundEmail::verification_code(&user))
        .await
        .unwrap();
    eventually(|| store.emails()[0].status == DeliveryStatus::Sent).await;

    mailer.fail_with(MailError::Transport("refused".to_string()));
    assert_err!(
        outbox
            .deliver_now(OutboundEmail::password_reset(&user, "https://app/reset/uid/token"))
            .await
    );

    let code = user.confirm_number.as_str();
    assert!(mailer.sent()[0].body.contains(code));
    for row in store.emails() {
        assert!(!row.is_pending());
        assert!(row.body.is_empty(), "{:?} row kept its body", row.status);
    }
}

#[tokio::test]
async fn test_enqueue_surfaces_store_failure() {
    let store = Arc::new(MemoryStore::default());
    let outbox = MailOutbox::start(store.clone(), Arc::new(RecordingMailer::default()));
    store.break_outbox();

    assert_err!(
        outbox
            .enqueue(OutboundEmail::verification_code(&user()))
            .await
    );
}

#[tokio::test]
async fn test_blacklist_once_and_cleanup() {
    let store = MemoryStore::default();
    let now = Utc::now();

    let live = BlacklistedToken::new(Uuid::new_v4(), UserId::new(), now + Duration::hours(1));
    let dead = BlacklistedToken::new(Uuid::new_v4(), UserId::new(), now - Duration::hours(1));

    assert!(store.blacklist(&live).await.unwrap());
    assert!(!store.blacklist(&live).await.unwrap());
    assert!(store.blacklist(&dead).await.unwrap());

    assert_eq!(store.cleanup_expired().await.unwrap(), 1);
    assert!(store.is_blacklisted(&live.jti).await.unwrap());
    assert!(!store.is_blacklisted(&dead.jti).await.unwrap());
}
