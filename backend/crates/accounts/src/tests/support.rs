//! Test doubles and an HTTP harness

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use chrono::{DateTime, Utc};
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use platform::mail::{MailError, Mailer, OutgoingMail};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::application::register::{DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USER_NAME_MESSAGE};
use crate::domain::entity::{
    blacklisted_token::BlacklistedToken, outbound_email::OutboundEmail, user::User,
};
use crate::domain::repository::{EmailOutboxRepository, TokenBlacklistRepository, UserRepository};
use crate::domain::value_object::{
    confirm_number::ConfirmNumber, email::Email, email_id::EmailId, user_id::UserId,
    user_name::UserName, user_password::UserPassword,
};
use crate::error::{AccountError, AccountResult};
use crate::presentation::handlers::AccountAppState;
use crate::presentation::router::routes;

pub const PASSWORD: &str = "Kilimanjaro#2026";

// ============================================================================
// In-memory store
// ============================================================================

type UserWrite = Box<dyn FnOnce(&mut User) + Send>;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<UserId, User>>,
    blacklist: Mutex<HashMap<Uuid, BlacklistedToken>>,
    outbox: Mutex<Vec<OutboundEmail>>,
    outbox_down: AtomicBool,
    after_read: Mutex<Option<UserWrite>>,
}

impl MemoryStore {
    pub fn user_named(&self, name: &str) -> Option<User> {
        let canonical = name.to_lowercase();
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.user_name.canonical() == canonical)
            .cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn emails(&self) -> Vec<OutboundEmail> {
        self.outbox.lock().unwrap().clone()
    }

    /// Make every outbox insert fail
    pub fn break_outbox(&self) {
        self.outbox_down.store(true, Ordering::SeqCst);
    }

    /// Apply `write` to the stored user right after the next lookup has
    /// handed out its copy, as a concurrent request committing in between
    pub fn write_after_next_read(&self, write: impl FnOnce(&mut User) + Send + 'static) {
        *self.after_read.lock().unwrap() = Some(Box::new(write));
    }

    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        let found = self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| pred(u))
            .cloned();
        self.run_after_read(found.as_ref());
        found
    }

    fn run_after_read(&self, found: Option<&User>) {
        let Some(user) = found else { return };
        let Some(write) = self.after_read.lock().unwrap().take() else {
            return;
        };
        if let Some(stored) = self.users.lock().unwrap().get_mut(&user.user_id) {
            write(stored);
        }
    }
}

impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> AccountResult<()> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.user_name.canonical() == user.user_name.canonical())
        {
            return Err(AccountError::field("username", DUPLICATE_USER_NAME_MESSAGE));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(AccountError::field("email", DUPLICATE_EMAIL_MESSAGE));
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        let found = self.users.lock().unwrap().get(user_id).cloned();
        self.run_after_read(found.as_ref());
        Ok(found)
    }

    async fn find_by_email(&self, email: &Email) -> AccountResult<Option<User>> {
        Ok(self.find_user(|u| u.email == *email))
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AccountResult<Option<User>> {
        Ok(self.find_user(|u| u.user_name.canonical() == user_name.canonical()))
    }

    async fn exists_by_email(&self, email: &Email) -> AccountResult<bool> {
        Ok(self.find_user(|u| u.email == *email).is_some())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AccountResult<bool> {
        Ok(self
            .find_user(|u| u.user_name.canonical() == user_name.canonical())
            .is_some())
    }

    async fn confirm_user(
        &self,
        email: &Email,
        confirm_number: &ConfirmNumber,
        at: DateTime<Utc>,
    ) -> AccountResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let stored = users.values_mut().find(|u| {
            u.email == *email && u.confirm_number.as_str() == confirm_number.as_str() && !u.is_confirmed
        });
        Ok(stored.map(|user| {
            user.is_confirmed = true;
            user.updated_at = at;
            user.clone()
        }))
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AccountResult<()> {
        let mut users = self.users.lock().unwrap();
        let stored = users.get_mut(user_id).ok_or(AccountError::NotFound)?;
        stored.last_login_at = Some(at);
        stored.updated_at = at;
        Ok(())
    }

    async fn replace_password(
        &self,
        user_id: &UserId,
        current: &UserPassword,
        new: &UserPassword,
        at: DateTime<Utc>,
    ) -> AccountResult<bool> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(user_id) {
            Some(stored) if stored.password == *current => {
                stored.password = new.clone();
                stored.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl TokenBlacklistRepository for MemoryStore {
    async fn blacklist(&self, token: &BlacklistedToken) -> AccountResult<bool> {
        let mut blacklist = self.blacklist.lock().unwrap();
        if blacklist.contains_key(&token.jti) {
            return Ok(false);
        }
        blacklist.insert(token.jti, token.clone());
        Ok(true)
    }

    async fn is_blacklisted(&self, jti: &Uuid) -> AccountResult<bool> {
        Ok(self.blacklist.lock().unwrap().contains_key(jti))
    }

    async fn cleanup_expired(&self) -> AccountResult<u64> {
        let now = Utc::now();
        let mut blacklist = self.blacklist.lock().unwrap();
        let before = blacklist.len();
        blacklist.retain(|_, token| !token.is_expired(now));
        Ok((before - blacklist.len()) as u64)
    }
}

impl EmailOutboxRepository for MemoryStore {
    async fn enqueue(&self, email: &OutboundEmail) -> AccountResult<()> {
        if self.outbox_down.load(Ordering::SeqCst) {
            return Err(AccountError::Internal("outbox unavailable".to_string()));
        }
        self.outbox.lock().unwrap().push(email.clone());
        Ok(())
    }

    async fn find_email(&self, email_id: &EmailId) -> AccountResult<Option<OutboundEmail>> {
        Ok(self
            .outbox
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.email_id == *email_id)
            .cloned())
    }

    async fn pending_emails(&self) -> AccountResult<Vec<OutboundEmail>> {
        let mut pending: Vec<_> = self
            .outbox
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.created_at);
        Ok(pending)
    }

    async fn record_delivery(&self, email: &OutboundEmail) -> AccountResult<()> {
        let mut outbox = self.outbox.lock().unwrap();
        if let Some(stored) = outbox.iter_mut().find(|e| e.email_id == email.email_id) {
            *stored = email.clone();
        }
        Ok(())
    }
}

// ============================================================================
// Recording mailer
// ============================================================================

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failure: Mutex<Option<MailError>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Every following send fails with `error`
    pub fn fail_with(&self, error: MailError) {
        *self.failure.lock().unwrap() = Some(error);
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(error) => Err(error),
            None => {
                self.sent.lock().unwrap().push(mail.clone());
                Ok(())
            }
        }
    }
}

/// Poll until `condition` holds; background delivery is asynchronous
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}

/// Six-digit code from a verification email body
pub fn code_in(body: &str) -> String {
    body.split_whitespace()
        .find(|word| word.len() == 6 && word.chars().all(|c| c.is_ascii_digit()))
        .expect("no confirmation code in email body")
        .to_string()
}

// ============================================================================
// HTTP harness
// ============================================================================

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub config: AccountConfig,
    router: Router,
}

impl TestApp {
    /// Must run inside a Tokio runtime (starts the mail dispatcher)
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let config = AccountConfig {
            front_end_url: "https://app.example.com/password/reset/".to_string(),
            ..AccountConfig::with_random_secret()
        };

        let state = AccountAppState::new(store.clone(), mailer.clone(), config.clone());

        Self {
            store,
            mailer,
            config,
            router: routes(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub async fn post_auth(&self, path: &str, bearer: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(bearer), Some(body)).await
    }

    pub async fn get_auth(&self, path: &str, bearer: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, Some(bearer), None).await
    }

    /// Register through the API and return the stored user
    pub async fn register(&self, username: &str, email: &str) -> User {
        let (status, body) = self
            .post(
                "/register",
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        self.store.user_named(username).unwrap()
    }

    /// Registered and verified
    pub async fn confirmed_user(&self, username: &str, email: &str) -> User {
        let user = self.register(username, email).await;
        let (status, _) = self
            .post(
                "/verify-email",
                serde_json::json!({
                    "email": email,
                    "confirm_number": user.confirm_number.as_str(),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        self.store.user_named(username).unwrap()
    }

    /// `(access, refresh)`
    pub async fn login(&self, identifier: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/token",
                serde_json::json!({ "identifier": identifier, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["access"].as_str().unwrap().to_string(),
            body["refresh"].as_str().unwrap().to_string(),
        )
    }
}
