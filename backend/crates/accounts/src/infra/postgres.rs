//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

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

/// Unique constraints on `users`, see the migrations
const USER_NAME_CONSTRAINT: &str = "users_user_name_canonical_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

const USER_COLUMNS: &str = r#"
    user_id,
    user_name,
    email,
    password_hash,
    is_confirmed,
    confirm_number,
    last_login_at,
    created_at,
    updated_at
"#;

const EMAIL_COLUMNS: &str = r#"
    email_id,
    recipient,
    kind,
    subject,
    body,
    status,
    attempts,
    last_error,
    created_at,
    updated_at,
    sent_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user_where(&self, condition: &str, value: &str) -> AccountResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition} = $1");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

/// Unique violations on `users` become field errors
fn map_user_write_error(err: sqlx::Error) -> AccountError {
    let constraint = err
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .and_then(|db| db.constraint().map(str::to_string));

    match constraint.as_deref() {
        Some(USER_NAME_CONSTRAINT) => AccountError::field("username", DUPLICATE_USER_NAME_MESSAGE),
        Some(EMAIL_CONSTRAINT) => AccountError::field("email", DUPLICATE_EMAIL_MESSAGE),
        _ => AccountError::Database(err),
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountRepository {
    async fn create(&self, user: &User) -> AccountResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                user_name_canonical,
                email,
                password_hash,
                is_confirmed,
                confirm_number,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.is_confirmed)
        .bind(user.confirm_number.as_str())
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AccountResult<Option<User>> {
        self.find_user_where("email", email.as_str()).await
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AccountResult<Option<User>> {
        self.find_user_where("user_name_canonical", user_name.canonical())
            .await
    }

    async fn exists_by_email(&self, email: &Email) -> AccountResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AccountResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name_canonical = $1)",
        )
        .bind(user_name.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn confirm_user(
        &self,
        email: &Email,
        confirm_number: &ConfirmNumber,
        at: DateTime<Utc>,
    ) -> AccountResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET is_confirmed = TRUE, updated_at = $3 \
             WHERE email = $1 AND confirm_number = $2 AND is_confirmed = FALSE \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .bind(confirm_number.as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AccountResult<()> {
        let result =
            sqlx::query("UPDATE users SET last_login_at = $2, updated_at = $2 WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .bind(at)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }

        Ok(())
    }

    async fn replace_password(
        &self,
        user_id: &UserId,
        current: &UserPassword,
        new: &UserPassword,
        at: DateTime<Utc>,
    ) -> AccountResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = $3,
                updated_at = $4
            WHERE user_id = $1 AND password_hash = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(current.as_phc_string())
        .bind(new.as_phc_string())
        .bind(at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }
}

// ============================================================================
// Token Blacklist Repository Implementation
// ============================================================================

impl TokenBlacklistRepository for PgAccountRepository {
    async fn blacklist(&self, token: &BlacklistedToken) -> AccountResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO token_blacklist (jti, user_id, expires_at, blacklisted_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(token.jti)
        .bind(token.user_id.as_uuid())
        .bind(token.expires_at)
        .bind(token.blacklisted_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }

    async fn is_blacklisted(&self, jti: &Uuid) -> AccountResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn cleanup_expired(&self) -> AccountResult<u64> {
        let deleted = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired blacklist entries");

        Ok(deleted)
    }
}

// ============================================================================
// Email Outbox Repository Implementation
// ============================================================================

impl EmailOutboxRepository for PgAccountRepository {
    async fn enqueue(&self, email: &OutboundEmail) -> AccountResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_outbox (
                email_id,
                recipient,
                kind,
                subject,
                body,
                status,
                attempts,
                last_error,
                created_at,
                updated_at,
                sent_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(email.email_id.as_uuid())
        .bind(email.recipient.as_str())
        .bind(email.kind.as_str())
        .bind(&email.subject)
        .bind(&email.body)
        .bind(email.status.as_str())
        .bind(email.attempts)
        .bind(email.last_error.as_deref())
        .bind(email.created_at)
        .bind(email.updated_at)
        .bind(email.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_email(&self, email_id: &EmailId) -> AccountResult<Option<OutboundEmail>> {
        let sql = format!("SELECT {EMAIL_COLUMNS} FROM email_outbox WHERE email_id = $1");

        let row = sqlx::query_as::<_, EmailRow>(&sql)
            .bind(email_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_email()).transpose()
    }

    async fn pending_emails(&self) -> AccountResult<Vec<OutboundEmail>> {
        let sql = format!(
            "SELECT {EMAIL_COLUMNS} FROM email_outbox \
             WHERE status = 'pending' ORDER BY created_at ASC"
        );

        let rows = sqlx::query_as::<_, EmailRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_email()).collect()
    }

    async fn record_delivery(&self, email: &OutboundEmail) -> AccountResult<()> {
        sqlx::query(
            r#"
            UPDATE email_outbox SET
                status = $2,
                attempts = $3,
                last_error = $4,
                updated_at = $5,
                sent_at = $6,
                body = $7
            WHERE email_id = $1
            "#,
        )
        .bind(email.email_id.as_uuid())
        .bind(email.status.as_str())
        .bind(email.attempts)
        .bind(email.last_error.as_deref())
        .bind(email.updated_at)
        .bind(email.sent_at)
        .bind(&email.body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    password_hash: String,
    is_confirmed: bool,
    confirm_number: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AccountResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            password: UserPassword::from_phc_string(self.password_hash)?,
            is_confirmed: self.is_confirmed,
            confirm_number: ConfirmNumber::from_db(self.confirm_number),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EmailRow {
    email_id: Uuid,
    recipient: String,
    kind: String,
    subject: String,
    body: String,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

impl EmailRow {
    fn into_email(self) -> AccountResult<OutboundEmail> {
        Ok(OutboundEmail {
            email_id: EmailId::from_uuid(self.email_id),
            recipient: Email::from_db(self.recipient),
            kind: self
                .kind
                .parse()
                .map_err(|e| AccountError::Internal(format!("Invalid email kind: {e}")))?,
            subject: self.subject,
            body: self.body,
            status: self
                .status
                .parse()
                .map_err(|e| AccountError::Internal(format!("Invalid email status: {e}")))?,
            attempts: self.attempts,
            last_error: self.last_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
            sent_at: self.sent_at,
        })
    }
}
