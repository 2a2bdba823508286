//! Accounts Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration with a 6-digit email confirmation code
//! - Password change and stateless, signed password reset links
//! - JWT access/refresh pairs; logout blacklists the refresh token
//! - Outbound email persisted in an outbox and delivered by a background task
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Reset tokens die with a password change or a new login
//! - Confirmed-only routes reject unconfirmed users with 403

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AccountConfig;
pub use error::{AccountError, AccountResult};
pub use infra::postgres::PgAccountRepository;
pub use presentation::router::{account_router, account_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::domain::repository::AccountStore;
    pub use crate::infra::postgres::PgAccountRepository;
}
