//! Domain Layer
//!
//! Contains entities, value objects, repository traits and domain services.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{
    blacklisted_token::BlacklistedToken,
    outbound_email::{DeliveryStatus, EmailKind, OutboundEmail},
    user::User,
};
pub use repository::{
    AccountStore, EmailOutboxRepository, TokenBlacklistRepository, UserRepository,
};
