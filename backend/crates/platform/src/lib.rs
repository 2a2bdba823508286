//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64)
//! - Password hashing (Argon2id) and password policy
//! - Bearer token extraction from request headers
//! - Environment configuration helpers
//! - Outbound mail transport

pub mod bearer;
pub mod config;
pub mod crypto;
pub mod mail;
pub mod password;
