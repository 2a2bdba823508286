//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate holds the vocabulary every backend crate agrees on:
//! - The unified error type and its HTTP classification
//! - Field-level validation errors
//! - Typed UUID identifiers
//!
//! Only things that are hard to change and mean the same thing in every
//! crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
    pub mod validation;
}
pub mod id;
