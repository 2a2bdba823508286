//! Integration tests for the accounts crate
//!
//! Run against the router with an in-memory store and a recording mailer.

mod concurrency;
mod outbox;
mod support;
