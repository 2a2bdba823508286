//! Entity Module

pub mod blacklisted_token;
pub mod outbound_email;
pub mod user;
