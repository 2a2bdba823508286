//! Value Object Module

pub mod confirm_number;
pub mod email;
pub mod email_id;
pub mod user_id;
pub mod user_name;
pub mod user_password;
