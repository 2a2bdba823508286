//! Presentation Layer
//!
//! Action table, HTTP handlers, DTOs, extractors, router, and middleware.

pub mod action;
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use action::{Action, Permission, Schema};
pub use extract::{RequestSchema, ValidatedJson};
pub use handlers::AccountAppState;
pub use middleware::{CurrentUser, PermissionGuard, require_permissions};
pub use router::{account_router, account_router_generic, routes};
