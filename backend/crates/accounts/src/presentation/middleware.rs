//! Permission Middleware
//!
//! Resolves the bearer token (if any) to a user and runs the action's
//! permission chain before the handler. The authenticated user is handed to
//! the handler as a `CurrentUser` extension.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::{BearerError, extract_bearer};
use platform::mail::Mailer;

use crate::application::AuthenticateUseCase;
use crate::domain::entity::user::User;
use crate::domain::repository::AccountStore;
use crate::error::{AccountError, AccountResult};
use crate::presentation::action::{Action, Permission};
use crate::presentation::handlers::AccountAppState;

/// Authenticated principal stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware state: app state plus the action being guarded
pub struct PermissionGuard<R, M> {
    pub state: AccountAppState<R, M>,
    pub action: Action,
}

impl<R, M> Clone for PermissionGuard<R, M> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            action: self.action,
        }
    }
}

/// Middleware that enforces `Action::permissions`
pub async fn require_permissions<R, M>(
    State(guard): State<PermissionGuard<R, M>>,
    mut req: Request,
    next: Next,
) -> AccountResult<Response>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let principal = match extract_bearer(req.headers()) {
        Ok(token) => {
            let use_case =
                AuthenticateUseCase::new(guard.state.repo.clone(), guard.state.issuer.clone());
            Some(use_case.execute(token).await?)
        }
        Err(BearerError::Missing) => None,
        Err(BearerError::Malformed) => {
            tracing::debug!(action = guard.action.name(), "Malformed authorization header");
            return Err(AccountError::TokenInvalid);
        }
    };

    Permission::check_all(guard.action.permissions(), principal.as_ref())?;

    if let Some(user) = principal {
        req.extensions_mut().insert(CurrentUser(user));
    }

    Ok(next.run(req).await)
}
