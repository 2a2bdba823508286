//! Account Router
//!
//! Built from the action table: each action's method, path and permission
//! chain come from `Action`.

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodFilter, MethodRouter, on};
use platform::mail::Mailer;

use crate::application::config::AccountConfig;
use crate::domain::repository::AccountStore;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::action::Action;
use crate::presentation::handlers::{self, AccountAppState};
use crate::presentation::middleware::{PermissionGuard, require_permissions};

/// Create the account router with PostgreSQL repository
///
/// Starts the mail dispatcher; call from within the Tokio runtime.
pub fn account_router<M>(repo: PgAccountRepository, mailer: M, config: AccountConfig) -> Router
where
    M: Mailer + Send + Sync + 'static,
{
    account_router_generic(repo, mailer, config)
}

/// Create a generic account router for any repository implementation
pub fn account_router_generic<R, M>(repo: R, mailer: M, config: AccountConfig) -> Router
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    routes(AccountAppState::new(Arc::new(repo), Arc::new(mailer), config))
}

/// Router over an existing state
pub fn routes<R, M>(state: AccountAppState<R, M>) -> Router
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    Action::ALL
        .into_iter()
        .fold(Router::new(), |router, action| {
            let mut method_router = handler_for::<R, M>(action);

            if action.requires_principal() {
                let guard = PermissionGuard {
                    state: state.clone(),
                    action,
                };
                method_router =
                    method_router.route_layer(from_fn_with_state(guard, require_permissions::<R, M>));
            }

            router.route(action.path(), method_router)
        })
        .with_state(state)
}

fn handler_for<R, M>(action: Action) -> MethodRouter<AccountAppState<R, M>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let filter = method_filter(&action.method());

    match action {
        Action::Register => on(filter, handlers::register::<R, M>),
        Action::ResendCodeActivation => on(filter, handlers::resend_code_activation::<R, M>),
        Action::ChangePassword => on(filter, handlers::change_password::<R, M>),
        Action::ResetPassword => on(filter, handlers::reset_password::<R, M>),
        Action::ResetPasswordConfirm => on(filter, handlers::reset_password_confirm::<R, M>),
        Action::VerifyEmail => on(filter, handlers::verify_email::<R, M>),
        Action::Me => on(filter, handlers::me),
        Action::Logout => on(filter, handlers::logout::<R, M>),
        Action::ObtainToken => on(filter, handlers::obtain_token::<R, M>),
        Action::RefreshToken => on(filter, handlers::refresh_token::<R, M>),
    }
}

fn method_filter(method: &Method) -> MethodFilter {
    if *method == Method::GET {
        MethodFilter::GET
    } else {
        MethodFilter::POST
    }
}
