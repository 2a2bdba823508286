//! Action Table
//!
//! Every account endpoint is an `Action`. A single static table gives each
//! one its request schema, permission chain, HTTP method and path; the router
//! and the permission middleware are both driven from it.

use axum::http::Method;

use crate::domain::entity::user::User;
use crate::error::{AccountError, AccountResult};

/// Request body schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    UserRegistration,
    ResendActivationCode,
    UserChangePassword,
    SendPasswordResetEmail,
    PasswordResetConfirm,
    VerificationEmail,
    UserProfile,
    TokenBlacklist,
    ObtainToken,
    TokenRefresh,
    /// Read-only user representation
    User,
}

impl Schema {
    pub fn name(&self) -> &'static str {
        match self {
            Schema::UserRegistration => "UserRegistration",
            Schema::ResendActivationCode => "ResendActivationCode",
            Schema::UserChangePassword => "UserChangePassword",
            Schema::SendPasswordResetEmail => "SendPasswordResetEmail",
            Schema::PasswordResetConfirm => "PasswordResetConfirm",
            Schema::VerificationEmail => "VerificationEmail",
            Schema::UserProfile => "UserProfile",
            Schema::TokenBlacklist => "TokenBlacklist",
            Schema::ObtainToken => "ObtainToken",
            Schema::TokenRefresh => "TokenRefresh",
            Schema::User => "User",
        }
    }

    /// Schema for an action name; unknown names get the default `User`
    pub fn for_action(name: &str) -> Self {
        Action::from_name(name)
            .map(|action| action.schema())
            .unwrap_or(Schema::User)
    }
}

/// Access rule evaluated before a handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    AllowAny,
    IsAuthenticated,
    /// Authenticated and email confirmed
    IsConfirmedUser,
}

impl Permission {
    pub fn check(&self, principal: Option<&User>) -> AccountResult<()> {
        match (self, principal) {
            (Permission::AllowAny, _) => Ok(()),
            (_, None) => Err(AccountError::NotAuthenticated),
            (Permission::IsAuthenticated, Some(_)) => Ok(()),
            (Permission::IsConfirmedUser, Some(user)) if user.is_confirmed => Ok(()),
            (Permission::IsConfirmedUser, Some(_)) => Err(AccountError::EmailNotConfirmed),
        }
    }

    /// Run a chain in order; the first failure wins
    pub fn check_all(permissions: &[Permission], principal: Option<&User>) -> AccountResult<()> {
        permissions.iter().try_for_each(|p| p.check(principal))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    ResendCodeActivation,
    ChangePassword,
    ResetPassword,
    ResetPasswordConfirm,
    VerifyEmail,
    Me,
    Logout,
    ObtainToken,
    RefreshToken,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::Register,
        Action::ResendCodeActivation,
        Action::ChangePassword,
        Action::ResetPassword,
        Action::ResetPasswordConfirm,
        Action::VerifyEmail,
        Action::Me,
        Action::Logout,
        Action::ObtainToken,
        Action::RefreshToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::ResendCodeActivation => "resend_code_activation",
            Action::ChangePassword => "change_password",
            Action::ResetPassword => "reset_password",
            Action::ResetPasswordConfirm => "reset_password_confirm",
            Action::VerifyEmail => "verify_email",
            Action::Me => "me",
            Action::Logout => "logout",
            Action::ObtainToken => "obtain_token",
            Action::RefreshToken => "refresh_token",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    pub fn schema(&self) -> Schema {
        match self {
            Action::Register => Schema::UserRegistration,
            Action::ResendCodeActivation => Schema::ResendActivationCode,
            Action::ChangePassword => Schema::UserChangePassword,
            Action::ResetPassword => Schema::SendPasswordResetEmail,
            Action::ResetPasswordConfirm => Schema::PasswordResetConfirm,
            Action::VerifyEmail => Schema::VerificationEmail,
            Action::Me => Schema::UserProfile,
            Action::Logout => Schema::TokenBlacklist,
            Action::ObtainToken => Schema::ObtainToken,
            Action::RefreshToken => Schema::TokenRefresh,
        }
    }

    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Action::ChangePassword | Action::Me => {
                &[Permission::IsAuthenticated, Permission::IsConfirmedUser]
            }
            Action::Logout => &[Permission::IsAuthenticated],
            _ => &[Permission::AllowAny],
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Action::Me => Method::GET,
            _ => Method::POST,
        }
    }

    /// Path relative to the router mount point
    pub fn path(&self) -> &'static str {
        match self {
            Action::Register => "/register",
            Action::ResendCodeActivation => "/resend-activation-code",
            Action::ChangePassword => "/password/change",
            Action::ResetPassword => "/password/reset",
            Action::ResetPasswordConfirm => "/password/reset/confirm",
            Action::VerifyEmail => "/verify-email",
            Action::Me => "/me",
            Action::Logout => "/logout",
            Action::ObtainToken => "/token",
            Action::RefreshToken => "/token/refresh",
        }
    }

    /// Any permission beyond `AllowAny` needs a principal
    pub fn requires_principal(&self) -> bool {
        self.permissions()
            .iter()
            .any(|p| *p != Permission::AllowAny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email,
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };
    use std::collections::HashSet;

    fn user(confirmed: bool) -> User {
        let raw = RawPassword::candidate("Kilimanjaro#2026".to_string());
        let mut user = User::new(
            UserName::new("amina").unwrap(),
            Email::new("amina@example.com").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
        );
        user.is_confirmed = confirmed;
        user
    }

    #[test]
    fn test_schema_lookup() {
        assert_eq!(Schema::for_action("register"), Schema::UserRegistration);
        assert_eq!(
            Schema::for_action("resend_code_activation"),
            Schema::ResendActivationCode
        );
        assert_eq!(Schema::for_action("logout"), Schema::TokenBlacklist);
        assert_eq!(Schema::for_action("me"), Schema::UserProfile);
        assert_eq!(Schema::for_action("list"), Schema::User);
        assert_eq!(Schema::for_action(""), Schema::User);
    }

    #[test]
    fn test_names_and_routes_are_unique() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        let routes: HashSet<_> = Action::ALL
            .iter()
            .map(|a| (a.method(), a.path()))
            .collect();
        assert_eq!(routes.len(), Action::ALL.len());
    }

    #[test]
    fn test_permission_chain_order() {
        let chain = Action::ChangePassword.permissions();
        let unconfirmed = user(false);
        let confirmed = user(true);

        assert!(matches!(
            Permission::check_all(chain, None),
            Err(AccountError::NotAuthenticated)
        ));
        assert!(matches!(
            Permission::check_all(chain, Some(&unconfirmed)),
            Err(AccountError::EmailNotConfirmed)
        ));
        assert!(Permission::check_all(chain, Some(&confirmed)).is_ok());

        assert!(Permission::check_all(Action::Logout.permissions(), Some(&unconfirmed)).is_ok());
        assert!(Permission::check_all(Action::Register.permissions(), None).is_ok());
    }

    #[test]
    fn test_requires_principal() {
        assert!(Action::Me.requires_principal());
        assert!(Action::Logout.requires_principal());
        assert!(!Action::ObtainToken.requires_principal());
    }
}
