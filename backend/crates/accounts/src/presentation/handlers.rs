//! HTTP Handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use platform::mail::Mailer;

use crate::application::config::AccountConfig;
use crate::application::{
    ChangePasswordUseCase, ConfirmPasswordResetUseCase, LogoutUseCase, MailOutbox,
    ObtainTokenUseCase, ProfileOutput, RefreshTokenUseCase, RegisterUseCase,
    RequestPasswordResetUseCase, ResendActivationUseCase, TokenIssuer, VerifyEmailUseCase,
};
use crate::domain::repository::AccountStore;
use crate::error::AccountResult;
use crate::presentation::dto::{
    AccessTokenResponse, ChangePasswordRequest, MessageResponse, ObtainTokenRequest,
    PasswordResetConfirmRequest, PasswordResetRequest, RegisterRequest, RegisterResponse,
    ResendActivationRequest, TokenBlacklistRequest, TokenPairResponse, TokenRefreshRequest,
    VerifyEmailRequest,
};
use crate::presentation::extract::ValidatedJson;
use crate::presentation::middleware::CurrentUser;

/// Shared state for account handlers
pub struct AccountAppState<R, M> {
    pub repo: Arc<R>,
    pub outbox: MailOutbox<R, M>,
    pub issuer: TokenIssuer,
    pub config: Arc<AccountConfig>,
}

// Manual impl: derive would require R: Clone and M: Clone
impl<R, M> Clone for AccountAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            outbox: self.outbox.clone(),
            issuer: self.issuer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, M> AccountAppState<R, M>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    /// Build the state and start the mail dispatcher
    pub fn new(repo: Arc<R>, mailer: Arc<M>, config: AccountConfig) -> Self {
        let outbox = MailOutbox::start(repo.clone(), mailer);
        let issuer = TokenIssuer::new(&config);

        Self {
            repo,
            outbox,
            issuer,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Registration & Verification
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AccountResult<(StatusCode, Json<RegisterResponse>)>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.outbox.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: output.user_name,
            email: output.email,
            message: output.message,
        }),
    ))
}

/// POST /api/auth/resend-activation-code
pub async fn resend_code_activation<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(email): ValidatedJson<ResendActivationRequest>,
) -> AccountResult<Json<MessageResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ResendActivationUseCase::new(state.repo.clone(), state.outbox.clone());

    use_case.execute(email).await?;

    Ok(Json(MessageResponse::new("Code send successfully")))
}

/// POST /api/auth/verify-email
pub async fn verify_email<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(input): ValidatedJson<VerifyEmailRequest>,
) -> AccountResult<Json<MessageResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    VerifyEmailUseCase::new(state.repo.clone())
        .execute(input)
        .await?;

    Ok(Json(MessageResponse::new("Email verified. You can login now")))
}

// ============================================================================
// Passwords
// ============================================================================

/// POST /api/auth/password/change
pub async fn change_password<R, M>(
    State(state): State<AccountAppState<R, M>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> AccountResult<Json<MessageResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ChangePasswordUseCase::new(state.repo.clone(), state.config.clone());

    use_case.execute(user, input).await?;

    Ok(Json(MessageResponse::new("Password Changed Successfully")))
}

/// POST /api/auth/password/reset
pub async fn reset_password<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(email): ValidatedJson<PasswordResetRequest>,
) -> AccountResult<Json<MessageResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = RequestPasswordResetUseCase::new(
        state.repo.clone(),
        state.outbox.clone(),
        state.config.clone(),
    );

    use_case.execute(email).await?;

    Ok(Json(MessageResponse::new(
        "Password Reset link send. Please check your Email",
    )))
}

/// POST /api/auth/password/reset/confirm
pub async fn reset_password_confirm<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(input): ValidatedJson<PasswordResetConfirmRequest>,
) -> AccountResult<Json<MessageResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ConfirmPasswordResetUseCase::new(state.repo.clone(), state.config.clone());

    use_case.execute(input).await?;

    Ok(Json(MessageResponse::new("Password Reset Successfully")))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/auth/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<ProfileOutput> {
    Json(ProfileOutput::from(&user))
}

// ============================================================================
// Tokens
// ============================================================================

/// POST /api/auth/token
pub async fn obtain_token<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(input): ValidatedJson<ObtainTokenRequest>,
) -> AccountResult<Json<TokenPairResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ObtainTokenUseCase::new(
        state.repo.clone(),
        state.issuer.clone(),
        state.config.clone(),
    );

    let pair = use_case.execute(input).await?;

    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// POST /api/auth/token/refresh
pub async fn refresh_token<R, M>(
    State(state): State<AccountAppState<R, M>>,
    ValidatedJson(refresh): ValidatedJson<TokenRefreshRequest>,
) -> AccountResult<Json<AccessTokenResponse>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = RefreshTokenUseCase::new(state.repo.clone(), state.issuer.clone());

    let access = use_case.execute(&refresh).await?;

    Ok(Json(AccessTokenResponse { access }))
}

/// POST /api/auth/logout
pub async fn logout<R, M>(
    State(state): State<AccountAppState<R, M>>,
    Extension(CurrentUser(_user)): Extension<CurrentUser>,
    ValidatedJson(refresh): ValidatedJson<TokenBlacklistRequest>,
) -> AccountResult<Json<serde_json::Value>>
where
    R: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    LogoutUseCase::new(state.repo.clone(), state.issuer.clone())
        .execute(&refresh)
        .await?;

    Ok(Json(serde_json::json!({})))
}
