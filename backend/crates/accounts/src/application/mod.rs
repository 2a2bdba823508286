//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod change_password;
pub mod config;
pub mod logout;
pub mod mail_outbox;
pub mod obtain_token;
pub mod profile;
pub mod refresh_token;
pub mod register;
pub mod resend_activation;
pub mod reset_password;
pub mod tokens;
pub mod verify_email;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use config::AccountConfig;
pub use logout::LogoutUseCase;
pub use mail_outbox::MailOutbox;
pub use obtain_token::{ObtainTokenInput, ObtainTokenUseCase};
pub use profile::ProfileOutput;
pub use refresh_token::RefreshTokenUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use resend_activation::ResendActivationUseCase;
pub use reset_password::{
    ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, RequestPasswordResetUseCase,
};
pub use tokens::{Claims, TokenIssuer, TokenPair, TokenType};
pub use verify_email::{VerifyEmailInput, VerifyEmailUseCase};
