//! Application Layer
//!
//! Use cases and application services.

pub mod account_admin;
pub mod authenticate;
pub mod code_store;
pub mod config;
pub mod profile;
pub mod register;
pub mod reset_password;
pub mod send_code;
pub mod sign_in;
pub mod token;

// Re-exports
pub use account_admin::{CountActiveAccountsUseCase, DeleteAccountUseCase, SetAccountEnabledUseCase};
pub use authenticate::{AuthOutcome, AuthenticateUseCase};
pub use code_store::VerificationCodeStore;
pub use config::IdentityConfig;
pub use profile::{CheckNicknameUseCase, UpdateProfileInput, UpdateProfileUseCase};
pub use register::{RegisterInput, RegisterUseCase};
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase, VerifyResetCodeUseCase};
pub use send_code::{CodePurpose, SendVerificationCodeUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use token::{EMAIL_CLAIM, InvalidToken, TokenService, VerifiedToken};
