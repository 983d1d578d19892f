//! Identity Error Types
//!
//! Identity-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Shown to a holder of a valid token whose account has been switched off.
pub const ACCOUNT_DISABLED_MESSAGE: &str =
    "Your account has been disabled, please contact an administrator";

#[derive(Debug, Error)]
pub enum IdentityError {
    /// A code for this recipient was issued inside the cooldown window
    #[error("Verification codes are sent too frequently, please retry in {retry_after_secs}s")]
    Throttled { retry_after_secs: u64 },

    /// Code mismatch and code expiry are deliberately indistinguishable
    #[error("Verification code is incorrect or has expired")]
    InvalidCode,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Nickname is already in use")]
    NicknameTaken,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{ACCOUNT_DISABLED_MESSAGE}")]
    AccountDisabled,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("The two passwords do not match")]
    PasswordMismatch,

    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Outbound notification could not be handed to the transport
    #[error("Notification could not be sent: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            IdentityError::InvalidCode
            | IdentityError::PasswordMismatch
            | IdentityError::PasswordValidation(_)
            | IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::EmailTaken | IdentityError::NicknameTaken => StatusCode::CONFLICT,
            IdentityError::AccountNotFound => StatusCode::NOT_FOUND,
            IdentityError::InvalidCredentials
            | IdentityError::AccountDisabled
            | IdentityError::Unauthenticated => StatusCode::UNAUTHORIZED,
            IdentityError::Forbidden(_) => StatusCode::FORBIDDEN,
            IdentityError::Notification(_) => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Throttled { .. } => ErrorKind::TooManyRequests,
            IdentityError::InvalidCode
            | IdentityError::PasswordMismatch
            | IdentityError::PasswordValidation(_)
            | IdentityError::Validation(_) => ErrorKind::BadRequest,
            IdentityError::EmailTaken | IdentityError::NicknameTaken => ErrorKind::Conflict,
            IdentityError::AccountNotFound => ErrorKind::NotFound,
            IdentityError::InvalidCredentials
            | IdentityError::AccountDisabled
            | IdentityError::Unauthenticated => ErrorKind::Unauthorized,
            IdentityError::Forbidden(_) => ErrorKind::Forbidden,
            IdentityError::Notification(_) => ErrorKind::ServiceUnavailable,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server-side details stay in the log.
    pub fn to_app_error(&self) -> AppError {
        match self {
            IdentityError::Throttled { retry_after_secs } => {
                AppError::too_many_requests(self.to_string()).with_retry_after(*retry_after_secs)
            }
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            IdentityError::Notification(_) => AppError::service_unavailable(
                "The verification code could not be delivered, please try again later",
            ),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::Notification(msg) => {
                tracing::error!(message = %msg, "Verification code dispatch failed");
            }
            IdentityError::Throttled { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Verification code request throttled");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::AccountDisabled => {
                tracing::warn!("Request from disabled account rejected");
            }
            IdentityError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Forbidden identity operation");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                IdentityError::Validation(err.message().to_string())
            }
            _ => IdentityError::Internal(err.to_string()),
        }
    }
}

impl From<platform::password::PasswordPolicyError> for IdentityError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        IdentityError::PasswordValidation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for IdentityError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}
