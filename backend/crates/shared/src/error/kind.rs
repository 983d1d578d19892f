//! Error Kind
//!
//! Classification of failures, each mapped to one HTTP status code.

use serde::Serialize;

/// Error classification shared by every crate.
///
/// The serialized form (`SCREAMING_SNAKE_CASE`) is the machine-readable
/// `kind` field of error responses, so clients can branch on it without
/// parsing messages.
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
/// assert_eq!(ErrorKind::NotFound.as_str(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - malformed input, failed validation, wrong or expired code
    BadRequest,
    /// 401 - missing credential, or credential belongs to a disabled account
    Unauthorized,
    /// 403 - authenticated but lacking the required capability
    Forbidden,
    /// 404 - account or resource does not exist
    NotFound,
    /// 409 - uniqueness conflict (email, nickname)
    Conflict,
    /// 422 - well-formed but semantically unusable input
    UnprocessableEntity,
    /// 429 - cooldown window not yet elapsed
    TooManyRequests,
    /// 500 - unexpected failure
    InternalServerError,
    /// 503 - a collaborator (database, mail transport) is unavailable
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Standard reason phrase.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx kinds; these are logged at error level.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }

    /// Whether the caller may retry the same request later and expect success.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::TooManyRequests | ErrorKind::ServiceUnavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
