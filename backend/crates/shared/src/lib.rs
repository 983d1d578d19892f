//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - the unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - typed numeric identifiers for accounts, articles and comments

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
