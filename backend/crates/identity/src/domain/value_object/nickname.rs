//! Nickname Value Object
//!
//! Display name shown next to articles and comments. Unique across accounts,
//! compared exactly as stored (after trimming).

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

pub const NICKNAME_MAX_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{_0}")]
pub struct Nickname(String);

impl Nickname {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityError> {
        let nickname = raw.as_ref().trim();

        if nickname.is_empty() {
            return Err(IdentityError::Validation("Nickname cannot be empty".into()));
        }
        // Code points, not bytes
        if nickname.chars().count() > NICKNAME_MAX_LENGTH {
            return Err(IdentityError::Validation(format!(
                "Nickname must be at most {NICKNAME_MAX_LENGTH} characters"
            )));
        }
        if nickname.chars().any(char::is_control) {
            return Err(IdentityError::Validation(
                "Nickname contains invalid control characters".into(),
            ));
        }

        Ok(Self(nickname.to_string()))
    }

    pub fn from_db(nickname: impl Into<String>) -> Self {
        Self(nickname.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
