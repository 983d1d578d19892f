use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Stored and serialized as its code string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    #[default]
    User,
    Admin,
}

impl AccountRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            AccountRole::User => "USER",
            AccountRole::Admin => "ADMIN",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, AccountRole::Admin)
    }

    /// Unknown codes yield `None`; callers decide whether that is fatal.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USER" => Some(AccountRole::User),
            "ADMIN" => Some(AccountRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
