//! Account Entity

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::value_object::{account_role::AccountRole, email::Email, nickname::Nickname};

/// Registered account
#[derive(Debug, Clone)]
pub struct Account {
    /// Database-assigned; `AccountId::new(0)` until persisted
    pub id: AccountId,
    pub email: Email,
    pub nickname: Nickname,
    pub password_hash: HashedPassword,
    pub enabled: bool,
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
    /// Last successful sign-in or first authenticated request of the day
    pub last_active_at: DateTime<Utc>,
}

impl Account {
    /// Enabled `User` account, not yet persisted.
    pub fn register(
        email: Email,
        nickname: Nickname,
        password_hash: HashedPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(0),
            email,
            nickname,
            password_hash,
            enabled: true,
            role: AccountRole::User,
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// True when no activity has been recorded since `day_start`.
    pub fn needs_activity_refresh(&self, day_start: DateTime<Utc>) -> bool {
        self.last_active_at < day_start
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active_at = now;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn change_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use platform::password::ClearTextPassword;

    fn account(now: DateTime<Utc>) -> Account {
        let hash = ClearTextPassword::new("long-enough-pw".into())
            .unwrap()
            .hash(None)
            .unwrap();
        Account::register(
            Email::new("a@x.com").unwrap(),
            Nickname::new("alice").unwrap(),
            hash,
            now,
        )
    }

    #[test]
    fn test_register_defaults() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let account = account(now);
        assert!(account.enabled);
        assert_eq!(account.role, AccountRole::User);
        assert!(!account.is_admin());
        assert_eq!(account.last_active_at, now);
    }

    #[test]
    fn test_needs_activity_refresh() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let mut account = account(now - Duration::days(1));
        assert!(account.needs_activity_refresh(now - Duration::hours(1)));

        account.touch(now);
        assert!(!account.needs_activity_refresh(now - Duration::hours(1)));
        assert!(!account.needs_activity_refresh(now));
    }
}
