//! Collaborator Traits
//!
//! Interfaces for account persistence and outbound notifications.
//! Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{email::Email, nickname::Nickname};
use crate::error::IdentityResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>>;

    async fn find_by_id(&self, id: AccountId) -> IdentityResult<Option<Account>>;

    async fn find_by_nickname(&self, nickname: &Nickname) -> IdentityResult<Option<Account>>;

    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool>;

    async fn exists_by_nickname(&self, nickname: &Nickname) -> IdentityResult<bool>;

    /// Insert a new account and return it with its assigned id
    async fn create(&self, account: &Account) -> IdentityResult<Account>;

    /// Write back the whole row (enabled flag, password hash, role)
    async fn save(&self, account: &Account) -> IdentityResult<()>;

    /// Move `last_active_at` forward to `at`. Touches no other column and
    /// leaves a newer timestamp alone.
    async fn record_activity(&self, id: AccountId, at: DateTime<Utc>) -> IdentityResult<()>;

    /// Change only the nickname
    async fn update_nickname(&self, id: AccountId, nickname: &Nickname) -> IdentityResult<()>;

    async fn delete(&self, id: AccountId) -> IdentityResult<()>;

    /// Accounts active at or after `since`
    async fn count_active_since(&self, since: DateTime<Utc>) -> IdentityResult<u64>;
}

/// Outbound notification transport (mail in production)
#[trait_variant::make(NotificationTransport: Send)]
pub trait LocalNotificationTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> IdentityResult<()>;
}
