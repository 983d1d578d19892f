//! In-Memory Account Repository
//!
//! Backs local development without a database and the test suite. Lookups
//! and writes can be made to fail on demand.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use tokio::sync::RwLock;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, nickname::Nickname};
use crate::error::{IdentityError, IdentityResult};

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
    next_id: Arc<AtomicI64>,
    saves: Arc<AtomicUsize>,
    activity_writes: Arc<AtomicUsize>,
    fail_lookups: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of `record_activity` calls that moved the timestamp
    pub fn activity_write_count(&self) -> usize {
        self.activity_writes.load(Ordering::SeqCst)
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Applies to every write, not only `save`
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn check_lookup(&self) -> IdentityResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(IdentityError::Internal("account lookup unavailable".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> IdentityResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(IdentityError::Internal("account store unavailable".into()));
        }
        Ok(())
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        self.check_lookup()?;
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| &a.email == email).cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> IdentityResult<Option<Account>> {
        self.check_lookup()?;
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_nickname(&self, nickname: &Nickname) -> IdentityResult<Option<Account>> {
        self.check_lookup()?;
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| &a.nickname == nickname).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        self.check_lookup()?;
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| &a.email == email))
    }

    async fn exists_by_nickname(&self, nickname: &Nickname) -> IdentityResult<bool> {
        self.check_lookup()?;
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| &a.nickname == nickname))
    }

    async fn create(&self, account: &Account) -> IdentityResult<Account> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|a| a.email == account.email || a.nickname == account.nickname)
        {
            return Err(IdentityError::EmailTaken);
        }

        let id = AccountId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut created = account.clone();
        created.id = id;
        accounts.insert(id, created.clone());

        Ok(created)
    }

    async fn save(&self, account: &Account) -> IdentityResult<()> {
        self.check_write()?;

        let mut accounts = self.accounts.write().await;
        let Some(slot) = accounts.get_mut(&account.id) else {
            return Err(IdentityError::AccountNotFound);
        };
        *slot = account.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn record_activity(&self, id: AccountId, at: DateTime<Utc>) -> IdentityResult<()> {
        self.check_write()?;

        let mut accounts = self.accounts.write().await;
        let Some(slot) = accounts.get_mut(&id) else {
            return Err(IdentityError::AccountNotFound);
        };
        if slot.last_active_at < at {
            slot.last_active_at = at;
            self.activity_writes.fetch_add(1, Ordering::SeqCst);
        }

        Ok(())
    }

    async fn update_nickname(&self, id: AccountId, nickname: &Nickname) -> IdentityResult<()> {
        self.check_write()?;

        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != id && &a.nickname == nickname)
        {
            return Err(IdentityError::NicknameTaken);
        }
        let Some(slot) = accounts.get_mut(&id) else {
            return Err(IdentityError::AccountNotFound);
        };
        slot.nickname = nickname.clone();

        Ok(())
    }

    async fn delete(&self, id: AccountId) -> IdentityResult<()> {
        self.check_write()?;

        match self.accounts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(IdentityError::AccountNotFound),
        }
    }

    async fn count_active_since(&self, since: DateTime<Utc>) -> IdentityResult<u64> {
        self.check_lookup()?;
        let accounts = self.accounts.read().await;
        Ok(accounts.values().filter(|a| a.last_active_at >= since).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::account_role::AccountRole;
    use crate::test_support::seed_account;
    use chrono::Duration;

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let repo = InMemoryAccountRepository::new();
        let a = seed_account(&repo, "a@x.com", "a", AccountRole::User, Utc::now()).await;
        let b = seed_account(&repo, "b@x.com", "b", AccountRole::User, Utc::now()).await;
        assert_eq!(a.id.value(), 1);
        assert_eq!(b.id.value(), 2);
    }

    #[tokio::test]
    async fn test_lookups() {
        let repo = InMemoryAccountRepository::new();
        let a = seed_account(&repo, "a@x.com", "alice", AccountRole::User, Utc::now()).await;

        let email = Email::new("a@x.com").unwrap();
        assert_eq!(repo.find_by_email(&email).await.unwrap().unwrap().id, a.id);
        assert!(repo.exists_by_email(&email).await.unwrap());
        assert!(repo.exists_by_nickname(&Nickname::new("alice").unwrap()).await.unwrap());
        assert!(!repo.exists_by_nickname(&Nickname::new("bob").unwrap()).await.unwrap());
        let by_nickname = repo.find_by_nickname(&Nickname::new("alice").unwrap()).await.unwrap();
        assert_eq!(by_nickname.map(|a| a.id), Some(a.id));
        assert!(repo.find_by_id(AccountId::new(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_unknown_account_fails() {
        let repo = InMemoryAccountRepository::new();
        let mut a = seed_account(&repo, "a@x.com", "alice", AccountRole::User, Utc::now()).await;
        a.id = AccountId::new(77);
        assert!(matches!(
            repo.save(&a).await,
            Err(IdentityError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let repo = InMemoryAccountRepository::new();
        let a = seed_account(&repo, "a@x.com", "alice", AccountRole::User, Utc::now()).await;

        repo.fail_saves(true);
        assert!(repo.save(&a).await.is_err());
        repo.fail_saves(false);
        assert!(repo.save(&a).await.is_ok());

        repo.fail_saves(true);
        assert!(repo.record_activity(a.id, Utc::now()).await.is_err());
        assert!(repo.delete(a.id).await.is_err());
        repo.fail_saves(false);

        repo.fail_lookups(true);
        assert!(repo.find_by_id(a.id).await.is_err());
    }

    #[tokio::test]
    async fn test_record_activity_only_moves_forward() {
        let repo = InMemoryAccountRepository::new();
        let now = Utc::now();
        let mut a = seed_account(&repo, "a@x.com", "alice", AccountRole::User, now).await;
        a.set_enabled(false);
        repo.save(&a).await.unwrap();

        repo.record_activity(a.id, now - Duration::hours(1)).await.unwrap();
        assert_eq!(repo.activity_write_count(), 0);

        repo.record_activity(a.id, now + Duration::hours(1)).await.unwrap();
        let stored = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.last_active_at, now + Duration::hours(1));
        assert!(!stored.enabled);
        assert_eq!(repo.activity_write_count(), 1);

        assert!(matches!(
            repo.record_activity(AccountId::new(77), now).await,
            Err(IdentityError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_nickname_and_delete() {
        let repo = InMemoryAccountRepository::new();
        let a = seed_account(&repo, "a@x.com", "alice", AccountRole::User, Utc::now()).await;
        seed_account(&repo, "b@x.com", "bob", AccountRole::User, Utc::now()).await;

        assert!(matches!(
            repo.update_nickname(a.id, &Nickname::new("bob").unwrap()).await,
            Err(IdentityError::NicknameTaken)
        ));
        // Keeping one's own nickname is not a clash
        repo.update_nickname(a.id, &Nickname::new("alice").unwrap()).await.unwrap();
        repo.update_nickname(a.id, &Nickname::new("ally").unwrap()).await.unwrap();
        assert_eq!(repo.find_by_id(a.id).await.unwrap().unwrap().nickname.as_str(), "ally");

        repo.delete(a.id).await.unwrap();
        assert!(repo.find_by_id(a.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(a.id).await, Err(IdentityError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_count_active_since() {
        let repo = InMemoryAccountRepository::new();
        let now = Utc::now();
        seed_account(&repo, "a@x.com", "a", AccountRole::User, now).await;
        seed_account(&repo, "b@x.com", "b", AccountRole::User, now - Duration::hours(2)).await;
        seed_account(&repo, "c@x.com", "c", AccountRole::User, now - Duration::days(2)).await;

        assert_eq!(repo.count_active_since(now).await.unwrap(), 1);
        assert_eq!(repo.count_active_since(now - Duration::hours(2)).await.unwrap(), 2);
        assert_eq!(repo.count_active_since(now - Duration::days(3)).await.unwrap(), 3);
    }
}
