//! Account Administration Use Cases
//!
//! Administrators switch accounts on and off, delete them, and watch daily
//! activity.

use std::sync::Arc;

use kernel::id::AccountId;
use platform::clock::{Clock, start_of_local_day};

use crate::domain::authorization::require_admin;
use crate::domain::entity::{account::Account, principal::Principal};
use crate::domain::repository::AccountRepository;
use crate::error::{IdentityError, IdentityResult};

pub struct SetAccountEnabledUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
}

impl<R> SetAccountEnabledUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>) -> Self {
        Self { account_repo }
    }

    /// Admins may not disable themselves or another admin.
    pub async fn execute(
        &self,
        actor: &Principal,
        target_id: AccountId,
        enabled: bool,
    ) -> IdentityResult<Account> {
        require_admin(actor)?;

        if !enabled && actor.id() == target_id {
            return Err(IdentityError::Forbidden(
                "You cannot disable your own account".into(),
            ));
        }

        let mut target = self
            .account_repo
            .find_by_id(target_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        if !enabled && target.is_admin() {
            return Err(IdentityError::Forbidden(
                "You cannot disable another administrator's account".into(),
            ));
        }

        target.set_enabled(enabled);
        self.account_repo.save(&target).await?;

        tracing::info!(
            actor_id = %actor.id(),
            target_id = %target.id,
            enabled,
            "Account status changed"
        );

        Ok(target)
    }
}

pub struct DeleteAccountUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
}

impl<R> DeleteAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>) -> Self {
        Self { account_repo }
    }

    /// Same guards as disabling: never oneself, never another admin.
    pub async fn execute(&self, actor: &Principal, target_id: AccountId) -> IdentityResult<()> {
        require_admin(actor)?;

        if actor.id() == target_id {
            return Err(IdentityError::Forbidden(
                "You cannot delete your own account".into(),
            ));
        }

        let target = self
            .account_repo
            .find_by_id(target_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        if target.is_admin() {
            return Err(IdentityError::Forbidden(
                "You cannot delete another administrator's account".into(),
            ));
        }

        self.account_repo.delete(target.id).await?;

        tracing::info!(
            actor_id = %actor.id(),
            target_id = %target.id,
            "Account deleted"
        );

        Ok(())
    }
}

pub struct CountActiveAccountsUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CountActiveAccountsUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account_repo,
            clock,
        }
    }

    /// Accounts active since the start of the current local day.
    pub async fn execute(&self, actor: &Principal) -> IdentityResult<u64> {
        require_admin(actor)?;

        let day_start = start_of_local_day(self.clock.now());
        self.account_repo.count_active_since(day_start).await
    }
}
