//! Profile Use Cases
//!
//! Nickname availability and self-service profile edits.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::entity::{account::Account, principal::Principal};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::nickname::Nickname;
use crate::error::{IdentityError, IdentityResult};

pub struct CheckNicknameUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
}

impl<R> CheckNicknameUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>) -> Self {
        Self { account_repo }
    }

    /// A nickname held by `exclude` counts as available, so a profile form
    /// can resubmit its owner's current nickname.
    pub async fn execute(&self, nickname: &str, exclude: Option<AccountId>) -> IdentityResult<bool> {
        let nickname = Nickname::new(nickname)?;
        let holder = self.account_repo.find_by_nickname(&nickname).await?;

        Ok(match holder {
            None => true,
            Some(holder) => Some(holder.id) == exclude,
        })
    }
}

/// Absent fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub nickname: Option<String>,
}

pub struct UpdateProfileUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
}

impl<R> UpdateProfileUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>) -> Self {
        Self { account_repo }
    }

    pub async fn execute(
        &self,
        actor: &Principal,
        input: UpdateProfileInput,
    ) -> IdentityResult<Account> {
        let mut account = actor.account().clone();

        if let Some(raw) = input.nickname {
            let nickname = Nickname::new(raw)?;

            if nickname != account.nickname {
                let holder = self.account_repo.find_by_nickname(&nickname).await?;
                if holder.is_some_and(|holder| holder.id != account.id) {
                    return Err(IdentityError::NicknameTaken);
                }

                self.account_repo
                    .update_nickname(account.id, &nickname)
                    .await?;

                tracing::info!(
                    account_id = %account.id,
                    nickname = %nickname,
                    "Nickname changed"
                );
                account.nickname = nickname;
            }
        }

        Ok(account)
    }
}
