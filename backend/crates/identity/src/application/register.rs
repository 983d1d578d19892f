//! Register Use Case
//!
//! Creates an account for an email address proven by a verification code.

use std::sync::Arc;

use platform::clock::Clock;
use platform::password::ClearTextPassword;

use crate::application::code_store::VerificationCodeStore;
use crate::application::config::IdentityConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, nickname::Nickname};
use crate::error::{IdentityError, IdentityResult};

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub nickname: String,
    pub code: String,
}

pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
    codes: Arc<VerificationCodeStore>,
    config: Arc<IdentityConfig>,
    clock: Arc<dyn Clock>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(
        account_repo: Arc<R>,
        codes: Arc<VerificationCodeStore>,
        config: Arc<IdentityConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repo,
            codes,
            config,
            clock,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<Account> {
        let email = Email::new(input.email)?;
        let nickname = Nickname::new(&input.nickname)?;

        if self.account_repo.exists_by_email(&email).await? {
            return Err(IdentityError::EmailTaken);
        }

        if self.account_repo.exists_by_nickname(&nickname).await? {
            return Err(IdentityError::NicknameTaken);
        }

        if !self.codes.verify(email.as_str(), &input.code) {
            return Err(IdentityError::InvalidCode);
        }

        let password = ClearTextPassword::new(input.password)?;
        let password_hash = password.hash(self.config.pepper())?;

        // Another request may have used the code while we were hashing
        if !self.codes.consume_if_valid(email.as_str(), &input.code) {
            return Err(IdentityError::InvalidCode);
        }

        let account = Account::register(email, nickname, password_hash, self.clock.now());
        let account = self.account_repo.create(&account).await?;

        tracing::info!(
            account_id = %account.id,
            nickname = %account.nickname,
            "Account registered"
        );

        Ok(account)
    }
}
