//! Sign In Use Case
//!
//! Checks email and password and issues a session token.

use std::collections::BTreeMap;
use std::sync::Arc;

use platform::clock::Clock;
use platform::password::ClearTextPassword;

use crate::application::config::IdentityConfig;
use crate::application::token::{EMAIL_CLAIM, TokenService};
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub struct SignInOutput {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub account: Account,
}

pub struct SignInUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
    tokens: Arc<TokenService>,
    config: Arc<IdentityConfig>,
    clock: Arc<dyn Clock>,
}

impl<R> SignInUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(
        account_repo: Arc<R>,
        tokens: Arc<TokenService>,
        config: Arc<IdentityConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repo,
            tokens,
            config,
            clock,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> IdentityResult<SignInOutput> {
        let email = Email::new(input.email)?;

        let mut account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        if !account.enabled {
            return Err(IdentityError::AccountDisabled);
        }

        // A password that fails the policy cannot match any stored hash
        let password =
            ClearTextPassword::new(input.password).map_err(|_| IdentityError::InvalidCredentials)?;

        if !account.password_hash.verify(&password, self.config.pepper()) {
            return Err(IdentityError::InvalidCredentials);
        }

        let now = self.clock.now();
        self.account_repo.record_activity(account.id, now).await?;
        account.touch(now);

        let claims = BTreeMap::from([(EMAIL_CLAIM.to_string(), account.email.to_string())]);
        let token = self.tokens.issue_session(&account.id.to_string(), claims)?;

        tracing::info!(account_id = %account.id, "Account signed in");

        Ok(SignInOutput { token, account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAccountRepository;
    use crate::test_support::seed_account_with_password;
    use chrono::{Duration, TimeZone, Utc};
    use platform::clock::ManualClock;

    struct Fixture {
        clock: Arc<ManualClock>,
        repo: Arc<InMemoryAccountRepository>,
        tokens: Arc<TokenService>,
        use_case: SignInUseCase<InMemoryAccountRepository>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap(),
        ));
        let config = Arc::new(IdentityConfig::development());
        let repo = Arc::new(InMemoryAccountRepository::new());
        let tokens = Arc::new(TokenService::new(&config, clock.clone()));
        let use_case = SignInUseCase::new(repo.clone(), tokens.clone(), config, clock.clone());
        Fixture {
            clock,
            repo,
            tokens,
            use_case,
        }
    }

    fn input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_issues_token_with_email_claim() {
        let f = fixture();
        let earlier = f.clock.now() - Duration::days(3);
        let account =
            seed_account_with_password(&f.repo, "a@x.com", "alice", "correct horse", earlier).await;

        let output = f.use_case.execute(input("a@x.com", "correct horse")).await.unwrap();

        let verified = f.tokens.verify(&output.token).unwrap();
        assert_eq!(verified.subject, account.id.to_string());
        assert_eq!(verified.claim(EMAIL_CLAIM), Some("a@x.com"));

        let stored = f.repo.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.last_active_at, f.clock.now());
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let f = fixture();
        assert!(matches!(
            f.use_case.execute(input("ghost@x.com", "whatever1")).await,
            Err(IdentityError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let f = fixture();
        seed_account_with_password(&f.repo, "a@x.com", "alice", "correct horse", f.clock.now())
            .await;
        assert!(matches!(
            f.use_case.execute(input("a@x.com", "wrong horse")).await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            f.use_case.execute(input("a@x.com", "x")).await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let f = fixture();
        let mut account = seed_account_with_password(
            &f.repo,
            "a@x.com",
            "alice",
            "correct horse",
            f.clock.now(),
        )
        .await;
        account.set_enabled(false);
        f.repo.save(&account).await.unwrap();

        assert!(matches!(
            f.use_case.execute(input("a@x.com", "correct horse")).await,
            Err(IdentityError::AccountDisabled)
        ));
    }
}
