//! Password Reset Use Cases
//!
//! A reset code is first checked without being spent (so the client can move
//! to the "new password" form), then spent by the actual reset.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::code_store::VerificationCodeStore;
use crate::application::config::IdentityConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

/// Non-consuming check of a reset code
pub struct VerifyResetCodeUseCase {
    codes: Arc<VerificationCodeStore>,
}

impl VerifyResetCodeUseCase {
    pub fn new(codes: Arc<VerificationCodeStore>) -> Self {
        Self { codes }
    }

    /// An unparsable email simply has no pending code.
    pub fn execute(&self, email: &str, code: &str) -> bool {
        Email::new(email).is_ok_and(|email| self.codes.verify(email.as_str(), code))
    }
}

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ResetPasswordUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
    codes: Arc<VerificationCodeStore>,
    config: Arc<IdentityConfig>,
}

impl<R> ResetPasswordUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(
        account_repo: Arc<R>,
        codes: Arc<VerificationCodeStore>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            account_repo,
            codes,
            config,
        }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> IdentityResult<()> {
        if input.new_password != input.confirm_password {
            return Err(IdentityError::PasswordMismatch);
        }

        let email = Email::new(input.email)?;

        if !self.codes.verify(email.as_str(), &input.code) {
            return Err(IdentityError::InvalidCode);
        }

        let mut account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        let password = ClearTextPassword::new(input.new_password)?;
        let password_hash = password.hash(self.config.pepper())?;

        // Spent before the write so two resets cannot share one code
        if !self.codes.consume_if_valid(email.as_str(), &input.code) {
            return Err(IdentityError::InvalidCode);
        }

        account.change_password(password_hash);
        self.account_repo.save(&account).await?;

        tracing::info!(account_id = %account.id, "Password reset");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAccountRepository;
    use crate::test_support::seed_account_with_password;
    use chrono::{Duration, TimeZone, Utc};
    use platform::clock::{Clock, ManualClock};

    struct Fixture {
        clock: Arc<ManualClock>,
        repo: Arc<InMemoryAccountRepository>,
        codes: Arc<VerificationCodeStore>,
        verify: VerifyResetCodeUseCase,
        reset: ResetPasswordUseCase<InMemoryAccountRepository>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap(),
        ));
        let config = Arc::new(IdentityConfig::development());
        let repo = Arc::new(InMemoryAccountRepository::new());
        let codes = Arc::new(
            VerificationCodeStore::new(&config, clock.clone())
                .with_code_source(|_| "654321".to_string()),
        );
        Fixture {
            verify: VerifyResetCodeUseCase::new(codes.clone()),
            reset: ResetPasswordUseCase::new(repo.clone(), codes.clone(), config),
            clock,
            repo,
            codes,
        }
    }

    fn input(code: &str, new: &str, confirm: &str) -> ResetPasswordInput {
        ResetPasswordInput {
            email: "a@x.com".into(),
            code: code.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn test_verify_reset_code_is_non_consuming() {
        let f = fixture();
        f.codes.issue("a@x.com").unwrap();

        assert!(f.verify.execute("A@x.com", "654321"));
        assert!(f.verify.execute("a@x.com", "654321"));
        assert!(!f.verify.execute("a@x.com", "111111"));
        assert!(!f.verify.execute("garbage", "654321"));
    }

    #[tokio::test]
    async fn test_reset_changes_password_and_consumes_code() {
        let f = fixture();
        let account =
            seed_account_with_password(&f.repo, "a@x.com", "alice", "old password", f.clock.now())
                .await;
        f.codes.issue("a@x.com").unwrap();

        f.reset
            .execute(input("654321", "new password", "new password"))
            .await
            .unwrap();

        let stored = f.repo.find_by_id(account.id).await.unwrap().unwrap();
        let new = ClearTextPassword::new("new password".into()).unwrap();
        let old = ClearTextPassword::new("old password".into()).unwrap();
        assert!(stored.password_hash.verify(&new, None));
        assert!(!stored.password_hash.verify(&old, None));
        assert!(!f.codes.verify("a@x.com", "654321"));
    }

    #[tokio::test]
    async fn test_code_resets_only_once() {
        let f = fixture();
        let account =
            seed_account_with_password(&f.repo, "a@x.com", "alice", "old password", f.clock.now())
                .await;
        f.codes.issue("a@x.com").unwrap();

        f.reset
            .execute(input("654321", "first password", "first password"))
            .await
            .unwrap();
        assert!(matches!(
            f.reset
                .execute(input("654321", "second password", "second password"))
                .await,
            Err(IdentityError::InvalidCode)
        ));

        let stored = f.repo.find_by_id(account.id).await.unwrap().unwrap();
        let first = ClearTextPassword::new("first password".into()).unwrap();
        assert!(stored.password_hash.verify(&first, None));
    }

    #[tokio::test]
    async fn test_concurrent_resets_share_no_code() {
        let f = fixture();
        seed_account_with_password(&f.repo, "a@x.com", "alice", "old password", f.clock.now())
            .await;
        f.codes.issue("a@x.com").unwrap();

        let (a, b) = tokio::join!(
            f.reset.execute(input("654321", "first password", "first password")),
            f.reset.execute(input("654321", "second password", "second password")),
        );
        assert_eq!(
            [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_mismatch_checked_first() {
        let f = fixture();
        assert!(matches!(
            f.reset.execute(input("nope", "new password", "other password")).await,
            Err(IdentityError::PasswordMismatch)
        ));
    }

    #[tokio::test]
    async fn test_invalid_or_expired_code() {
        let f = fixture();
        seed_account_with_password(&f.repo, "a@x.com", "alice", "old password", f.clock.now())
            .await;
        f.codes.issue("a@x.com").unwrap();

        assert!(matches!(
            f.reset.execute(input("000000", "new password", "new password")).await,
            Err(IdentityError::InvalidCode)
        ));

        f.clock.advance(Duration::minutes(5));
        assert!(matches!(
            f.reset.execute(input("654321", "new password", "new password")).await,
            Err(IdentityError::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let f = fixture();
        f.codes.issue("a@x.com").unwrap();
        assert!(matches!(
            f.reset.execute(input("654321", "new password", "new password")).await,
            Err(IdentityError::AccountNotFound)
        ));
    }
}
