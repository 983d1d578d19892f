//! Send Verification Code Use Case
//!
//! Issues a one-time code and mails it to the recipient.

use std::sync::Arc;

use serde::Deserialize;

use crate::application::code_store::VerificationCodeStore;
use crate::application::config::IdentityConfig;
use crate::domain::repository::{AccountRepository, NotificationTransport};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodePurpose {
    Register,
    ResetPassword,
}

impl CodePurpose {
    pub const fn subject(&self) -> &'static str {
        match self {
            CodePurpose::Register => "Registration verification code",
            CodePurpose::ResetPassword => "Password reset verification code",
        }
    }
}

pub struct SendVerificationCodeUseCase<R, N>
where
    R: AccountRepository,
    N: NotificationTransport,
{
    account_repo: Arc<R>,
    transport: Arc<N>,
    codes: Arc<VerificationCodeStore>,
    config: Arc<IdentityConfig>,
}

impl<R, N> SendVerificationCodeUseCase<R, N>
where
    R: AccountRepository,
    N: NotificationTransport,
{
    pub fn new(
        account_repo: Arc<R>,
        transport: Arc<N>,
        codes: Arc<VerificationCodeStore>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            account_repo,
            transport,
            codes,
            config,
        }
    }

    /// A failed dispatch is reported as [`IdentityError::Notification`] but
    /// the issued code stays pending, so the cooldown still applies.
    pub async fn execute(&self, email: &str, purpose: CodePurpose) -> IdentityResult<()> {
        let email = Email::new(email)?;

        if purpose == CodePurpose::ResetPassword
            && !self.account_repo.exists_by_email(&email).await?
        {
            return Err(IdentityError::AccountNotFound);
        }

        let code = self.codes.issue(email.as_str())?;

        let body = format!(
            "Your verification code is: {code}. It is valid for {} minutes.",
            self.config.code_ttl_minutes()
        );

        self.transport
            .send(email.as_str(), purpose.subject(), &body)
            .await
            .map_err(|e| match e {
                IdentityError::Notification(_) => e,
                other => IdentityError::Notification(other.to_string()),
            })?;

        tracing::info!(recipient = %email, ?purpose, "Verification code sent");

        Ok(())
    }
}
