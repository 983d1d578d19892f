//! Authenticate Request Use Case
//!
//! Turns the bearer credential of one request into an [`AuthOutcome`]:
//!
//! 1. no credential → `Anonymous`
//! 2. token fails verification → `Anonymous`
//! 3. no account for the token's email claim → `Anonymous`
//! 4. account disabled → `Rejected`
//! 5. otherwise → `Authenticated`, after recording the first activity of the
//!    local calendar day
//!
//! Step 5's write is best-effort. A failed write is logged and the request
//! still proceeds as authenticated.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::bearer::extract_bearer;
use platform::clock::{Clock, start_of_local_day};

use crate::application::token::{EMAIL_CLAIM, TokenService};
use crate::domain::entity::{account::Account, principal::Principal};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::ACCOUNT_DISABLED_MESSAGE;

#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Anonymous,
    /// Valid token, but the request must not proceed
    Rejected { reason: String },
    Authenticated(Principal),
}

impl AuthOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthOutcome::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }
}

pub struct AuthenticateUseCase<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<R>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl<R> AuthenticateUseCase<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<R>, tokens: Arc<TokenService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account_repo,
            tokens,
            clock,
        }
    }

    /// Authenticate from the request's `Authorization` header.
    pub async fn execute(&self, headers: &HeaderMap) -> AuthOutcome {
        let token = extract_bearer(headers);
        self.execute_token(token.as_deref()).await
    }

    /// Authenticate an already extracted bearer token.
    pub async fn execute_token(&self, token: Option<&str>) -> AuthOutcome {
        let Some(token) = token else {
            return AuthOutcome::Anonymous;
        };

        let Ok(verified) = self.tokens.verify(token) else {
            return AuthOutcome::Anonymous;
        };

        let Some(email) = verified
            .claim(EMAIL_CLAIM)
            .and_then(|raw| Email::new(raw).ok())
        else {
            tracing::debug!(subject = %verified.subject, "Token carries no usable email claim");
            return AuthOutcome::Anonymous;
        };

        let account = match self.account_repo.find_by_email(&email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::debug!(subject = %verified.subject, "Token refers to unknown account");
                return AuthOutcome::Anonymous;
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not resolve account for request");
                return AuthOutcome::Anonymous;
            }
        };

        if !account.enabled {
            tracing::warn!(account_id = %account.id, "Request from disabled account rejected");
            return AuthOutcome::Rejected {
                reason: ACCOUNT_DISABLED_MESSAGE.to_string(),
            };
        }

        let account = self.record_daily_activity(account).await;
        AuthOutcome::Authenticated(Principal::new(account))
    }

    /// Stamp `last_active_at` on the first authenticated request of the day.
    /// Only the timestamp column is written, so an account changed since the
    /// lookup (disabled, new password) keeps that change.
    async fn record_daily_activity(&self, mut account: Account) -> Account {
        let now = self.clock.now();
        if !account.needs_activity_refresh(start_of_local_day(now)) {
            return account;
        }

        match self.account_repo.record_activity(account.id, now).await {
            Ok(()) => account.touch(now),
            Err(e) => tracing::warn!(
                account_id = %account.id,
                error = %e,
                "Failed to record daily activity, continuing"
            ),
        }

        account
    }
}
