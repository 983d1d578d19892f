//! Shared fixtures for the crate's tests

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use platform::password::{ClearTextPassword, HashedPassword};

use crate::application::token::{EMAIL_CLAIM, TokenService};
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, email::Email, nickname::Nickname,
};
use crate::infra::memory::InMemoryAccountRepository;

/// Well-formed hash that no test password matches
const PLACEHOLDER_PHC: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$0K6CxkjQ3n+4M7tAq1xbYZLz0cS5U4sU3Ck3YH0o6dE";

async fn insert(
    repo: &InMemoryAccountRepository,
    email: &str,
    nickname: &str,
    password_hash: HashedPassword,
    role: AccountRole,
    last_active_at: DateTime<Utc>,
) -> Account {
    let mut account = Account::register(
        Email::new(email).unwrap(),
        Nickname::new(nickname).unwrap(),
        password_hash,
        last_active_at,
    );
    account.role = role;
    account.last_active_at = last_active_at;
    repo.create(&account).await.unwrap()
}

pub(crate) async fn seed_account(
    repo: &InMemoryAccountRepository,
    email: &str,
    nickname: &str,
    role: AccountRole,
    last_active_at: DateTime<Utc>,
) -> Account {
    let hash = HashedPassword::from_phc_string(PLACEHOLDER_PHC).unwrap();
    insert(repo, email, nickname, hash, role, last_active_at).await
}

/// Hashes `password` without a pepper, matching `IdentityConfig::development()`.
pub(crate) async fn seed_account_with_password(
    repo: &InMemoryAccountRepository,
    email: &str,
    nickname: &str,
    password: &str,
    last_active_at: DateTime<Utc>,
) -> Account {
    let hash = ClearTextPassword::new(password.to_string())
        .unwrap()
        .hash(None)
        .unwrap();
    insert(repo, email, nickname, hash, AccountRole::User, last_active_at).await
}

pub(crate) fn session_token_for(tokens: &TokenService, account: &Account) -> String {
    let claims = BTreeMap::from([(EMAIL_CLAIM.to_string(), account.email.to_string())]);
    tokens
        .issue_session(&account.id.to_string(), claims)
        .unwrap()
}
