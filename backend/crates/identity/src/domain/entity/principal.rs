//! Authenticated Principal
//!
//! The account resolved for the current request. Built fresh on every
//! request and never cached.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{account_role::AccountRole, email::Email};

#[derive(Debug, Clone)]
pub struct Principal {
    account: Account,
}

impl Principal {
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn id(&self) -> AccountId {
        self.account.id
    }

    pub fn role(&self) -> AccountRole {
        self.account.role
    }

    pub fn email(&self) -> &Email {
        &self.account.email
    }

    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.account.last_active_at
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn into_account(self) -> Account {
        self.account
    }
}
