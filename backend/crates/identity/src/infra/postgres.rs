//! PostgreSQL Account Repository

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;
use sqlx::PgPool;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, email::Email, nickname::Nickname,
};
use crate::error::{IdentityError, IdentityResult};

const ACCOUNT_COLUMNS: &str =
    "id, email, nickname, password_hash, enabled, role, created_at, last_active_at";

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for PgAccountRepository {
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_nickname(&self, nickname: &Nickname) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE nickname = $1"
        ))
        .bind(nickname.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_nickname(&self, nickname: &Nickname) -> IdentityResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE nickname = $1)")
                .bind(nickname.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create(&self, account: &Account) -> IdentityResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (
                email,
                nickname,
                password_hash,
                enabled,
                role,
                created_at,
                last_active_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.email.as_str())
        .bind(account.nickname.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.enabled)
        .bind(account.role.code())
        .bind(account.created_at)
        .bind(account.last_active_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.into_account()
    }

    async fn save(&self, account: &Account) -> IdentityResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                nickname = $2,
                password_hash = $3,
                enabled = $4,
                role = $5,
                last_active_at = $6
            WHERE id = $1
            "#,
        )
        .bind(account.id.value())
        .bind(account.nickname.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.enabled)
        .bind(account.role.code())
        .bind(account.last_active_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::AccountNotFound);
        }

        Ok(())
    }

    async fn record_activity(&self, id: AccountId, at: DateTime<Utc>) -> IdentityResult<()> {
        // Zero rows also means a newer timestamp is already stored
        sqlx::query("UPDATE accounts SET last_active_at = $2 WHERE id = $1 AND last_active_at < $2")
            .bind(id.value())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_nickname(&self, id: AccountId, nickname: &Nickname) -> IdentityResult<()> {
        let result = sqlx::query("UPDATE accounts SET nickname = $2 WHERE id = $1")
            .bind(id.value())
            .bind(nickname.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::AccountNotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: AccountId) -> IdentityResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::AccountNotFound);
        }

        Ok(())
    }

    async fn count_active_since(&self, since: DateTime<Utc>) -> IdentityResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE last_active_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Unique constraint races (two registrations passing the existence checks
/// together) surface as the matching domain error.
fn map_unique_violation(err: sqlx::Error) -> IdentityError {
    let nickname_clash = match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            Some(db_err.constraint() == Some("accounts_nickname_key"))
        }
        _ => None,
    };

    match nickname_clash {
        Some(true) => IdentityError::NicknameTaken,
        Some(false) => IdentityError::EmailTaken,
        None => IdentityError::Database(err),
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    email: String,
    nickname: String,
    password_hash: String,
    enabled: bool,
    role: String,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> IdentityResult<Account> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| IdentityError::Internal(format!("Invalid password_hash: {e}")))?;

        let role = AccountRole::from_code(&self.role)
            .ok_or_else(|| IdentityError::Internal(format!("Invalid role: {}", self.role)))?;

        Ok(Account {
            id: AccountId::new(self.id),
            email: Email::from_db(self.email),
            nickname: Nickname::from_db(self.nickname),
            password_hash,
            enabled: self.enabled,
            role,
            created_at: self.created_at,
            last_active_at: self.last_active_at,
        })
    }
}
