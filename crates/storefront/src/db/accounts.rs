//! Account queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use corner_store_core::{AccountId, AccountRole, Username};

use super::{AccountRepository, PgStore, RepositoryError, map_write_error};
use crate::models::Account;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    username: Username,
    is_staff: bool,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            role: AccountRole::from(row.is_staff),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AccountWithHashRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn create_account(
        &self,
        username: &Username,
        password_hash: &str,
        role: AccountRole,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO storefront.account (username, password_hash, is_staff)
            VALUES ($1, $2, $3)
            RETURNING id, username, is_staff, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.is_staff())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn get_account_with_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHashRow>(
            r"
            SELECT id, username, is_staff, created_at, password_hash
            FROM storefront.account
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| (r.account.into(), r.password_hash)))
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, username, is_staff, created_at
            FROM storefront.account
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn set_account_role(
        &self,
        username: &Username,
        role: AccountRole,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            UPDATE storefront.account
            SET is_staff = $2
            WHERE username = $1
            RETURNING id, username, is_staff, created_at
            ",
        )
        .bind(username)
        .bind(role.is_staff())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(RepositoryError::NotFound)
    }
}
