//! Customer profile queries.

use async_trait::async_trait;

use corner_store_core::{AccountId, CustomerId};

use super::{CustomerRepository, PgStore, RepositoryError, map_write_error};
use crate::models::{Customer, ProfileUpdate};

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    account_id: AccountId,
    phone: Option<String>,
    address: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            phone: row.phone,
            address: row.address,
        }
    }
}

#[async_trait]
impl CustomerRepository for PgStore {
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, account_id, phone, address FROM storefront.customer WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn get_customer_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, account_id, phone, address FROM storefront.customer WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn get_or_create_customer(
        &self,
        account_id: AccountId,
    ) -> Result<Customer, RepositoryError> {
        // A concurrent first visit loses the insert and reads the winner's row
        sqlx::query(
            r"
            INSERT INTO storefront.customer (account_id)
            VALUES ($1)
            ON CONFLICT (account_id) DO NOTHING
            ",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        self.get_customer_by_account(account_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        update: &ProfileUpdate,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE storefront.customer
            SET phone = $2, address = $3
            WHERE id = $1
            RETURNING id, account_id, phone, address
            ",
        )
        .bind(id)
        .bind(&update.phone)
        .bind(&update.address)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::from).ok_or(RepositoryError::NotFound)
    }
}
