//! Wishlist line queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use corner_store_core::{CustomerId, ProductId, WishlistLineId};

use super::catalog::{PRODUCT_COLUMNS, ProductRow};
use super::{PgStore, RepositoryError, WishlistRepository, map_write_error};
use crate::models::{Product, WishlistItem, WishlistLine};

#[derive(sqlx::FromRow)]
struct WishlistLineRow {
    id: WishlistLineId,
    customer_id: CustomerId,
    product_id: ProductId,
    added_at: DateTime<Utc>,
}

impl From<WishlistLineRow> for WishlistLine {
    fn from(row: WishlistLineRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            product_id: row.product_id,
            added_at: row.added_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WishlistItemRow {
    line_id: WishlistLineId,
    customer_id: CustomerId,
    added_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<WishlistItemRow> for WishlistItem {
    type Error = RepositoryError;

    fn try_from(row: WishlistItemRow) -> Result<Self, Self::Error> {
        let product = Product::try_from(row.product)?;
        Ok(Self {
            line: WishlistLine {
                id: row.line_id,
                customer_id: row.customer_id,
                product_id: product.id,
                added_at: row.added_at,
            },
            product,
        })
    }
}

#[async_trait]
impl WishlistRepository for PgStore {
    async fn get_wishlist_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<WishlistLine>, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistLineRow>(
            r"
            SELECT id, customer_id, product_id, added_at
            FROM storefront.wishlist_line
            WHERE customer_id = $1 AND product_id = $2
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(WishlistLine::from))
    }

    async fn insert_wishlist_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<WishlistLine, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistLineRow>(
            r"
            INSERT INTO storefront.wishlist_line (customer_id, product_id)
            VALUES ($1, $2)
            RETURNING id, customer_id, product_id, added_at
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn delete_wishlist_line(&self, id: WishlistLineId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.wishlist_line WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_wishlist(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistItemRow>(&format!(
            r"
            SELECT w.id AS line_id, w.customer_id, w.added_at, {PRODUCT_COLUMNS}
            FROM storefront.wishlist_line w
            JOIN storefront.product p ON p.id = w.product_id
            WHERE w.customer_id = $1
            ORDER BY w.id
            "
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WishlistItem::try_from).collect()
    }
}
