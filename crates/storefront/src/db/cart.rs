//! Cart line queries.

use async_trait::async_trait;

use corner_store_core::{CartLineId, CustomerId, ProductId};

use super::catalog::{PRODUCT_COLUMNS, ProductRow};
use super::{CartRepository, PgStore, RepositoryError, map_write_error, to_count, to_db_count};
use crate::models::{CartItem, CartLine, Product};

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    customer_id: CustomerId,
    product_id: ProductId,
    quantity: i32,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            product_id: row.product_id,
            quantity: to_count(row.quantity, "quantity")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    line_id: CartLineId,
    customer_id: CustomerId,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let product = Product::try_from(row.product)?;
        Ok(Self {
            line: CartLine {
                id: row.line_id,
                customer_id: row.customer_id,
                product_id: product.id,
                quantity: to_count(row.quantity, "quantity")?,
            },
            product,
        })
    }
}

#[async_trait]
impl CartRepository for PgStore {
    async fn get_cart_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, customer_id, product_id, quantity
            FROM storefront.cart_line
            WHERE customer_id = $1 AND product_id = $2
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    async fn insert_cart_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            INSERT INTO storefront.cart_line (customer_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, product_id, quantity
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(to_db_count(quantity, "quantity")?)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    async fn set_cart_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            UPDATE storefront.cart_line
            SET quantity = $2
            WHERE id = $1
            RETURNING id, customer_id, product_id, quantity
            ",
        )
        .bind(id)
        .bind(to_db_count(quantity, "quantity")?)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_cart_line(&self, id: CartLineId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_line WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_cart(&self, customer_id: CustomerId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            r"
            SELECT c.id AS line_id, c.customer_id, c.quantity, {PRODUCT_COLUMNS}
            FROM storefront.cart_line c
            JOIN storefront.product p ON p.id = c.product_id
            WHERE c.customer_id = $1
            ORDER BY c.id
            "
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }
}
