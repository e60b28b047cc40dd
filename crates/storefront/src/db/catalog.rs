//! Category and product queries.

use async_trait::async_trait;

use corner_store_core::{CategoryId, Price, ProductId, Sku};

use super::{CatalogRepository, PgStore, RepositoryError, map_write_error, to_count, to_db_count};
use crate::models::{Category, NewCategory, NewProduct, Product};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    pub(super) id: ProductId,
    pub(super) sku: Sku,
    pub(super) name: String,
    pub(super) description: String,
    pub(super) price: Price,
    pub(super) stock: i32,
    pub(super) category_id: CategoryId,
    pub(super) image: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: to_count(row.stock, "stock")?,
            category_id: row.category_id,
            image: row.image,
        })
    }
}

/// Column list shared by every product query.
pub(super) const PRODUCT_COLUMNS: &str =
    "p.id, p.sku, p.name, p.description, p.price, p.stock, p.category_id, p.image";

#[async_trait]
impl CatalogRepository for PgStore {
    async fn create_category(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO storefront.category (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            ",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM storefront.category ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM storefront.category WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE storefront.category
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            ",
        )
        .bind(id)
        .bind(&category.name)
        .bind(&category.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.map(Category::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO storefront.product AS p
                (sku, name, description, price, stock, category_id, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING p.id, p.sku, p.name, p.description, p.price, p.stock, p.category_id, p.image
            ",
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(to_db_count(product.stock, "stock")?)
        .bind(product.category_id)
        .bind(&product.image)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product p ORDER BY p.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE storefront.product AS p
            SET sku = $2, name = $3, description = $4, price = $5,
                stock = $6, category_id = $7, image = $8
            WHERE p.id = $1
            RETURNING p.id, p.sku, p.name, p.description, p.price, p.stock, p.category_id, p.image
            ",
        )
        .bind(id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(to_db_count(product.stock, "stock")?)
        .bind(product.category_id)
        .bind(&product.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
