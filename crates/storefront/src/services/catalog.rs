//! Catalog service: categories and products.
//!
//! Reads are public. Writes are staff-only, which the route layer enforces
//! with `RequireStaff` before calling in here.

use tracing::instrument;

use corner_store_core::{CategoryId, ProductId};

use super::{Missing, ServiceError};
use crate::db::{CatalogRepository, RepositoryError, Store};
use crate::forms::{CategoryForm, FieldErrors, INVALID_CHOICE, ProductForm};
use crate::models::{Category, NewProduct, Product};

pub const DUPLICATE_CATEGORY: &str = "Category with this Name already exists.";
pub const DUPLICATE_SKU: &str = "Product with this Sku already exists.";

pub struct CatalogService<'a> {
    store: &'a dyn Store,
}

/// Map a store conflict on a unique column to a form error on that field.
fn conflict_to_field(e: RepositoryError, field: &str, message: &str) -> ServiceError {
    match e {
        RepositoryError::Conflict(f) if f == field => {
            ServiceError::Validation(FieldErrors::single(field, message))
        }
        other => other.into(),
    }
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank or duplicate name.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_category(&self, form: &CategoryForm) -> Result<Category, ServiceError> {
        let new = form.clean()?;
        let category = self
            .store
            .create_category(&new)
            .await
            .map_err(|e| conflict_to_field(e, "name", DUPLICATE_CATEGORY))?;
        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.store.list_categories().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no such category.
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ServiceError> {
        self.store
            .get_category(id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Category(id)))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown id and
    /// `ServiceError::Validation` for a blank or duplicate name.
    #[instrument(skip(self, form))]
    pub async fn edit_category(
        &self,
        id: CategoryId,
        form: &CategoryForm,
    ) -> Result<Category, ServiceError> {
        let new = form.clean()?;
        self.store
            .update_category(id, &new)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound(Missing::Category(id)),
                other => conflict_to_field(other, "name", DUPLICATE_CATEGORY),
            })
    }

    /// Delete a category together with its products and everything that
    /// references them.
    ///
    /// Returns the image paths of the deleted products so the caller can
    /// remove the files.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no such category.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<Vec<String>, ServiceError> {
        let images: Vec<String> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .filter(|product| product.category_id == id)
            .filter_map(|product| product.image)
            .collect();

        self.store.delete_category(id).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::NotFound(Missing::Category(id)),
            other => other.into(),
        })?;
        tracing::info!(category_id = %id, images = images.len(), "category deleted");
        Ok(images)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Validate the form and check the chosen category exists.
    async fn clean_product(
        &self,
        form: &ProductForm,
        image: Option<String>,
    ) -> Result<NewProduct, ServiceError> {
        let mut product = form.clean(image);
        if let Ok(new) = &product
            && self.store.get_category(new.category_id).await?.is_none()
        {
            product = Err(FieldErrors::single("category", INVALID_CHOICE));
        }
        Ok(product?)
    }

    /// Create a product. `image` is a path already saved under the media dir.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields, an unknown category
    /// or a duplicate SKU.
    #[instrument(skip(self, form), fields(sku = %form.sku))]
    pub async fn create_product(
        &self,
        form: &ProductForm,
        image: Option<String>,
    ) -> Result<Product, ServiceError> {
        let new = self.clean_product(form, image).await?;
        let product = self
            .store
            .create_product(&new)
            .await
            .map_err(|e| match e {
                // Category deleted between the check and the insert
                RepositoryError::NotFound => {
                    ServiceError::Validation(FieldErrors::single("category", INVALID_CHOICE))
                }
                other => conflict_to_field(other, "sku", DUPLICATE_SKU),
            })?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// All products in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.list_products().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no such product.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.store
            .get_product(id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Product(id)))
    }

    /// Replace a product's fields. A `None` image keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown id and
    /// `ServiceError::Validation` as for [`Self::create_product`].
    #[instrument(skip(self, form))]
    pub async fn edit_product(
        &self,
        id: ProductId,
        form: &ProductForm,
        image: Option<String>,
    ) -> Result<Product, ServiceError> {
        let existing = self.get_product(id).await?;
        let new = self
            .clean_product(form, image.or(existing.image))
            .await?;
        self.store
            .update_product(id, &new)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound(Missing::Product(id)),
                other => conflict_to_field(other, "sku", DUPLICATE_SKU),
            })
    }

    /// Delete a product and its cart, wishlist and order-item rows.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no such product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        self.store.delete_product(id).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::NotFound(Missing::Product(id)),
            other => other.into(),
        })?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
