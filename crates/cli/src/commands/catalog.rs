//! Catalog maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! # Load categories and products from YAML (safe to re-run)
//! cs-cli catalog seed -f catalog.yaml
//!
//! # Delete a category together with its products
//! cs-cli catalog delete-category 3
//! ```
//!
//! # File Format
//!
//! ```yaml
//! categories:
//!   - name: Produce
//!     description: Fresh fruit and vegetables
//!     products:
//!       - sku: PRD-APPLE
//!         name: Apple
//!         description: Crisp and sweet.
//!         price: "0.75"
//!         stock: 120
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use corner_store_core::CategoryId;
use corner_store_storefront::forms::{CategoryForm, ProductForm};
use corner_store_storefront::media;
use corner_store_storefront::models::Category;
use corner_store_storefront::services::{CatalogService, ServiceError};

use super::{CommandError, media_dir, store};

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Kept as a string so `1.10` is not read as a float.
    pub price: String,
    #[serde(default)]
    pub stock: u32,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub categories_created: usize,
    pub products_created: usize,
    /// Products whose SKU already existed.
    pub skipped: usize,
    /// `(sku, message)` for products that failed validation.
    pub errors: Vec<(String, String)>,
}

/// Parse a seed file's contents.
///
/// # Errors
///
/// Returns an error if the YAML does not match [`CatalogFile`].
pub fn parse(content: &str) -> Result<CatalogFile, CommandError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Seed categories and products from a YAML file.
///
/// Existing categories (by name) are reused and existing SKUs are skipped, so
/// the same file can be loaded twice.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a category is
/// invalid, or the database fails.
pub async fn seed(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let file = parse(&content)?;
    info!(categories = file.categories.len(), "Parsed catalog");

    let store = store().await?;
    let result = seed_catalog(&CatalogService::new(&store), &file).await?;

    info!("Seeding complete!");
    info!("  Categories created: {}", result.categories_created);
    info!("  Products created: {}", result.products_created);
    info!("  Products skipped (SKU exists): {}", result.skipped);

    if !result.errors.is_empty() {
        error!("  Errors: {}", result.errors.len());
        for (sku, err) in &result.errors {
            error!("    - {sku}: {err}");
        }
    }

    Ok(())
}

/// Apply a parsed catalog through the catalog service.
///
/// # Errors
///
/// Returns an error if a category is invalid or the store fails. Invalid
/// products are collected in [`SeedResult::errors`] instead.
pub async fn seed_catalog(
    catalog: &CatalogService<'_>,
    file: &CatalogFile,
) -> Result<SeedResult, CommandError> {
    let mut result = SeedResult::default();
    let mut existing = catalog.list_categories().await?;

    for seed in &file.categories {
        let category = match find_category(&existing, &seed.name) {
            Some(category) => category.clone(),
            None => {
                let form = CategoryForm {
                    name: seed.name.clone(),
                    description: seed.description.clone(),
                };
                let category = catalog.create_category(&form).await?;
                result.categories_created += 1;
                existing.push(category.clone());
                category
            }
        };

        for product in &seed.products {
            let form = ProductForm {
                sku: product.sku.clone(),
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price.clone(),
                stock: product.stock.to_string(),
                category: category.id.to_string(),
            };
            match catalog.create_product(&form, None).await {
                Ok(_) => result.products_created += 1,
                Err(ServiceError::Validation(errors)) if is_duplicate_sku(&errors) => {
                    result.skipped += 1;
                }
                Err(ServiceError::Validation(errors)) => {
                    warn!(sku = %product.sku, %errors, "Skipping invalid product");
                    result.errors.push((product.sku.clone(), errors.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(result)
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let name = name.trim();
    categories.iter().find(|c| c.name == name)
}

fn is_duplicate_sku(errors: &corner_store_storefront::forms::FieldErrors) -> bool {
    errors.first("sku") == Some(corner_store_storefront::services::catalog::DUPLICATE_SKU)
}

/// Delete a category and, through the cascade, its products and every cart,
/// wishlist and order line that references them. Product images are removed
/// from `STOREFRONT_MEDIA_DIR`.
///
/// # Errors
///
/// Returns an error if the category does not exist.
pub async fn delete_category(id: CategoryId) -> Result<(), CommandError> {
    let store = store().await?;
    let catalog = CatalogService::new(&store);

    let category = catalog.get_category(id).await?;
    warn!(
        category_id = %category.id,
        name = %category.name,
        "Deleting category with all of its products"
    );
    let images = catalog.delete_category(id).await?;

    let media = media_dir();
    for image in &images {
        media::remove_product_image(&media, image).await;
    }

    info!(images_removed = images.len(), "Category deleted.");
    Ok(())
}
