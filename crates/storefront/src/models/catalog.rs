//! Categories and products.

use serde::Serialize;

use corner_store_core::{CategoryId, Price, ProductId, Sku};

/// Image shown for products without an uploaded picture.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.svg";

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// Validated input for creating or replacing a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: Sku,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
    pub category_id: CategoryId,
    /// Path relative to the media directory, e.g. `products/3f2a.jpg`.
    pub image: Option<String>,
}

impl Product {
    /// URL of the product image, falling back to the placeholder.
    #[must_use]
    pub fn image_url(&self) -> String {
        self.image.as_ref().map_or_else(
            || PLACEHOLDER_IMAGE.to_owned(),
            |path| format!("/media/{path}"),
        )
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Validated input for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: Sku,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
    pub category_id: CategoryId,
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(image: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            sku: Sku::parse("TEA-1").unwrap(),
            name: "Green tea".to_owned(),
            description: "Loose leaf".to_owned(),
            price: Price::from_cents(450),
            stock: 0,
            category_id: CategoryId::new(1),
            image: image.map(str::to_owned),
        }
    }

    #[test]
    fn test_image_url_uses_media_path() {
        assert_eq!(
            product(Some("products/a.jpg")).image_url(),
            "/media/products/a.jpg"
        );
    }

    #[test]
    fn test_image_url_placeholder() {
        assert_eq!(product(None).image_url(), PLACEHOLDER_IMAGE);
        assert!(!product(None).in_stock());
    }
}
