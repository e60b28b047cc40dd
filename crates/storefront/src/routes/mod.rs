//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET/POST /                              - Login form / submit
//! GET/POST /logout/                       - End session
//! GET      /index/                        - Landing page
//!
//! # Catalog (public reads)
//! GET      /products/                     - Product listing
//! GET      /category-list/                - Category listing
//!
//! # Cart & wishlist (customer)
//! GET/POST /add-to-cart/{product_id}/     - Add one unit
//! GET/POST /remove-from-cart/{product_id}/ - Remove the line
//! GET      /cart/                         - Cart page
//! GET/POST /add-to-wishlist/{product_id}/ - Save product
//! GET/POST /remove-from-wishlist/{product_id}/ - Unsave product
//! GET      /wishlist/                     - Wishlist page
//!
//! # Orders (customer)
//! GET      /checkout/                     - Read-only confirmation
//! GET      /order/{order_id}/             - Order detail
//!
//! # Profile (customer)
//! GET/POST /profile/                      - View (created on first visit) / update
//!
//! # Catalog management (staff)
//! GET/POST /add-product/                  - Create product (multipart)
//! GET/POST /edit-product/{product_id}/    - Edit product (multipart)
//! POST     /delete-product/{product_id}/  - Delete product
//! GET/POST /add-category/                 - Create category
//! GET/POST /edit-category/{category_id}/  - Edit category
//! POST     /delete-category/{category_id}/ - Delete category
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod home;
pub mod orders;
pub mod products;
pub mod profile;
pub mod wishlist;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Largest accepted product form, image included.
const PRODUCT_FORM_BODY_LIMIT: usize = 5 * 1024 * 1024;

// =============================================================================
// Flash Messages
// =============================================================================

/// Query parameters for error/success display after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    /// Id of a product just added to the cart. Only the cart page reads it.
    pub added: Option<String>,
}

impl MessageQuery {
    /// Text for a known `?error=` code. Unknown codes show nothing.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let text = match self.error.as_deref()? {
            "profile_required" => "You need to create a customer profile first.",
            "session" => "Could not start your session. Please try again.",
            _ => return None,
        };
        Some(text.to_string())
    }

    /// Text for a known `?success=` code. Unknown codes show nothing.
    #[must_use]
    pub fn success_message(&self) -> Option<String> {
        let text = match self.success.as_deref()? {
            "logged_in" => "Login successful!",
            "logged_out" => "You have been logged out.",
            "product_added" => "Product added successfully!",
            "product_updated" => "Product updated successfully!",
            "product_deleted" => "Product deleted.",
            "category_added" => "Category added successfully!",
            "category_updated" => "Category updated successfully!",
            "category_deleted" => "Category deleted.",
            "profile_updated" => "Profile updated.",
            _ => return None,
        };
        Some(text.to_string())
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router, rate limited when a limiter is given.
pub fn auth_routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let login = Router::new().route("/", get(auth::login_page).post(auth::login));
    let login = match limiter {
        Some(layer) => login.layer(layer),
        None => login,
    };
    login.route("/logout/", get(auth::logout).post(auth::logout))
}

/// Create the cart, wishlist and order routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/add-to-cart/{product_id}/",
            get(cart::add).post(cart::add),
        )
        .route(
            "/remove-from-cart/{product_id}/",
            get(cart::remove).post(cart::remove),
        )
        .route("/cart/", get(cart::show))
        .route(
            "/add-to-wishlist/{product_id}/",
            get(wishlist::add).post(wishlist::add),
        )
        .route(
            "/remove-from-wishlist/{product_id}/",
            get(wishlist::remove).post(wishlist::remove),
        )
        .route("/wishlist/", get(wishlist::show))
        .route("/checkout/", get(orders::checkout))
        .route("/order/{order_id}/", get(orders::show))
        .route("/profile/", get(profile::show).post(profile::update))
}

/// Create the staff catalog management router.
pub fn catalog_routes() -> Router<AppState> {
    let products = Router::new()
        .route(
            "/add-product/",
            get(catalog::add_product_page).post(catalog::add_product),
        )
        .route(
            "/edit-product/{product_id}/",
            get(catalog::edit_product_page).post(catalog::edit_product),
        )
        .layer(DefaultBodyLimit::max(PRODUCT_FORM_BODY_LIMIT));

    Router::new()
        .merge(products)
        .route(
            "/delete-product/{product_id}/",
            post(catalog::delete_product),
        )
        .route(
            "/add-category/",
            get(catalog::add_category_page).post(catalog::add_category),
        )
        .route(
            "/edit-category/{category_id}/",
            get(catalog::edit_category_page).post(catalog::edit_category),
        )
        .route(
            "/delete-category/{category_id}/",
            post(catalog::delete_category),
        )
}

/// Create all routes for the storefront.
pub fn routes(auth_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    Router::new()
        .merge(auth_routes(auth_limiter))
        .route("/index/", get(home::index))
        .route("/products/", get(products::index))
        .route("/category-list/", get(catalog::category_list))
        .merge(customer_routes())
        .merge(catalog_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let query = MessageQuery {
            error: Some("profile_required".to_string()),
            success: Some("logged_out".to_string()),
            added: None,
        };
        assert_eq!(
            query.error_message().as_deref(),
            Some("You need to create a customer profile first.")
        );
        assert_eq!(
            query.success_message().as_deref(),
            Some("You have been logged out.")
        );
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let query = MessageQuery {
            error: Some("<script>".to_string()),
            success: Some("whatever".to_string()),
            added: None,
        };
        assert!(query.error_message().is_none());
        assert!(query.success_message().is_none());
    }

    #[test]
    fn test_added_is_not_free_text() {
        let query = MessageQuery {
            added: Some("Your account is locked.".to_string()),
            ..MessageQuery::default()
        };
        assert!(query.success_message().is_none());
    }
}
