//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Account creation and password login
//! - `catalog` - Categories and products (staff writes, public reads)
//! - `cart` - Per-customer cart lines
//! - `wishlist` - Per-customer saved products
//! - `orders` - Checkout view, order pages, administrative order records
//! - `profile` - Customer profile lookup and edits
//!
//! Services borrow the [`Store`] for the length of a request and return
//! [`ServiceError`], which route handlers convert into `AppError`.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod profile;
pub mod wishlist;

use std::fmt;

use thiserror::Error;

use corner_store_core::{AccountId, CategoryId, CustomerId, OrderId, ProductId};

use crate::db::{CustomerRepository, RepositoryError, Store};
use crate::forms::FieldErrors;
use crate::models::Customer;

pub use auth::{AuthError, AuthService};
pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use profile::ProfileService;
pub use wishlist::WishlistService;

/// The entity a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// The account has no customer profile yet.
    Customer,
    /// A customer id given to an administrative command.
    CustomerId(CustomerId),
    Product(ProductId),
    Category(CategoryId),
    Order(OrderId),
    /// The product is not in the customer's cart.
    CartLine(ProductId),
    /// The product is not in the customer's wishlist.
    WishlistLine(ProductId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer profile"),
            Self::CustomerId(id) => write!(f, "customer {id}"),
            Self::Product(id) => write!(f, "product {id}"),
            Self::Category(id) => write!(f, "category {id}"),
            Self::Order(id) => write!(f, "order {id}"),
            Self::CartLine(id) => write!(f, "cart line for product {id}"),
            Self::WishlistLine(id) => write!(f, "wishlist line for product {id}"),
        }
    }
}

/// Errors returned by the domain services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation; carries field-level messages.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("not found: {0}")]
    NotFound(Missing),

    /// The operation would duplicate an existing row.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Resolve the customer profile behind an account.
///
/// # Errors
///
/// Returns `NotFound(Missing::Customer)` if the profile was never created.
pub(crate) async fn customer_for_account(
    store: &dyn Store,
    account_id: AccountId,
) -> Result<Customer, ServiceError> {
    store
        .get_customer_by_account(account_id)
        .await?
        .ok_or(ServiceError::NotFound(Missing::Customer))
}
