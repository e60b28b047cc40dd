//! Persistence for the storefront.
//!
//! # Database: `storefront` schema
//!
//! ## Tables
//!
//! - `account` - Login identities (argon2id password hashes)
//! - `category`, `product` - The catalog
//! - `customer` - Shopping profile, one per account
//! - `cart_line`, `wishlist_line` - Unique per (customer, product)
//! - `customer_order`, `order_item`, `payment`, `shipment` - Orders and fulfillment records
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Deletes cascade the way the foreign keys say: account → customer →
//! {cart, wishlist, orders}; order → {items, payments, shipments};
//! category → products → {cart, wishlist, order items}.
//!
//! # Backends
//!
//! [`PgStore`] is the production backend. [`memory::MemoryStore`] keeps the
//! same tables in process, applies the same uniqueness and cascade rules, and
//! backs the test suites.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p corner-store-cli -- migrate
//! ```

mod accounts;
mod cart;
mod catalog;
mod customers;
pub mod memory;
mod orders;
mod wishlist;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use corner_store_core::{
    AccountId, AccountRole, CartLineId, CategoryId, CustomerId, OrderId, ProductId, Username,
    WishlistLineId,
};

use crate::models::{
    Account, CartItem, CartLine, Category, Customer, NewCategory, NewOrderItem, NewPayment,
    NewProduct, NewShipment, Order, OrderLine, Payment, Product, ProfileUpdate, Shipment,
    WishlistItem, WishlistLine,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation; carries the offending field name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Login accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert an account. `Conflict("username")` if the name is taken.
    async fn create_account(
        &self,
        username: &Username,
        password_hash: &str,
        role: AccountRole,
    ) -> Result<Account, RepositoryError>;

    /// Look up an account together with its password hash.
    async fn get_account_with_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Grant or revoke staff rights. `NotFound` for an unknown username.
    async fn set_account_role(
        &self,
        username: &Username,
        role: AccountRole,
    ) -> Result<Account, RepositoryError>;
}

/// Categories and products.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// `Conflict("name")` on a duplicate category name.
    async fn create_category(&self, category: &NewCategory) -> Result<Category, RepositoryError>;

    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// `NotFound` if absent, `Conflict("name")` on a duplicate name.
    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError>;

    /// Delete a category and, transitively, its products. `NotFound` if absent.
    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError>;

    /// `Conflict("sku")` on a duplicate SKU, `NotFound` if the category is gone.
    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// All products in insertion order.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError>;

    /// Delete a product and its cart, wishlist and order-item rows.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Customer profiles.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    async fn get_customer_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Return the account's customer, inserting an empty one on first use.
    async fn get_or_create_customer(
        &self,
        account_id: AccountId,
    ) -> Result<Customer, RepositoryError>;

    async fn update_customer(
        &self,
        id: CustomerId,
        update: &ProfileUpdate,
    ) -> Result<Customer, RepositoryError>;
}

/// Cart lines.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get_cart_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// `Conflict("cart_line")` if the pair already has a line.
    async fn insert_cart_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine, RepositoryError>;

    async fn set_cart_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, RepositoryError>;

    async fn delete_cart_line(&self, id: CartLineId) -> Result<(), RepositoryError>;

    /// Lines joined with products, oldest first.
    async fn list_cart(&self, customer_id: CustomerId) -> Result<Vec<CartItem>, RepositoryError>;
}

/// Wishlist lines.
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn get_wishlist_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<WishlistLine>, RepositoryError>;

    /// `Conflict("wishlist_line")` if the pair already has a line.
    async fn insert_wishlist_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<WishlistLine, RepositoryError>;

    async fn delete_wishlist_line(&self, id: WishlistLineId) -> Result<(), RepositoryError>;

    async fn list_wishlist(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<WishlistItem>, RepositoryError>;
}

/// Orders, payments and shipments.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order and its items atomically.
    async fn create_order(
        &self,
        customer_id: CustomerId,
        items: &[NewOrderItem],
        total: corner_store_core::Price,
    ) -> Result<Order, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Newest first.
    async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError>;

    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError>;

    async fn list_payments(&self, order_id: OrderId) -> Result<Vec<Payment>, RepositoryError>;

    async fn list_shipments(&self, order_id: OrderId) -> Result<Vec<Shipment>, RepositoryError>;

    async fn create_payment(&self, payment: &NewPayment) -> Result<Payment, RepositoryError>;

    async fn create_shipment(&self, shipment: &NewShipment) -> Result<Shipment, RepositoryError>;

    async fn mark_order_paid(&self, id: OrderId) -> Result<Order, RepositoryError>;
}

/// Every repository the storefront needs, behind one object.
#[async_trait]
pub trait Store:
    AccountRepository
    + CatalogRepository
    + CustomerRepository
    + CartRepository
    + WishlistRepository
    + OrderRepository
{
    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Translate a write failure into a repository error.
///
/// Unique violations become `Conflict` naming the field behind the
/// constraint; foreign key violations mean the parent row is gone.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("account_username_key") => "username",
                Some("category_name_key") => "name",
                Some("product_sku_key") => "sku",
                Some("cart_line_customer_product_key") => "cart_line",
                Some("wishlist_line_customer_product_key") => "wishlist_line",
                Some(other) => other,
                None => "unknown",
            };
            return RepositoryError::Conflict(field.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

/// Convert a non-negative database integer into a count.
fn to_count(value: i32, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {column}: {value}")))
}

/// Convert a count into a database integer.
fn to_db_count(value: u32, column: &str) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("{column} out of range: {value}")))
}
