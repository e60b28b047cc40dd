//! Wishlist lines.

use chrono::{DateTime, Utc};
use serde::Serialize;

use corner_store_core::{CustomerId, ProductId, WishlistLineId};

use super::Product;

/// One saved product. At most one per (customer, product).
#[derive(Debug, Clone, Serialize)]
pub struct WishlistLine {
    pub id: WishlistLineId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
}

/// A wishlist line joined with its product, for display.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub line: WishlistLine,
    pub product: Product,
}
