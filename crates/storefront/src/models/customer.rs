//! Customer profiles.

use serde::Serialize;

use corner_store_core::{AccountId, CustomerId};

/// Shopping profile attached one-to-one to an account.
///
/// Cart lines, wishlist lines and orders all hang off the customer, not the
/// account.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub account_id: AccountId,
    pub phone: Option<String>,
    pub address: String,
}

/// Validated profile edits.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub phone: Option<String>,
    pub address: String,
}
