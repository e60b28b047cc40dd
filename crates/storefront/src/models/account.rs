//! Login accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corner_store_core::{AccountId, AccountRole, Username};

/// A storefront login identity.
///
/// The password hash is never part of this struct; it is only read by the
/// authentication service when verifying credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Whether this account may edit the catalog.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
