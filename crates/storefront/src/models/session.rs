//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use corner_store_core::AccountId;

use super::Account;

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the logged-in account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    /// Account's database ID.
    pub id: AccountId,
    /// Login name, shown in the navigation bar.
    pub username: String,
    /// Whether staff-only catalog pages are available.
    pub is_staff: bool,
}

impl From<&Account> for CurrentAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.to_string(),
            is_staff: account.is_staff(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in account.
    pub const CURRENT_ACCOUNT: &str = "current_account";
}
