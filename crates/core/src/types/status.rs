//! Status enums for accounts and orders.

use serde::{Deserialize, Serialize};

/// Whether an order has been paid for.
///
/// Persisted as the boolean `payment_status` column (`false` = unpaid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    /// Returns `true` for [`PaymentStatus::Paid`].
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl From<bool> for PaymentStatus {
    fn from(paid: bool) -> Self {
        if paid { Self::Paid } else { Self::Unpaid }
    }
}

impl From<PaymentStatus> for bool {
    fn from(status: PaymentStatus) -> Self {
        status.is_paid()
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Account role: shoppers versus staff who may edit the catalog.
///
/// Persisted as the boolean `is_staff` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Can browse, manage a cart and wishlist, and view orders.
    #[default]
    Customer,
    /// Can additionally create and edit categories and products.
    Staff,
}

impl AccountRole {
    /// Returns `true` for [`AccountRole::Staff`].
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Staff)
    }
}

impl From<bool> for AccountRole {
    fn from(is_staff: bool) -> Self {
        if is_staff { Self::Staff } else { Self::Customer }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("invalid account role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_bool_mapping() {
        assert_eq!(PaymentStatus::from(false), PaymentStatus::Unpaid);
        assert!(bool::from(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_account_role_parse() {
        assert_eq!("staff".parse::<AccountRole>(), Ok(AccountRole::Staff));
        assert!("owner".parse::<AccountRole>().is_err());
        assert!(AccountRole::from(true).is_staff());
    }
}
