//! Fixed-point prices.
//!
//! Prices are stored as `NUMERIC(10, 2)`: at most ten significant digits, two
//! of them after the decimal point, never negative.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("enter a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// More than two digits after the decimal point.
    #[error("ensure that there are no more than {max} decimal places")]
    TooManyDecimalPlaces {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The amount does not fit in `NUMERIC(10, 2)`.
    #[error("ensure that there are no more than {max} digits in total")]
    TooManyDigits {
        /// Maximum allowed digits.
        max: u32,
    },
}

/// A non-negative monetary amount with exactly two decimal places.
///
/// ## Examples
///
/// ```
/// use corner_store_core::Price;
///
/// let price = Price::parse("19.9").unwrap();
/// assert_eq!(price.to_string(), "$19.90");
///
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("1.999").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Digits after the decimal point.
    pub const SCALE: u32 = 2;

    /// Total significant digits (`max_digits`).
    pub const MAX_DIGITS: u32 = 10;

    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a `Price` from user input such as `"12.5"` or `"3"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, negative, has more
    /// than two decimal places, or has more than ten digits in total.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount: Decimal = trimmed.parse().map_err(|_| PriceError::NotANumber)?;
        Self::from_decimal(amount)
    }

    /// Build a `Price` from a decimal amount, enforcing the column constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or does not fit `NUMERIC(10, 2)`.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(PriceError::TooManyDecimalPlaces { max: Self::SCALE });
        }

        let mut fixed = normalized;
        fixed.rescale(Self::SCALE);
        if fixed.mantissa().unsigned_abs().to_string().len() > Self::MAX_DIGITS as usize {
            return Err(PriceError::TooManyDigits {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(fixed))
    }

    /// Build a `Price` from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), Self::SCALE))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_decimal(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pads_to_two_places() {
        let price = Price::parse("3").unwrap();
        assert_eq!(price.amount().scale(), 2);
        assert_eq!(price.to_string(), "$3.00");
    }

    #[test]
    fn test_parse_accepts_trailing_zeros() {
        let price = Price::parse("4.500").unwrap();
        assert_eq!(price, Price::from_cents(450));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Price::parse("  "), Err(PriceError::Empty));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Price::parse("twelve"), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_too_many_decimal_places() {
        assert!(matches!(
            Price::parse("0.125"),
            Err(PriceError::TooManyDecimalPlaces { max: 2 })
        ));
    }

    #[test]
    fn test_parse_too_many_digits() {
        assert!(Price::parse("99999999.99").is_ok());
        assert!(matches!(
            Price::parse("100000000.00"),
            Err(PriceError::TooManyDigits { max: 10 })
        ));
    }

    #[test]
    fn test_times() {
        let price = Price::from_cents(250);
        assert_eq!(price.times(3), Decimal::new(750, 2));
    }

    #[test]
    fn test_serde_uses_string_amount() {
        let price = Price::from_cents(1999);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"19.99\"");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Price>("\"-5.12\"").is_err());
        assert!(serde_json::from_str::<Price>("\"5.123\"").is_err());
        let price: Price = serde_json::from_str("\"5.1\"").unwrap();
        assert_eq!(price, Price::from_cents(510));
    }
}
