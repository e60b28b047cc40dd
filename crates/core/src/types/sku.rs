//! Stock keeping unit codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkuError {
    /// The input string is empty (after trimming).
    #[error("SKU cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("SKU must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("SKU cannot contain whitespace")]
    ContainsWhitespace,
}

/// A product SKU.
///
/// SKUs are unique across the catalog; uniqueness itself is enforced by the
/// store, this type only checks the shape.
///
/// ## Constraints
///
/// - Length: 1-255 characters after trimming surrounding whitespace
/// - No interior whitespace
///
/// ## Examples
///
/// ```
/// use corner_store_core::Sku;
///
/// assert_eq!(Sku::parse(" TEA-001 ").unwrap().as_str(), "TEA-001");
/// assert!(Sku::parse("").is_err());
/// assert!(Sku::parse("TEA 001").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    /// Maximum length of a SKU (`VARCHAR(255)`).
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `Sku` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 255
    /// characters, or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, SkuError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SkuError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(SkuError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(SkuError::ContainsWhitespace);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Sku` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Sku {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Sku {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Sku {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let sku = Sku::parse("  JAM-12\n").unwrap();
        assert_eq!(sku.as_str(), "JAM-12");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Sku::parse("   "), Err(SkuError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "A".repeat(256);
        assert!(matches!(Sku::parse(&long), Err(SkuError::TooLong { .. })));
        assert!(Sku::parse(&"A".repeat(255)).is_ok());
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(Sku::parse("JAM 12"), Err(SkuError::ContainsWhitespace));
    }

    #[test]
    fn test_display() {
        let sku = Sku::parse("OIL-1L").unwrap();
        assert_eq!(format!("{sku}"), "OIL-1L");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Sku>("\"JAM 12\"").is_err());
        let sku: Sku = serde_json::from_str("\" JAM-12 \"").unwrap();
        assert_eq!(serde_json::to_string(&sku).unwrap(), "\"JAM-12\"");
    }
}
