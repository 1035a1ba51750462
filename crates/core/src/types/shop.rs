//! Merchant shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input does not end with `.myshopify.com`.
    #[error("shop domain must end with {suffix}")]
    MissingSuffix {
        /// Required suffix.
        suffix: &'static str,
    },
    /// The subdomain contains characters outside `[a-z0-9-]`, or is empty.
    #[error("invalid shop name: {0}")]
    InvalidShopName(String),
}

/// A Shopify merchant domain, e.g. `example-shop.myshopify.com`.
///
/// The only accepted shape is `^[a-z0-9-]+\.myshopify\.com$`. Parsing never
/// normalizes its input: uppercase letters, surrounding whitespace and
/// short names (`example-shop`) are all rejected, so callers that want
/// case-insensitive input must lowercase it first.
///
/// ## Examples
///
/// ```
/// use xmas_events_core::ShopDomain;
///
/// assert!(ShopDomain::is_valid("example-shop.myshopify.com"));
///
/// assert!(!ShopDomain::is_valid(""));
/// assert!(!ShopDomain::is_valid("example_shop.myshopify.com"));
/// assert!(!ShopDomain::is_valid("example.myshopify.com.evil.com"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Domain suffix every merchant domain carries.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, lacks the `.myshopify.com`
    /// suffix, or has a shop name outside `[a-z0-9-]+`.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        let name = s
            .strip_suffix(Self::SUFFIX)
            .ok_or(ShopDomainError::MissingSuffix {
                suffix: Self::SUFFIX,
            })?;

        let valid_name = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid_name {
            return Err(ShopDomainError::InvalidShopName(name.to_owned()));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns `true` if `s` is a well-formed merchant domain.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(domain: ShopDomain) -> Self {
        domain.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
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
    fn test_accepts_valid_domains() {
        assert!(ShopDomain::is_valid("example-shop.myshopify.com"));
        assert!(ShopDomain::is_valid("shop123.myshopify.com"));
        assert!(ShopDomain::is_valid("a.myshopify.com"));
        assert!(ShopDomain::is_valid("-.myshopify.com"));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(ShopDomain::parse(""), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_rejects_underscore() {
        assert!(matches!(
            ShopDomain::parse("example_shop.myshopify.com"),
            Err(ShopDomainError::InvalidShopName(_))
        ));
    }

    #[test]
    fn test_rejects_suffix_spoofing() {
        assert!(matches!(
            ShopDomain::parse("example.myshopify.com.evil.com"),
            Err(ShopDomainError::MissingSuffix { .. })
        ));
        assert!(!ShopDomain::is_valid("evil.com/example.myshopify.com"));
        assert!(!ShopDomain::is_valid("sub.example.myshopify.com"));
    }

    #[test]
    fn test_rejects_bare_suffix() {
        assert!(!ShopDomain::is_valid(".myshopify.com"));
        assert!(!ShopDomain::is_valid("myshopify.com"));
    }

    #[test]
    fn test_does_not_normalize() {
        assert!(!ShopDomain::is_valid("Example.myshopify.com"));
        assert!(!ShopDomain::is_valid(" example.myshopify.com"));
        assert!(!ShopDomain::is_valid("example"));
    }

    #[test]
    fn test_display() {
        let shop = ShopDomain::parse("example-shop.myshopify.com").unwrap();
        assert_eq!(shop.to_string(), "example-shop.myshopify.com");
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let parsed: Result<ShopDomain, _> = serde_json::from_str("\"bad_shop.myshopify.com\"");
        assert!(parsed.is_err());

        let shop: ShopDomain = serde_json::from_str("\"good.myshopify.com\"").unwrap();
        assert_eq!(serde_json::to_string(&shop).unwrap(), "\"good.myshopify.com\"");
    }
}
