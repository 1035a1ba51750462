//! Ticket pricing configuration.
//!
//! Pricing is stored as a JSON metafield on the shop. Merchants (or older
//! admin screens) write several slightly different shapes, so every read and
//! write goes through [`PricingConfig::normalize`], which always produces the
//! stable `version: 1` shape:
//!
//! ```json
//! {
//!   "version": 1,
//!   "currency": "EUR",
//!   "weekday": { "mode": "single", "prices": { "Normale": 12 } },
//!   "holiday": { "mode": "tiered", "prices": { "Intero": 15, "Bambino": 8 } }
//! }
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current schema version of the normalized pricing document.
pub const PRICING_VERSION: u32 = 1;

/// Currency used when the document does not name one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Price label used by single-price tables.
pub const SINGLE_PRICE_LABEL: &str = "Normale";

/// Ticket tiers recognized by tiered tables, in display order.
pub const TIER_LABELS: [&str; 3] = ["Intero", "Bambino", "Handicap"];

/// How a day type is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    /// One price for every visitor.
    #[default]
    Single,
    /// One price per ticket tier.
    Tiered,
}

/// Prices for one day type (weekday or holiday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Pricing mode.
    pub mode: PricingMode,
    /// Label to price.
    #[serde(serialize_with = "serialize_prices")]
    pub prices: BTreeMap<String, Decimal>,
}

/// Write whole prices as JSON integers (`12`) and the rest as floats (`12.5`).
fn serialize_prices<S>(prices: &BTreeMap<String, Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use rust_decimal::prelude::ToPrimitive;
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(prices.len()))?;
    for (label, price) in prices {
        let whole = price.fract().is_zero().then(|| price.to_i64()).flatten();
        match whole {
            Some(n) => map.serialize_entry(label, &n)?,
            None => map.serialize_entry(label, &price.to_f64().unwrap_or_default())?,
        }
    }
    map.end()
}

impl PriceTable {
    /// A single-price table.
    #[must_use]
    pub fn single(price: Decimal) -> Self {
        Self {
            mode: PricingMode::Single,
            prices: BTreeMap::from([(SINGLE_PRICE_LABEL.to_owned(), price)]),
        }
    }

    /// Normalize one side (`weekday` or `holiday`) of a raw document.
    ///
    /// Accepts the admin form (`single.price`, `price`, `tiered.<Tier>`) as
    /// well as an already normalized table (`prices.<Label>`).
    fn normalize(side: Option<&Value>) -> Self {
        let mode = match side.and_then(|s| s.get("mode")).and_then(Value::as_str) {
            Some("tiered") => PricingMode::Tiered,
            _ => PricingMode::Single,
        };

        match mode {
            PricingMode::Single => {
                let raw = side.and_then(|s| {
                    present(s.pointer("/single/price"))
                        .or_else(|| present(s.get("price")))
                        .or_else(|| present(s.pointer("/prices/Normale")))
                });
                let price = raw.map_or(Decimal::ZERO, |v| to_decimal(v).unwrap_or(Decimal::ZERO));
                Self::single(price)
            }
            PricingMode::Tiered => {
                let source = side.and_then(|s| present(s.get("tiered")).or_else(|| present(s.get("prices"))));

                let prices: BTreeMap<String, Decimal> = TIER_LABELS
                    .iter()
                    .filter_map(|label| {
                        let value = present(source.and_then(|src| src.get(*label)))?;
                        to_decimal(value).map(|price| ((*label).to_owned(), price))
                    })
                    .collect();

                if prices.is_empty() {
                    return Self::single(Decimal::ZERO);
                }

                Self {
                    mode: PricingMode::Tiered,
                    prices,
                }
            }
        }
    }
}

/// Normalized pricing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Schema version (always [`PRICING_VERSION`]).
    pub version: u32,
    /// ISO 4217 currency code, upper case.
    pub currency: String,
    /// Prices on regular days.
    pub weekday: PriceTable,
    /// Prices on weekends and holidays.
    pub holiday: PriceTable,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::normalize(&Value::Null)
    }
}

impl PricingConfig {
    /// Normalize an arbitrary JSON value into the stable pricing shape.
    ///
    /// Never fails: missing or malformed fields fall back to defaults.
    #[must_use]
    pub fn normalize(raw: &Value) -> Self {
        let currency = raw
            .get("currency")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase();

        Self {
            version: PRICING_VERSION,
            currency,
            weekday: PriceTable::normalize(raw.get("weekday")),
            holiday: PriceTable::normalize(raw.get("holiday")),
        }
    }

    /// Parse a stored metafield value and normalize it.
    ///
    /// A missing or unparsable value yields the default configuration.
    #[must_use]
    pub fn from_metafield(value: Option<&str>) -> Self {
        let raw = value
            .and_then(|v| serde_json::from_str::<Value>(v).ok())
            .unwrap_or(Value::Null);
        Self::normalize(&raw)
    }
}

/// Treat JSON `null` the same as a missing field.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Coerce a JSON number or numeric string to a decimal.
fn to_decimal(value: &Value) -> Option<Decimal> {
    let decimal = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(Decimal::ZERO)
            } else {
                trimmed.parse::<Decimal>().ok()
            }
        }
        _ => None,
    };
    decimal.map(|d| d.normalize())
}
