//! Lenient deserializers for numeric and unit fields on stored records.
//!
//! Ledger documents accumulate over years of client versions; a single
//! malformed field must never make the whole partition unreadable, so
//! numeric fields coerce to zero and unit tags fall back to `UN`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::BaseUnit;

/// Coerce a JSON value into a `Decimal`, defaulting to zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else if let Some(u) = n.as_u64() {
                Decimal::from(u)
            } else {
                n.as_f64()
                    .and_then(Decimal::from_f64_retain)
                    .unwrap_or_default()
            }
        }
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

/// Deserialize a quantity or money field, coercing garbage to zero.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_decimal(&value))
}

/// Deserialize a stored unit tag, falling back to `UN` on anything unknown.
pub fn lenient_unit<'de, D>(deserializer: D) -> Result<BaseUnit, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => BaseUnit::parse_lenient(&s),
        _ => BaseUnit::Each,
    })
}
