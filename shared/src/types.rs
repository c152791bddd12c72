//! Common quantity, unit and money types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Base unit a stock item is stored in.
///
/// Every quantity on a persisted transaction is expressed in the item's
/// base unit; display units only exist at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BaseUnit {
    #[serde(rename = "G")]
    Grams,
    #[serde(rename = "ML")]
    Millilitres,
    #[default]
    #[serde(rename = "UN")]
    Each,
}

impl BaseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseUnit::Grams => "G",
            BaseUnit::Millilitres => "ML",
            BaseUnit::Each => "UN",
        }
    }

    /// Parse a stored unit tag. Unknown or missing tags fall back to `UN`,
    /// matching the defensive posture of the valuation engine.
    pub fn parse_lenient(s: &str) -> BaseUnit {
        match s.trim().to_uppercase().as_str() {
            "G" => BaseUnit::Grams,
            "ML" => BaseUnit::Millilitres,
            _ => BaseUnit::Each,
        }
    }
}

/// Unit a quantity is entered in when authoring a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayUnit {
    #[serde(rename = "G")]
    Grams,
    #[serde(rename = "KG")]
    Kilograms,
    #[serde(rename = "ML")]
    Millilitres,
    #[serde(rename = "L")]
    Litres,
    #[serde(rename = "CUP")]
    Cup,
    #[serde(rename = "TBSP")]
    Tablespoon,
    #[serde(rename = "UN")]
    Each,
}

impl DisplayUnit {
    /// The base unit this display unit converts into.
    pub fn base(&self) -> BaseUnit {
        match self {
            DisplayUnit::Grams | DisplayUnit::Kilograms => BaseUnit::Grams,
            DisplayUnit::Millilitres
            | DisplayUnit::Litres
            | DisplayUnit::Cup
            | DisplayUnit::Tablespoon => BaseUnit::Millilitres,
            DisplayUnit::Each => BaseUnit::Each,
        }
    }

    /// Multiplier from this unit to its base unit.
    pub fn base_factor(&self) -> Decimal {
        match self {
            DisplayUnit::Grams | DisplayUnit::Millilitres | DisplayUnit::Each => Decimal::ONE,
            DisplayUnit::Kilograms | DisplayUnit::Litres => Decimal::from(1000),
            DisplayUnit::Cup => Decimal::from(240),
            DisplayUnit::Tablespoon => Decimal::from(15),
        }
    }

    /// Convert a quantity entered in this unit to the base unit.
    pub fn to_base(&self, qty: Decimal) -> Decimal {
        qty * self.base_factor()
    }

    /// Display units a client may offer for an item stored in `base`.
    pub fn options_for(base: BaseUnit) -> &'static [DisplayUnit] {
        match base {
            BaseUnit::Grams => &[DisplayUnit::Grams, DisplayUnit::Kilograms],
            BaseUnit::Millilitres => &[
                DisplayUnit::Millilitres,
                DisplayUnit::Litres,
                DisplayUnit::Cup,
                DisplayUnit::Tablespoon,
            ],
            BaseUnit::Each => &[DisplayUnit::Each],
        }
    }
}

/// Round a money amount to its two-decimal storage form.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}
