//! Derived inventory types
//!
//! Positions are never persisted; they are recomputed from the full
//! transaction list on every read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::BaseUnit;

/// Current state of one stock item, derived from its transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPosition {
    /// Normalized item name, the aggregation key.
    pub item: String,
    pub unit: BaseUnit,
    pub quantity: Decimal,
    /// Weighted-average unit cost (total invested cost / quantity).
    pub average_cost: Decimal,
    /// `quantity × average_cost`.
    pub total_value: Decimal,
}

/// Which slice of the computed positions a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockView {
    /// Every item, including zero and negative stock.
    Full,
    /// Items with provenance in at least one purchase or manual
    /// adjustment, i.e. true raw ingredients.
    Manageable,
    /// Manageable items with nonzero stock; the default stock table.
    #[default]
    Display,
}
