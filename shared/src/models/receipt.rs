//! Structured data extracted from a purchase receipt image

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers::{lenient_decimal, lenient_unit};
use crate::types::BaseUnit;

/// The extraction model's answer for one receipt image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Emission date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_receipt: Decimal,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
}

/// One extracted receipt line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReceiptItem {
    pub name: String,
    /// Number of packages bought.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub count: Decimal,
    /// Package size in the base unit; 1 for count-based items.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_size: Decimal,
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit: BaseUnit,
    /// Net line total paid.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
}

impl ReceiptItem {
    /// Purchased quantity in the item's base unit: `count` for unit-based
    /// items, `count × unit_size` otherwise.
    pub fn purchased_qty(&self) -> Decimal {
        match self.unit {
            BaseUnit::Each => self.count,
            BaseUnit::Grams | BaseUnit::Millilitres => self.count * self.unit_size,
        }
    }

    /// Line unit price; zero when the purchased quantity is zero.
    pub fn unit_price(&self) -> Decimal {
        let qty = self.purchased_qty();
        if qty > Decimal::ZERO {
            self.total / qty
        } else {
            Decimal::ZERO
        }
    }
}
