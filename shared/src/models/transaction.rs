//! The ledger transaction entity
//!
//! Every persisted business event is one `Transaction` document in the
//! owner's partition. The `type` tag on the wire selects one of a closed
//! set of variants; valuation and cascade logic match exhaustively on
//! them rather than probing optional fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::recipe::RecipeCard;
use super::serde_helpers::{lenient_decimal, lenient_unit};
use crate::types::BaseUnit;

/// Prefix marking a sale summary record, excluded from valuation.
pub const SALE_SUMMARY_PREFIX: &str = "VENDA:";

/// Prefix marking a waste summary record, excluded from valuation.
pub const WASTE_SUMMARY_PREFIX: &str = "DESP:";

/// One persisted ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Timestamp-derived id, unique within the owner partition.
    /// Empty until first saved.
    #[serde(default)]
    pub id: String,
    /// Partition key (the owner's email). Stamped on save.
    #[serde(default)]
    pub user_id: String,
    /// Business date as entered or imported (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Back-reference from a usage record to its sale summary.
    /// Strong ownership: cascade delete follows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_sale_id: Option<String>,
    /// Back-reference from a usage record to its waste summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_waste_id: Option<String>,
    #[serde(flatten)]
    pub body: TxBody,
}

/// Type-specific payload, tagged by the wire field `type`.
///
/// Tag values are kept verbatim for compatibility with the seeded store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TxBody {
    #[serde(rename = "compra")]
    Purchase(StockEntry),
    #[serde(rename = "ajuste_manual")]
    Adjustment(StockEntry),
    /// Legacy direct sale of a raw item, kept for replay of old partitions.
    #[serde(rename = "venda")]
    DirectSale(StockEntry),
    #[serde(rename = "venda_produto")]
    ProductSale(ProductSale),
    #[serde(rename = "desperdicio")]
    Waste(WasteEntry),
    #[serde(rename = "uso_receita")]
    RecipeUsage(UsageEntry),
    #[serde(rename = "uso_receita_negativo")]
    RecipeUsageNegative(UsageEntry),
    #[serde(rename = "receita_produto")]
    Recipe(RecipeCard),
}

/// Stock movement with a cost: purchases, manual adjustments and legacy
/// direct sales share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StockEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Decimal,
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit_measure: BaseUnit,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

/// Summary record of a finished-product sale. Carries no direct stock
/// effect; the per-ingredient usage records do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductSale {
    /// `VENDA:`-prefixed display label.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_channel: Option<String>,
}

/// Waste of a raw item or finished product.
///
/// Summary rows carry a `DESP:`-prefixed description plus `waste_item` and
/// `waste_reason`; the cascaded stock-deduction row carries the plain item
/// name and no reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WasteEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Decimal,
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit_measure: BaseUnit,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub lost_revenue: Decimal,
}

/// Per-ingredient stock deduction generated by a sale or waste cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UsageEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Decimal,
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit_measure: BaseUnit,
    /// Always zero; the cost effect is priced at the running average.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
}

/// Discriminant of a transaction, used for filtering and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Purchase,
    Adjustment,
    DirectSale,
    ProductSale,
    Waste,
    RecipeUsage,
    RecipeUsageNegative,
    Recipe,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Purchase => "compra",
            TxKind::Adjustment => "ajuste_manual",
            TxKind::DirectSale => "venda",
            TxKind::ProductSale => "venda_produto",
            TxKind::Waste => "desperdicio",
            TxKind::RecipeUsage => "uso_receita",
            TxKind::RecipeUsageNegative => "uso_receita_negativo",
            TxKind::Recipe => "receita_produto",
        }
    }

    /// Kinds that add quantity and invested cost to a position.
    pub fn increases_stock(&self) -> bool {
        matches!(self, TxKind::Purchase | TxKind::Adjustment)
    }

    /// Kinds that remove quantity at the running average cost.
    pub fn decreases_stock(&self) -> bool {
        matches!(
            self,
            TxKind::DirectSale
                | TxKind::ProductSale
                | TxKind::Waste
                | TxKind::RecipeUsage
                | TxKind::RecipeUsageNegative
        )
    }

    pub fn affects_stock(&self) -> bool {
        self.increases_stock() || self.decreases_stock()
    }
}

impl TxBody {
    pub fn kind(&self) -> TxKind {
        match self {
            TxBody::Purchase(_) => TxKind::Purchase,
            TxBody::Adjustment(_) => TxKind::Adjustment,
            TxBody::DirectSale(_) => TxKind::DirectSale,
            TxBody::ProductSale(_) => TxKind::ProductSale,
            TxBody::Waste(_) => TxKind::Waste,
            TxBody::RecipeUsage(_) => TxKind::RecipeUsage,
            TxBody::RecipeUsageNegative(_) => TxKind::RecipeUsageNegative,
            TxBody::Recipe(_) => TxKind::Recipe,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            TxBody::Purchase(e) | TxBody::Adjustment(e) | TxBody::DirectSale(e) => &e.description,
            TxBody::ProductSale(s) => &s.description,
            TxBody::Waste(w) => &w.description,
            TxBody::RecipeUsage(u) | TxBody::RecipeUsageNegative(u) => &u.description,
            TxBody::Recipe(r) => &r.description,
        }
    }

    pub fn description_mut(&mut self) -> &mut String {
        match self {
            TxBody::Purchase(e) | TxBody::Adjustment(e) | TxBody::DirectSale(e) => {
                &mut e.description
            }
            TxBody::ProductSale(s) => &mut s.description,
            TxBody::Waste(w) => &mut w.description,
            TxBody::RecipeUsage(u) | TxBody::RecipeUsageNegative(u) => &mut u.description,
            TxBody::Recipe(r) => &mut r.description,
        }
    }

    /// Signed-magnitude quantity moved by this record. Recipes move nothing.
    pub fn qty(&self) -> Decimal {
        match self {
            TxBody::Purchase(e) | TxBody::Adjustment(e) | TxBody::DirectSale(e) => e.qty,
            TxBody::ProductSale(s) => s.qty,
            TxBody::Waste(w) => w.qty,
            TxBody::RecipeUsage(u) | TxBody::RecipeUsageNegative(u) => u.qty,
            TxBody::Recipe(_) => Decimal::ZERO,
        }
    }

    /// Money total carried by this record.
    pub fn total(&self) -> Decimal {
        match self {
            TxBody::Purchase(e) | TxBody::Adjustment(e) | TxBody::DirectSale(e) => e.total,
            TxBody::ProductSale(s) => s.total,
            TxBody::Waste(w) => w.total,
            TxBody::RecipeUsage(u) | TxBody::RecipeUsageNegative(u) => u.total,
            TxBody::Recipe(_) => Decimal::ZERO,
        }
    }

    pub fn unit_measure(&self) -> BaseUnit {
        match self {
            TxBody::Purchase(e) | TxBody::Adjustment(e) | TxBody::DirectSale(e) => e.unit_measure,
            TxBody::ProductSale(_) => BaseUnit::Each,
            TxBody::Waste(w) => w.unit_measure,
            TxBody::RecipeUsage(u) | TxBody::RecipeUsageNegative(u) => u.unit_measure,
            TxBody::Recipe(_) => BaseUnit::Each,
        }
    }

    pub fn set_unit_measure(&mut self, unit: BaseUnit) {
        match self {
            TxBody::Purchase(e) | TxBody::Adjustment(e) | TxBody::DirectSale(e) => {
                e.unit_measure = unit
            }
            TxBody::Waste(w) => w.unit_measure = unit,
            TxBody::RecipeUsage(u) | TxBody::RecipeUsageNegative(u) => u.unit_measure = unit,
            TxBody::ProductSale(_) | TxBody::Recipe(_) => {}
        }
    }
}

impl Transaction {
    /// An unsaved transaction; Ledger Access assigns id and timestamps.
    pub fn new(body: TxBody) -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            date: None,
            created_at: None,
            last_updated: None,
            related_sale_id: None,
            related_waste_id: None,
            body,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn kind(&self) -> TxKind {
        self.body.kind()
    }

    /// The stock-item key this record is aggregated under: the normalized
    /// description, falling back to the product name for legacy sale rows
    /// that were stored without one.
    pub fn stock_item_name(&self) -> &str {
        let description = self.body.description();
        if description.is_empty() {
            if let TxBody::ProductSale(s) = &self.body {
                return &s.product_name;
            }
        }
        description
    }

    /// Whether this record is a sale or waste display summary. Summaries
    /// are skipped by valuation; their stock effect lives in the linked
    /// usage records.
    pub fn is_summary_record(&self) -> bool {
        let name = self.stock_item_name();
        name.starts_with(SALE_SUMMARY_PREFIX) || name.starts_with(WASTE_SUMMARY_PREFIX)
    }

    /// Trim and uppercase the description, the canonical stored form.
    pub fn normalize_description(&mut self) {
        let description = self.body.description_mut();
        let normalized = description.trim().to_uppercase();
        *description = normalized;
    }
}
