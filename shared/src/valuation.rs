//! Inventory valuation engine
//!
//! Pure recomputation of per-item positions from the full transaction
//! list of one owner. Nothing here performs I/O and nothing raises on a
//! malformed record; this function is the source of truth any future
//! incremental aggregate must be checked against.
//!
//! Costing model is weighted average only: cost enters with purchases and
//! adjustments, and leaves with decreasing records priced at the running
//! average, not at their original purchase price.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::models::{InventoryPosition, StockView, Transaction};
use crate::types::BaseUnit;

/// Aggregation key used when a record carries no usable name.
const UNKNOWN_ITEM: &str = "UNKNOWN";

#[derive(Debug)]
struct ItemAccumulator {
    qty: Decimal,
    cost_total: Decimal,
    avg_cost: Decimal,
    unit: BaseUnit,
}

impl ItemAccumulator {
    fn new(unit: BaseUnit) -> Self {
        Self {
            qty: Decimal::ZERO,
            cost_total: Decimal::ZERO,
            avg_cost: Decimal::ZERO,
            unit,
        }
    }
}

/// Recompute every position from scratch.
///
/// Transactions are replayed in id order (ids are timestamp-derived, so
/// this is chronological). Summary records and non-stock-affecting kinds
/// are discarded; items with zero quantity are emitted only when
/// `include_zero_stock` is set.
pub fn positions(transactions: &[Transaction], include_zero_stock: bool) -> Vec<InventoryPosition> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));

    let mut stock: BTreeMap<String, ItemAccumulator> = BTreeMap::new();

    for tx in ordered {
        if tx.is_summary_record() {
            continue;
        }
        let kind = tx.kind();
        if !kind.affects_stock() {
            continue;
        }

        let name = tx.stock_item_name();
        let key = if name.is_empty() {
            UNKNOWN_ITEM.to_string()
        } else {
            name.to_string()
        };

        let qty = tx.body.qty();
        let total = tx.body.total();

        let entry = stock
            .entry(key)
            .or_insert_with(|| ItemAccumulator::new(tx.body.unit_measure()));

        if kind.increases_stock() {
            entry.qty += qty;
            entry.cost_total += total;
        } else {
            entry.qty -= qty;
            // Cost leaves at the running average, never the original price.
            if entry.avg_cost > Decimal::ZERO {
                entry.cost_total -= qty * entry.avg_cost;
            }
        }

        // The average is only well-defined while stock is positive; at or
        // below zero the last known value is retained so a later increase
        // has a reference point.
        if entry.qty > Decimal::ZERO {
            entry.avg_cost = entry.cost_total / entry.qty;
        }
    }

    stock
        .into_iter()
        .filter(|(_, acc)| include_zero_stock || acc.qty != Decimal::ZERO)
        .map(|(item, acc)| InventoryPosition {
            item,
            unit: acc.unit,
            quantity: acc.qty,
            average_cost: acc.avg_cost,
            total_value: acc.qty * acc.avg_cost,
        })
        .collect()
}

/// Names with provenance in at least one purchase or manual adjustment —
/// the items a user actually manages, as opposed to derived labels.
pub fn manageable_names(transactions: &[Transaction]) -> BTreeSet<String> {
    transactions
        .iter()
        .filter(|tx| tx.kind().increases_stock())
        .map(|tx| tx.stock_item_name().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Compute the positions slice a caller asked for.
pub fn view(transactions: &[Transaction], which: StockView) -> Vec<InventoryPosition> {
    match which {
        StockView::Full => positions(transactions, true),
        StockView::Manageable => {
            let names = manageable_names(transactions);
            positions(transactions, true)
                .into_iter()
                .filter(|p| names.contains(&p.item))
                .collect()
        }
        StockView::Display => {
            let names = manageable_names(transactions);
            positions(transactions, false)
                .into_iter()
                .filter(|p| names.contains(&p.item))
                .collect()
        }
    }
}

/// Find one item's position in the full view.
pub fn position_of<'a>(
    positions: &'a [InventoryPosition],
    item: &str,
) -> Option<&'a InventoryPosition> {
    positions.iter().find(|p| p.item == item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductSale, StockEntry, TxBody, UsageEntry, WasteEntry};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn purchase(id: &str, item: &str, qty: &str, total: &str) -> Transaction {
        Transaction::new(TxBody::Purchase(StockEntry {
            description: item.into(),
            qty: dec(qty),
            unit_measure: BaseUnit::Millilitres,
            unit_price: Decimal::ZERO,
            total: dec(total),
            store: None,
        }))
        .with_id(id)
    }

    fn usage(id: &str, item: &str, qty: &str) -> Transaction {
        Transaction::new(TxBody::RecipeUsage(UsageEntry {
            description: item.into(),
            qty: dec(qty),
            unit_measure: BaseUnit::Millilitres,
            total: Decimal::ZERO,
        }))
        .with_id(id)
    }

    fn waste_deduction(id: &str, item: &str, qty: &str) -> Transaction {
        Transaction::new(TxBody::Waste(WasteEntry {
            description: item.into(),
            qty: dec(qty),
            unit_measure: BaseUnit::Millilitres,
            ..Default::default()
        }))
        .with_id(id)
    }

    fn only(positions: Vec<InventoryPosition>) -> InventoryPosition {
        assert_eq!(positions.len(), 1);
        positions.into_iter().next().unwrap()
    }

    /// The worked milk scenario: two purchases at different prices, one
    /// recipe usage, one waste.
    #[test]
    fn test_weighted_average_scenario() {
        let mut log = vec![purchase("10", "LEITE INTEGRAL", "1000", "5.00")];
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("1000"));
        assert_eq!(p.average_cost, dec("0.005"));
        assert_eq!(p.total_value, dec("5.00"));

        log.push(purchase("11", "LEITE INTEGRAL", "1000", "7.00"));
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("2000"));
        assert_eq!(p.average_cost, dec("0.006"));
        assert_eq!(p.total_value, dec("12.00"));

        log.push(usage("12", "LEITE INTEGRAL", "200"));
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("1800"));
        assert_eq!(p.average_cost, dec("0.006"));
        assert_eq!(p.total_value, dec("10.80"));

        log.push(waste_deduction("13", "LEITE INTEGRAL", "100"));
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("1700"));
        assert_eq!(p.average_cost, dec("0.006"));
        assert_eq!(p.total_value, dec("10.20"));
    }

    #[test]
    fn test_replay_is_ordered_by_id() {
        // Same records, shuffled: valuation must not depend on list order.
        let log = vec![
            usage("12", "LEITE INTEGRAL", "200"),
            purchase("10", "LEITE INTEGRAL", "1000", "5.00"),
            purchase("11", "LEITE INTEGRAL", "1000", "7.00"),
        ];
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("1800"));
        assert_eq!(p.average_cost, dec("0.006"));
    }

    #[test]
    fn test_average_stays_stale_at_zero_stock() {
        let log = vec![
            purchase("10", "ACUCAR", "500", "10.00"),
            usage("11", "ACUCAR", "500"),
        ];
        let p = only(positions(&log, true));
        assert_eq!(p.quantity, Decimal::ZERO);
        // Average retained for the next increase to reference.
        assert_eq!(p.average_cost, dec("0.02"));
    }

    #[test]
    fn test_consecutive_decreases_keep_average_constant() {
        let log = vec![
            purchase("10", "FARINHA", "1000", "8.00"),
            usage("11", "FARINHA", "100"),
            usage("12", "FARINHA", "150"),
            usage("13", "FARINHA", "250"),
        ];
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("500"));
        assert_eq!(p.average_cost, dec("0.008"));
    }

    #[test]
    fn test_summary_records_are_ignored() {
        let sale_summary = Transaction::new(TxBody::ProductSale(ProductSale {
            description: "VENDA: BOLO".into(),
            product_name: "BOLO".into(),
            qty: dec("2"),
            total: dec("50"),
            ..Default::default()
        }))
        .with_id("11");
        let waste_summary = Transaction::new(TxBody::Waste(WasteEntry {
            description: "DESP: BOLO".into(),
            waste_item: Some("BOLO".into()),
            qty: dec("1"),
            total: dec("12"),
            ..Default::default()
        }))
        .with_id("12");

        let log = vec![
            purchase("10", "LEITE INTEGRAL", "1000", "5.00"),
            sale_summary,
            waste_summary,
        ];
        let all = positions(&log, true);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].item, "LEITE INTEGRAL");
    }

    #[test]
    fn test_recipes_do_not_touch_stock() {
        let recipe = Transaction::new(TxBody::Recipe(crate::models::RecipeCard {
            description: "BOLO DE CENOURA".into(),
            total_cost: dec("15"),
            ..Default::default()
        }))
        .with_id("11");
        let log = vec![purchase("10", "CENOURA", "500", "4.00"), recipe];
        let all = positions(&log, true);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].item, "CENOURA");
    }

    #[test]
    fn test_zero_stock_emitted_only_on_request() {
        let log = vec![
            purchase("10", "ACUCAR", "500", "10.00"),
            usage("11", "ACUCAR", "500"),
        ];
        assert!(positions(&log, false).is_empty());
        assert_eq!(positions(&log, true).len(), 1);
    }

    #[test]
    fn test_views() {
        // FERMENTO only ever appears in a usage record: it is visible in
        // the full view but not manageable.
        let log = vec![
            purchase("10", "ACUCAR", "500", "10.00"),
            purchase("11", "SAL", "100", "2.00"),
            usage("12", "SAL", "100"),
            usage("13", "FERMENTO", "30"),
        ];

        let full = view(&log, StockView::Full);
        assert_eq!(full.len(), 3);

        let manageable = view(&log, StockView::Manageable);
        let names: Vec<&str> = manageable.iter().map(|p| p.item.as_str()).collect();
        assert_eq!(names, vec!["ACUCAR", "SAL"]);

        let display = view(&log, StockView::Display);
        let names: Vec<&str> = display.iter().map(|p| p.item.as_str()).collect();
        assert_eq!(names, vec!["ACUCAR"]);
    }

    #[test]
    fn test_negative_stock_allowed() {
        let log = vec![
            purchase("10", "LEITE INTEGRAL", "100", "1.00"),
            usage("11", "LEITE INTEGRAL", "300"),
        ];
        let p = only(positions(&log, false));
        assert_eq!(p.quantity, dec("-200"));
        // Stale average keeps pricing the shortfall.
        assert_eq!(p.average_cost, dec("0.01"));
    }

    #[test]
    fn test_unnamed_record_buckets_as_unknown() {
        let log = vec![purchase("10", "", "10", "5.00")];
        let p = only(positions(&log, true));
        assert_eq!(p.item, "UNKNOWN");
    }
}
