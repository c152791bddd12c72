//! Dashboard aggregations
//!
//! Pure summaries over the transaction list: cash overview, sales
//! performance by product, and waste losses by item and by reason.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{InventoryPosition, StockView, Transaction, TxBody, TxKind};
use crate::valuation;

/// Headline numbers for the business overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSummary {
    /// Money invested through purchases and manual adjustments.
    pub purchases_total: Decimal,
    /// Revenue from product sales.
    pub sales_total: Decimal,
    /// `sales_total − purchases_total`.
    pub cash_balance: Decimal,
    /// Money lost to waste.
    pub waste_total: Decimal,
    /// Manageable items currently below zero.
    pub negative_items: Vec<InventoryPosition>,
    /// Estimated cost to bring every negative item back to zero.
    pub regularization_cost: Decimal,
}

/// Compute the overview from one owner's full transaction list.
pub fn business_summary(transactions: &[Transaction]) -> BusinessSummary {
    let mut purchases_total = Decimal::ZERO;
    let mut sales_total = Decimal::ZERO;
    let mut waste_total = Decimal::ZERO;

    for tx in transactions {
        match tx.kind() {
            TxKind::Purchase | TxKind::Adjustment => purchases_total += tx.body.total(),
            TxKind::ProductSale => sales_total += tx.body.total(),
            TxKind::Waste => waste_total += tx.body.total(),
            _ => {}
        }
    }

    let negative_items: Vec<InventoryPosition> =
        valuation::view(transactions, StockView::Manageable)
            .into_iter()
            .filter(|p| p.quantity < Decimal::ZERO)
            .collect();
    let regularization_cost = negative_items
        .iter()
        .map(|p| p.quantity * p.average_cost)
        .sum::<Decimal>()
        .abs();

    BusinessSummary {
        purchases_total,
        sales_total,
        cash_balance: sales_total - purchases_total,
        waste_total,
        negative_items,
        regularization_cost,
    }
}

/// Sales aggregated per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSalesRow {
    pub product_name: String,
    pub qty_sold: Decimal,
    pub revenue: Decimal,
    pub occurrences: u64,
}

/// Requested ordering of the sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalesSort {
    #[default]
    BestSelling,
    HighestRevenue,
    WorstSelling,
    LowestRevenue,
}

/// Group product sales by product name and sort as requested.
pub fn sales_by_product(transactions: &[Transaction], sort: SalesSort) -> Vec<ProductSalesRow> {
    let mut rows: BTreeMap<String, ProductSalesRow> = BTreeMap::new();

    for tx in transactions {
        if let TxBody::ProductSale(sale) = &tx.body {
            let row = rows
                .entry(sale.product_name.clone())
                .or_insert_with(|| ProductSalesRow {
                    product_name: sale.product_name.clone(),
                    qty_sold: Decimal::ZERO,
                    revenue: Decimal::ZERO,
                    occurrences: 0,
                });
            row.qty_sold += sale.qty;
            row.revenue += sale.total;
            row.occurrences += 1;
        }
    }

    let mut rows: Vec<ProductSalesRow> = rows.into_values().collect();
    match sort {
        SalesSort::BestSelling => rows.sort_by(|a, b| b.qty_sold.cmp(&a.qty_sold)),
        SalesSort::WorstSelling => rows.sort_by(|a, b| a.qty_sold.cmp(&b.qty_sold)),
        SalesSort::HighestRevenue => rows.sort_by(|a, b| b.revenue.cmp(&a.revenue)),
        SalesSort::LowestRevenue => rows.sort_by(|a, b| a.revenue.cmp(&b.revenue)),
    }
    rows
}

/// Waste losses grouped by wasted item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteByItemRow {
    pub item: String,
    pub total_loss: Decimal,
    pub occurrences: u64,
}

/// Waste occurrences grouped by reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteByReasonRow {
    pub reason: String,
    pub total_loss: Decimal,
    pub occurrences: u64,
}

/// Both waste breakdowns. Only summary rows (those carrying `waste_item`)
/// count; cascaded deduction records carry no loss of their own.
pub fn waste_breakdown(
    transactions: &[Transaction],
) -> (Vec<WasteByItemRow>, Vec<WasteByReasonRow>) {
    let mut by_item: BTreeMap<String, WasteByItemRow> = BTreeMap::new();
    let mut by_reason: BTreeMap<String, WasteByReasonRow> = BTreeMap::new();

    for tx in transactions {
        if let TxBody::Waste(waste) = &tx.body {
            let Some(item) = &waste.waste_item else {
                continue;
            };
            let row = by_item.entry(item.clone()).or_insert_with(|| WasteByItemRow {
                item: item.clone(),
                total_loss: Decimal::ZERO,
                occurrences: 0,
            });
            row.total_loss += waste.total;
            row.occurrences += 1;

            if let Some(reason) = &waste.waste_reason {
                let row = by_reason
                    .entry(reason.clone())
                    .or_insert_with(|| WasteByReasonRow {
                        reason: reason.clone(),
                        total_loss: Decimal::ZERO,
                        occurrences: 0,
                    });
                row.total_loss += waste.total;
                row.occurrences += 1;
            }
        }
    }

    let mut items: Vec<WasteByItemRow> = by_item.into_values().collect();
    items.sort_by(|a, b| b.total_loss.cmp(&a.total_loss));
    let mut reasons: Vec<WasteByReasonRow> = by_reason.into_values().collect();
    reasons.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    (items, reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductSale, StockEntry, UsageEntry, WasteEntry};
    use crate::types::BaseUnit;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn purchase(id: &str, item: &str, qty: &str, total: &str) -> Transaction {
        Transaction::new(TxBody::Purchase(StockEntry {
            description: item.into(),
            qty: dec(qty),
            unit_measure: BaseUnit::Grams,
            total: dec(total),
            ..Default::default()
        }))
        .with_id(id)
    }

    fn product_sale(id: &str, product: &str, qty: &str, total: &str) -> Transaction {
        Transaction::new(TxBody::ProductSale(ProductSale {
            description: format!("VENDA: {}", product),
            product_name: product.into(),
            qty: dec(qty),
            total: dec(total),
            ..Default::default()
        }))
        .with_id(id)
    }

    fn waste_summary(id: &str, item: &str, reason: &str, total: &str) -> Transaction {
        Transaction::new(TxBody::Waste(WasteEntry {
            description: format!("DESP: {}", item),
            waste_item: Some(item.into()),
            waste_reason: Some(reason.into()),
            qty: dec("1"),
            total: dec(total),
            ..Default::default()
        }))
        .with_id(id)
    }

    #[test]
    fn test_business_summary_totals() {
        let log = vec![
            purchase("10", "FARINHA", "1000", "8.00"),
            purchase("11", "ACUCAR", "500", "6.00"),
            product_sale("12", "BOLO", "2", "40.00"),
            waste_summary("13", "FARINHA", "Produto vencido", "2.50"),
        ];
        let summary = business_summary(&log);
        assert_eq!(summary.purchases_total, dec("14.00"));
        assert_eq!(summary.sales_total, dec("40.00"));
        assert_eq!(summary.cash_balance, dec("26.00"));
        assert_eq!(summary.waste_total, dec("2.50"));
        assert!(summary.negative_items.is_empty());
    }

    #[test]
    fn test_negative_stock_regularization_cost() {
        let over_usage = Transaction::new(TxBody::RecipeUsage(UsageEntry {
            description: "FARINHA".into(),
            qty: dec("1500"),
            unit_measure: BaseUnit::Grams,
            total: Decimal::ZERO,
        }))
        .with_id("11");
        let log = vec![purchase("10", "FARINHA", "1000", "8.00"), over_usage];

        let summary = business_summary(&log);
        assert_eq!(summary.negative_items.len(), 1);
        assert_eq!(summary.negative_items[0].quantity, dec("-500"));
        // 500 g at the stale 0.008 average.
        assert_eq!(summary.regularization_cost, dec("4.00"));
    }

    #[test]
    fn test_sales_by_product_grouping_and_sort() {
        let log = vec![
            product_sale("10", "BOLO", "2", "40.00"),
            product_sale("11", "PUDIM", "5", "30.00"),
            product_sale("12", "BOLO", "1", "20.00"),
        ];

        let rows = sales_by_product(&log, SalesSort::BestSelling);
        assert_eq!(rows[0].product_name, "PUDIM");
        assert_eq!(rows[0].qty_sold, dec("5"));
        assert_eq!(rows[1].qty_sold, dec("3"));
        assert_eq!(rows[1].occurrences, 2);

        let rows = sales_by_product(&log, SalesSort::HighestRevenue);
        assert_eq!(rows[0].product_name, "BOLO");
        assert_eq!(rows[0].revenue, dec("60.00"));
    }

    #[test]
    fn test_waste_breakdown_skips_deduction_rows() {
        let deduction = Transaction::new(TxBody::Waste(WasteEntry {
            description: "FARINHA".into(),
            qty: dec("100"),
            unit_measure: BaseUnit::Grams,
            ..Default::default()
        }))
        .with_id("12");
        let log = vec![
            waste_summary("10", "FARINHA", "Produto vencido", "2.50"),
            waste_summary("11", "FARINHA", "Praga no estoque", "1.00"),
            deduction,
        ];

        let (items, reasons) = waste_breakdown(&log);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_loss, dec("3.50"));
        assert_eq!(items[0].occurrences, 2);
        assert_eq!(reasons.len(), 2);
    }
}
