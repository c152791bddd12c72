//! Sale/waste cascade planning
//!
//! One user-facing sale or waste event expands into a summary record plus
//! per-ingredient stock-deduction records. The expansion is computed here
//! as a pure plan before anything is written, so the persistence layer
//! only walks a finished list. Deletion reverses the expansion by
//! following the `related_sale_id`/`related_waste_id` back-references.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    InventoryPosition, ProductSale, RecipeCard, Transaction, TxBody, UsageEntry, WasteEntry,
    SALE_SUMMARY_PREFIX, WASTE_SUMMARY_PREFIX,
};
use crate::types::round_money;
use crate::valuation::position_of;

/// An ingredient whose stock was already at or below zero when the plan
/// was drawn. Advisory only: the cascade proceeds regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockShortage {
    pub item: String,
    pub quantity: Decimal,
}

/// The records one event expands into. `summary` must be persisted before
/// `usages` so the back-references never point at nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadePlan {
    pub summary: Transaction,
    pub usages: Vec<Transaction>,
    pub shortages: Vec<StockShortage>,
}

impl CascadePlan {
    /// Total number of records the plan will write.
    pub fn record_count(&self) -> usize {
        1 + self.usages.len()
    }
}

/// Customer-facing details of a product sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleOrder {
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub date: String,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub sales_channel: Option<String>,
}

/// Expand a product sale: one `venda_produto` summary carrying the revenue
/// and client metadata, plus one usage record per recipe ingredient.
///
/// An ingredient already at or below zero stock is tagged with the
/// informational negative-usage kind; the arithmetic effect is identical.
pub fn plan_product_sale(
    sale_id: &str,
    recipe_id: &str,
    recipe: &RecipeCard,
    order: &SaleOrder,
    positions: &[InventoryPosition],
) -> CascadePlan {
    let summary = Transaction::new(TxBody::ProductSale(ProductSale {
        description: format!("{} {}", SALE_SUMMARY_PREFIX, recipe.description),
        product_id: recipe_id.to_string(),
        product_name: recipe.description.clone(),
        qty: order.qty,
        unit_price: order.unit_price,
        total: round_money(order.qty * order.unit_price),
        client_name: order.client_name.clone(),
        client_phone: order.client_phone.clone(),
        client_address: order.client_address.clone(),
        sales_channel: order.sales_channel.clone(),
    }))
    .with_id(sale_id)
    .with_date(order.date.clone());

    let (usages, shortages) = ingredient_usages(recipe, order.qty, positions, |tx| {
        tx.related_sale_id = Some(sale_id.to_string());
        tx.date = Some(order.date.clone());
    });

    CascadePlan {
        summary,
        usages,
        shortages,
    }
}

/// Expand a raw stock item waste: the `DESP:`-prefixed summary carries the
/// loss priced at the item's current average, and a single deduction
/// record carries the stock effect (the summary itself is invisible to
/// valuation).
pub fn plan_item_waste(
    waste_id: &str,
    item: &InventoryPosition,
    qty_lost: Decimal,
    reason: &str,
    date: &str,
) -> CascadePlan {
    let summary = Transaction::new(TxBody::Waste(WasteEntry {
        description: format!("{} {}", WASTE_SUMMARY_PREFIX, item.item),
        waste_item: Some(item.item.clone()),
        waste_reason: Some(reason.to_string()),
        qty: qty_lost,
        unit_measure: item.unit,
        total: round_money(qty_lost * item.average_cost),
        lost_revenue: Decimal::ZERO,
    }))
    .with_id(waste_id)
    .with_date(date);

    let mut deduction = Transaction::new(TxBody::Waste(WasteEntry {
        description: item.item.clone(),
        qty: qty_lost,
        unit_measure: item.unit,
        ..Default::default()
    }))
    .with_date(date);
    deduction.related_waste_id = Some(waste_id.to_string());

    CascadePlan {
        summary,
        usages: vec![deduction],
        shortages: Vec::new(),
    }
}

/// Expand a finished-product waste: loss is the recipe cost, foregone
/// revenue is the recipe price, and the same per-ingredient usage records
/// a sale would generate are cascaded.
pub fn plan_product_waste(
    waste_id: &str,
    recipe: &RecipeCard,
    qty_lost: Decimal,
    reason: &str,
    date: &str,
    positions: &[InventoryPosition],
) -> CascadePlan {
    let summary = Transaction::new(TxBody::Waste(WasteEntry {
        description: format!("{} {}", WASTE_SUMMARY_PREFIX, recipe.description),
        waste_item: Some(recipe.description.clone()),
        waste_reason: Some(reason.to_string()),
        qty: qty_lost,
        unit_measure: crate::types::BaseUnit::Each,
        total: round_money(recipe.total_cost * qty_lost),
        lost_revenue: round_money(recipe.sale_price * qty_lost),
    }))
    .with_id(waste_id)
    .with_date(date);

    let (usages, shortages) = ingredient_usages(recipe, qty_lost, positions, |tx| {
        tx.related_waste_id = Some(waste_id.to_string());
        tx.date = Some(date.to_string());
    });

    CascadePlan {
        summary,
        usages,
        shortages,
    }
}

fn ingredient_usages(
    recipe: &RecipeCard,
    multiplier: Decimal,
    positions: &[InventoryPosition],
    mut link: impl FnMut(&mut Transaction),
) -> (Vec<Transaction>, Vec<StockShortage>) {
    let mut usages = Vec::with_capacity(recipe.ingredients.len());
    let mut shortages = Vec::new();

    for ingredient in &recipe.ingredients {
        let used = ingredient.qty_real * multiplier;
        let current = position_of(positions, &ingredient.name)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);

        let entry = UsageEntry {
            description: ingredient.name.clone(),
            qty: used,
            unit_measure: ingredient.unit,
            total: Decimal::ZERO,
        };
        let body = if current <= Decimal::ZERO {
            shortages.push(StockShortage {
                item: ingredient.name.clone(),
                quantity: current,
            });
            TxBody::RecipeUsageNegative(entry)
        } else {
            TxBody::RecipeUsage(entry)
        };

        let mut tx = Transaction::new(body);
        link(&mut tx);
        usages.push(tx);
    }

    (usages, shortages)
}

/// Which back-reference a cascade follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeLink {
    Sale,
    Waste,
}

/// Ids of every record owned by the given summary — the exact set a
/// cascading delete must remove besides the summary itself.
pub fn linked_record_ids(
    transactions: &[Transaction],
    summary_id: &str,
    link: CascadeLink,
) -> Vec<String> {
    transactions
        .iter()
        .filter(|tx| {
            let reference = match link {
                CascadeLink::Sale => tx.related_sale_id.as_deref(),
                CascadeLink::Waste => tx.related_waste_id.as_deref(),
            };
            reference == Some(summary_id)
        })
        .map(|tx| tx.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeIngredient;
    use crate::types::{BaseUnit, DisplayUnit};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cake_recipe() -> RecipeCard {
        RecipeCard {
            description: "BOLO DE CENOURA".into(),
            ingredients: vec![
                RecipeIngredient {
                    name: "LEITE INTEGRAL".into(),
                    qty_display: dec("200"),
                    unit_display: DisplayUnit::Millilitres,
                    qty_real: dec("200"),
                    unit: BaseUnit::Millilitres,
                    cost: dec("1.20"),
                },
                RecipeIngredient {
                    name: "FARINHA".into(),
                    qty_display: dec("300"),
                    unit_display: DisplayUnit::Grams,
                    qty_real: dec("300"),
                    unit: BaseUnit::Grams,
                    cost: dec("2.40"),
                },
            ],
            extras: Vec::new(),
            total_cost: dec("3.60"),
            profit_margin: dec("100"),
            sale_price: dec("7.20"),
        }
    }

    fn stocked(item: &str, qty: &str) -> InventoryPosition {
        InventoryPosition {
            item: item.into(),
            unit: BaseUnit::Millilitres,
            quantity: dec(qty),
            average_cost: dec("0.006"),
            total_value: Decimal::ZERO,
        }
    }

    #[test]
    fn test_sale_plan_links_usages_to_summary() {
        let positions = vec![stocked("LEITE INTEGRAL", "2000"), stocked("FARINHA", "500")];
        let order = SaleOrder {
            qty: dec("2"),
            unit_price: dec("7.20"),
            date: "2024-03-02T10:00:00".into(),
            ..Default::default()
        };
        let plan = plan_product_sale("777", "555", &cake_recipe(), &order, &positions);

        assert_eq!(plan.record_count(), 3);
        match &plan.summary.body {
            TxBody::ProductSale(sale) => {
                assert_eq!(sale.description, "VENDA: BOLO DE CENOURA");
                assert_eq!(sale.product_id, "555");
                assert_eq!(sale.total, dec("14.40"));
            }
            other => panic!("expected sale summary, got {:?}", other),
        }
        for usage in &plan.usages {
            assert_eq!(usage.related_sale_id.as_deref(), Some("777"));
            assert!(usage.related_waste_id.is_none());
        }
        // 200ml × 2 and 300g × 2.
        assert_eq!(plan.usages[0].body.qty(), dec("400"));
        assert_eq!(plan.usages[1].body.qty(), dec("600"));
        assert!(plan.shortages.is_empty());
    }

    #[test]
    fn test_sale_plan_tags_negative_stock_usage() {
        let positions = vec![stocked("LEITE INTEGRAL", "0"), stocked("FARINHA", "500")];
        let order = SaleOrder {
            qty: dec("1"),
            unit_price: dec("7.20"),
            date: "2024-03-02T10:00:00".into(),
            ..Default::default()
        };
        let plan = plan_product_sale("777", "555", &cake_recipe(), &order, &positions);

        assert!(matches!(
            plan.usages[0].body,
            TxBody::RecipeUsageNegative(_)
        ));
        assert!(matches!(plan.usages[1].body, TxBody::RecipeUsage(_)));
        assert_eq!(plan.shortages.len(), 1);
        assert_eq!(plan.shortages[0].item, "LEITE INTEGRAL");
    }

    #[test]
    fn test_item_waste_plan_carries_stock_effect_in_deduction() {
        let milk = stocked("LEITE INTEGRAL", "1800");
        let plan = plan_item_waste("888", &milk, dec("100"), "Produto vencido", "2024-03-02");

        match &plan.summary.body {
            TxBody::Waste(w) => {
                assert_eq!(w.description, "DESP: LEITE INTEGRAL");
                assert_eq!(w.waste_item.as_deref(), Some("LEITE INTEGRAL"));
                assert_eq!(w.total, dec("0.60"));
                assert_eq!(w.lost_revenue, Decimal::ZERO);
            }
            other => panic!("expected waste summary, got {:?}", other),
        }
        assert_eq!(plan.usages.len(), 1);
        let deduction = &plan.usages[0];
        assert_eq!(deduction.related_waste_id.as_deref(), Some("888"));
        assert_eq!(deduction.body.description(), "LEITE INTEGRAL");
        assert_eq!(deduction.body.qty(), dec("100"));
        assert_eq!(deduction.body.total(), Decimal::ZERO);
    }

    #[test]
    fn test_product_waste_plan_prices_cost_and_lost_revenue() {
        let positions = vec![stocked("LEITE INTEGRAL", "2000"), stocked("FARINHA", "500")];
        let plan = plan_product_waste(
            "999",
            &cake_recipe(),
            dec("3"),
            "Queima / cozimento excessivo",
            "2024-03-02",
            &positions,
        );

        match &plan.summary.body {
            TxBody::Waste(w) => {
                assert_eq!(w.total, dec("10.80"));
                assert_eq!(w.lost_revenue, dec("21.60"));
                assert_eq!(w.qty, dec("3"));
            }
            other => panic!("expected waste summary, got {:?}", other),
        }
        assert_eq!(plan.usages.len(), 2);
        for usage in &plan.usages {
            assert_eq!(usage.related_waste_id.as_deref(), Some("999"));
        }
        assert_eq!(plan.usages[0].body.qty(), dec("600"));
    }

    #[test]
    fn test_linked_record_ids_selects_exactly_the_cascade() {
        let positions = vec![stocked("LEITE INTEGRAL", "2000"), stocked("FARINHA", "500")];
        let order = SaleOrder {
            qty: dec("1"),
            unit_price: dec("7.20"),
            date: "2024-03-02T10:00:00".into(),
            ..Default::default()
        };
        let plan = plan_product_sale("777", "555", &cake_recipe(), &order, &positions);

        let mut log: Vec<Transaction> = Vec::new();
        log.push(plan.summary.clone());
        for (i, mut usage) in plan.usages.clone().into_iter().enumerate() {
            usage.id = format!("usage-{}", i);
            log.push(usage);
        }
        // An unrelated usage must not be swept up.
        let mut stray = Transaction::new(TxBody::RecipeUsage(UsageEntry {
            description: "FARINHA".into(),
            qty: dec("10"),
            unit_measure: BaseUnit::Grams,
            total: Decimal::ZERO,
        }))
        .with_id("stray");
        stray.related_sale_id = Some("123".into());
        log.push(stray);

        let ids = linked_record_ids(&log, "777", CascadeLink::Sale);
        assert_eq!(ids, vec!["usage-0".to_string(), "usage-1".to_string()]);
    }
}
