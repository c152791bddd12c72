//! Recipe cost calculator
//!
//! A `RecipeDraft` is the authoritative draft value object: handlers build
//! one from client input, the calculator resolves ingredient costs against
//! the current valuation, and the result is frozen into a `RecipeCard`.
//! Once saved, ingredient costs are never recomputed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ExtraCost, InventoryPosition, RecipeCard, RecipeIngredient};
use crate::types::DisplayUnit;

/// Default margin applied to a draft that was never priced: 100% over cost.
pub const DEFAULT_MARGIN: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Error, PartialEq)]
pub enum CostingError {
    #[error("ingredient quantity must be positive")]
    NonPositiveQuantity,
    #[error("extra cost must be positive")]
    NonPositiveExtra,
    #[error("{unit:?} cannot measure an item stocked in {item_unit}")]
    UnitMismatch {
        unit: DisplayUnit,
        item_unit: &'static str,
    },
}

/// `price = cost × (1 + margin/100)`; undefined until there is a cost.
pub fn price_from_margin(cost: Decimal, margin: Decimal) -> Option<Decimal> {
    if cost > Decimal::ZERO {
        Some(cost * (Decimal::ONE + margin / Decimal::ONE_HUNDRED))
    } else {
        None
    }
}

/// `margin = (price − cost) / cost × 100`; needs a cost and a price.
pub fn margin_from_price(cost: Decimal, price: Decimal) -> Option<Decimal> {
    if cost > Decimal::ZERO && price > Decimal::ZERO {
        Some((price - cost) / cost * Decimal::ONE_HUNDRED)
    } else {
        None
    }
}

/// Mutable recipe under construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub extras: Vec<ExtraCost>,
    pub profit_margin: Decimal,
    pub sale_price: Decimal,
}

impl RecipeDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: Vec::new(),
            extras: Vec::new(),
            profit_margin: DEFAULT_MARGIN,
            sale_price: Decimal::ZERO,
        }
    }

    /// Reopen a saved recipe for editing.
    pub fn from_card(card: &RecipeCard) -> Self {
        Self {
            name: card.description.clone(),
            ingredients: card.ingredients.clone(),
            extras: card.extras.clone(),
            profit_margin: card.profit_margin,
            sale_price: card.sale_price,
        }
    }

    /// Add an ingredient line: converts the entered quantity to the item's
    /// base unit and freezes its cost at the item's current average.
    pub fn add_ingredient(
        &mut self,
        item: &InventoryPosition,
        qty_display: Decimal,
        unit_display: DisplayUnit,
    ) -> Result<(), CostingError> {
        if qty_display <= Decimal::ZERO {
            return Err(CostingError::NonPositiveQuantity);
        }
        if unit_display.base() != item.unit {
            return Err(CostingError::UnitMismatch {
                unit: unit_display,
                item_unit: item.unit.as_str(),
            });
        }

        let qty_real = unit_display.to_base(qty_display);
        let cost = qty_real * item.average_cost;
        self.ingredients.push(RecipeIngredient {
            name: item.item.clone(),
            qty_display,
            unit_display,
            qty_real,
            unit: item.unit,
            cost,
        });
        Ok(())
    }

    pub fn add_extra(
        &mut self,
        name: impl Into<String>,
        cost: Decimal,
    ) -> Result<(), CostingError> {
        if cost <= Decimal::ZERO {
            return Err(CostingError::NonPositiveExtra);
        }
        self.extras.push(ExtraCost {
            name: name.into(),
            cost,
        });
        Ok(())
    }

    /// Σ ingredient costs + Σ extra costs.
    pub fn total_cost(&self) -> Decimal {
        let ingredients: Decimal = self.ingredients.iter().map(|i| i.cost).sum();
        let extras: Decimal = self.extras.iter().map(|e| e.cost).sum();
        ingredients + extras
    }

    /// User edited the margin: recompute the price from it.
    pub fn set_margin(&mut self, margin: Decimal) {
        let cost = self.total_cost();
        if let Some(price) = price_from_margin(cost, margin) {
            self.profit_margin = margin;
            self.sale_price = price;
        }
    }

    /// User edited the price: recompute the margin from it.
    pub fn set_price(&mut self, price: Decimal) {
        let cost = self.total_cost();
        if let Some(margin) = margin_from_price(cost, price) {
            self.sale_price = price;
            self.profit_margin = margin;
        }
    }

    /// A draft that was never priced defaults to the standard margin.
    pub fn apply_default_pricing(&mut self) {
        if self.sale_price == Decimal::ZERO {
            self.set_margin(DEFAULT_MARGIN);
        }
    }

    pub fn profit(&self) -> Decimal {
        self.sale_price - self.total_cost()
    }

    /// Freeze the draft into its stored form.
    pub fn into_card(self) -> RecipeCard {
        let total_cost = self.total_cost();
        RecipeCard {
            description: self.name,
            ingredients: self.ingredients,
            extras: self.extras,
            total_cost,
            profit_margin: self.profit_margin,
            sale_price: self.sale_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaseUnit;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn milk_position(avg: &str) -> InventoryPosition {
        InventoryPosition {
            item: "LEITE INTEGRAL".into(),
            unit: BaseUnit::Millilitres,
            quantity: dec("2000"),
            average_cost: dec(avg),
            total_value: dec("12"),
        }
    }

    #[test]
    fn test_ingredient_converts_and_snapshots_cost() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft
            .add_ingredient(&milk_position("0.006"), dec("1"), DisplayUnit::Litres)
            .unwrap();
        let ing = &draft.ingredients[0];
        assert_eq!(ing.qty_real, dec("1000"));
        assert_eq!(ing.unit, BaseUnit::Millilitres);
        assert_eq!(ing.cost, dec("6.00"));
    }

    #[test]
    fn test_cup_and_tablespoon_conversion() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft
            .add_ingredient(&milk_position("0.01"), dec("2"), DisplayUnit::Cup)
            .unwrap();
        draft
            .add_ingredient(&milk_position("0.01"), dec("1"), DisplayUnit::Tablespoon)
            .unwrap();
        assert_eq!(draft.ingredients[0].qty_real, dec("480"));
        assert_eq!(draft.ingredients[1].qty_real, dec("15"));
        assert_eq!(draft.total_cost(), dec("4.95"));
    }

    #[test]
    fn test_unit_mismatch_rejected() {
        let mut draft = RecipeDraft::new("PUDIM");
        let err = draft
            .add_ingredient(&milk_position("0.006"), dec("1"), DisplayUnit::Kilograms)
            .unwrap_err();
        assert!(matches!(err, CostingError::UnitMismatch { .. }));
    }

    #[test]
    fn test_nonpositive_quantity_rejected() {
        let mut draft = RecipeDraft::new("PUDIM");
        let err = draft
            .add_ingredient(&milk_position("0.006"), Decimal::ZERO, DisplayUnit::Litres)
            .unwrap_err();
        assert_eq!(err, CostingError::NonPositiveQuantity);
    }

    #[test]
    fn test_total_includes_extras() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft
            .add_ingredient(&milk_position("0.006"), dec("1"), DisplayUnit::Litres)
            .unwrap();
        draft.add_extra("EMBALAGEM", dec("1.50")).unwrap();
        assert_eq!(draft.total_cost(), dec("7.50"));
    }

    #[test]
    fn test_margin_drives_price() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft.add_extra("BASE", dec("10")).unwrap();
        draft.set_margin(dec("150"));
        assert_eq!(draft.sale_price, dec("25"));
        assert_eq!(draft.profit_margin, dec("150"));
    }

    #[test]
    fn test_price_drives_margin() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft.add_extra("BASE", dec("10")).unwrap();
        draft.set_price(dec("30"));
        assert_eq!(draft.profit_margin, dec("200"));
        assert_eq!(draft.sale_price, dec("30"));
    }

    #[test]
    fn test_solver_is_last_write_wins() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft.add_extra("BASE", dec("10")).unwrap();
        draft.set_margin(dec("100"));
        draft.set_price(dec("15"));
        assert_eq!(draft.sale_price, dec("15"));
        assert_eq!(draft.profit_margin, dec("50"));
    }

    #[test]
    fn test_solver_ignores_edits_without_cost() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft.set_margin(dec("150"));
        draft.set_price(dec("30"));
        assert_eq!(draft.sale_price, Decimal::ZERO);
        assert_eq!(draft.profit_margin, DEFAULT_MARGIN);
    }

    #[test]
    fn test_default_pricing_doubles_cost() {
        let mut draft = RecipeDraft::new("PUDIM");
        draft.add_extra("BASE", dec("12")).unwrap();
        draft.apply_default_pricing();
        assert_eq!(draft.sale_price, dec("24"));
        assert_eq!(draft.profit_margin, dec("100"));
    }

    #[test]
    fn test_cost_snapshot_survives_price_change() {
        // A recipe authored at one average keeps its cost when the stock
        // item's average later moves.
        let mut draft = RecipeDraft::new("PUDIM");
        draft
            .add_ingredient(&milk_position("0.005"), dec("1"), DisplayUnit::Litres)
            .unwrap();
        let card = draft.into_card();
        assert_eq!(card.total_cost, dec("5"));

        let reopened = RecipeDraft::from_card(&card);
        assert_eq!(reopened.ingredients[0].cost, dec("5"));
        assert_eq!(reopened.total_cost(), dec("5"));
    }
}
