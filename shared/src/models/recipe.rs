//! Recipe payload stored on `receita_produto` transactions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers::{lenient_decimal, lenient_unit};
use crate::types::{BaseUnit, DisplayUnit};

/// A product recipe: ingredient list, extra costs and pricing.
///
/// Ingredient costs are snapshots taken when the recipe was authored; a
/// later change in an item's average cost does not rewrite them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecipeCard {
    /// Product name (normalized like any stock description).
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub extras: Vec<ExtraCost>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_cost: Decimal,
    /// Percentage over cost, e.g. 100 doubles the cost.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub profit_margin: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sale_price: Decimal,
}

impl RecipeCard {
    pub fn profit(&self) -> Decimal {
        self.sale_price - self.total_cost
    }
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Stock item key (normalized description of the referenced item).
    pub name: String,
    /// Quantity as the author typed it, in `unit_display`.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty_display: Decimal,
    pub unit_display: DisplayUnit,
    /// Quantity converted to the item's base unit; this is what cascades
    /// deduct from stock.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty_real: Decimal,
    /// Base unit of the referenced stock item.
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit: BaseUnit,
    /// Cost snapshot: `qty_real` priced at the item's average cost at
    /// authoring time.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cost: Decimal,
}

/// A fixed extra cost attached to a recipe (packaging, gas, labour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraCost {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cost: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_recipe_card_defaults() {
        let card: RecipeCard = serde_json::from_value(json!({
            "description": "BOLO DE CENOURA"
        }))
        .unwrap();
        assert!(card.ingredients.is_empty());
        assert_eq!(card.total_cost, Decimal::ZERO);
    }

    #[test]
    fn test_ingredient_roundtrip() {
        let ing = RecipeIngredient {
            name: "LEITE INTEGRAL".into(),
            qty_display: dec("1"),
            unit_display: DisplayUnit::Litres,
            qty_real: dec("1000"),
            unit: BaseUnit::Millilitres,
            cost: dec("6.00"),
        };
        let value = serde_json::to_value(&ing).unwrap();
        assert_eq!(value["unit_display"], "L");
        assert_eq!(value["unit"], "ML");
        let back: RecipeIngredient = serde_json::from_value(value).unwrap();
        assert_eq!(back, ing);
    }

    #[test]
    fn test_profit() {
        let card = RecipeCard {
            total_cost: dec("10"),
            sale_price: dec("25"),
            ..Default::default()
        };
        assert_eq!(card.profit(), dec("15"));
    }
}
