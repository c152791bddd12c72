//! Recipe service
//!
//! Builds recipe drafts against the current valuation, freezes their
//! costs and persists them as `receita_produto` records. Deleting a
//! recipe never cascades: sales already made keep their own usage
//! records, so history stays priceable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::ledger::LedgerService;
use shared::costing::{margin_from_price, price_from_margin, RecipeDraft};
use shared::models::{StockView, Transaction, TxBody};
use shared::types::DisplayUnit;
use shared::validation::validate_recipe;
use shared::valuation;

/// Recipe service
#[derive(Clone)]
pub struct RecipeService {
    ledger: LedgerService,
}

/// One ingredient line as the client submits it
#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    pub qty: Decimal,
    pub unit: DisplayUnit,
}

/// One extra cost line
#[derive(Debug, Deserialize)]
pub struct ExtraInput {
    pub name: String,
    pub cost: Decimal,
}

/// Input for creating or updating a recipe
#[derive(Debug, Deserialize)]
pub struct SaveRecipeInput {
    /// Present when editing an existing recipe.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub ingredients: Vec<IngredientInput>,
    #[serde(default)]
    pub extras: Vec<ExtraInput>,
    /// Applied first when both pricing fields are present.
    #[serde(default)]
    pub profit_margin: Option<Decimal>,
    /// Applied last: an explicit price wins over the margin.
    #[serde(default)]
    pub sale_price: Option<Decimal>,
}

/// Input for the margin↔price solver preview
#[derive(Debug, Deserialize)]
pub struct PricePreviewInput {
    pub cost: Decimal,
    #[serde(default)]
    pub profit_margin: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
}

/// Solved pricing for a given cost
#[derive(Debug, Serialize)]
pub struct PriceQuote {
    pub cost: Decimal,
    pub profit_margin: Decimal,
    pub sale_price: Decimal,
    pub profit: Decimal,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(db: PgPool) -> Self {
        Self {
            ledger: LedgerService::new(db),
        }
    }

    /// All saved recipes.
    pub async fn list(&self, owner: &str) -> AppResult<Vec<Transaction>> {
        let mut recipes: Vec<Transaction> = self
            .ledger
            .list(owner)
            .await?
            .into_iter()
            .filter(|tx| matches!(tx.body, TxBody::Recipe(_)))
            .collect();
        recipes.sort_by(|a, b| a.body.description().cmp(b.body.description()));
        Ok(recipes)
    }

    /// Build the draft against current stock, freeze it and save.
    pub async fn save(&self, owner: &str, input: SaveRecipeInput) -> AppResult<Transaction> {
        let transactions = self.ledger.list(owner).await?;
        let positions = valuation::view(&transactions, StockView::Manageable);

        let mut draft = RecipeDraft::new(input.name.trim().to_uppercase());
        for line in &input.ingredients {
            let key = line.name.trim().to_uppercase();
            let item = valuation::position_of(&positions, &key)
                .ok_or_else(|| AppError::NotFound(format!("Stock item {}", key)))?;
            draft
                .add_ingredient(item, line.qty, line.unit)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
        }
        for extra in &input.extras {
            draft
                .add_extra(extra.name.clone(), extra.cost)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
        }

        if let Some(margin) = input.profit_margin {
            draft.set_margin(margin);
        }
        if let Some(price) = input.sale_price {
            draft.set_price(price);
        }
        draft.apply_default_pricing();

        let card = draft.into_card();
        if let Err(msg) = validate_recipe(&card) {
            return Err(AppError::ValidationError(msg.to_string()));
        }

        let mut tx = Transaction::new(TxBody::Recipe(card));
        if let Some(id) = input.id {
            // Upsert path: replaces the stored recipe wholesale.
            tx = tx.with_id(id);
        }
        self.ledger.save(tx, owner).await
    }

    /// Run the margin↔price solver without persisting anything.
    pub fn price_preview(&self, input: PricePreviewInput) -> AppResult<PriceQuote> {
        if input.cost <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Cost must be positive".to_string(),
            ));
        }

        let (margin, price) = match (input.profit_margin, input.sale_price) {
            // An explicit price wins, mirroring last-write-wins in drafts.
            (_, Some(price)) if price > Decimal::ZERO => (
                margin_from_price(input.cost, price).unwrap_or_default(),
                price,
            ),
            (Some(margin), _) => (
                margin,
                price_from_margin(input.cost, margin).unwrap_or_default(),
            ),
            _ => {
                let margin = shared::costing::DEFAULT_MARGIN;
                (
                    margin,
                    price_from_margin(input.cost, margin).unwrap_or_default(),
                )
            }
        };

        Ok(PriceQuote {
            cost: input.cost,
            profit_margin: margin,
            sale_price: price,
            profit: price - input.cost,
        })
    }

    /// Delete a recipe by id. No cascade to historical sales.
    pub async fn delete(&self, owner: &str, id: &str) -> AppResult<bool> {
        self.ledger.delete(id, owner).await
    }
}
