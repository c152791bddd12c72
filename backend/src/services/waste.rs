//! Waste service
//!
//! Records loss of raw stock or finished products. Cost attribution
//! differs from a sale: raw items are priced at their current average
//! cost, finished products at their recipe cost plus foregone revenue.
//! The cascade shape is otherwise identical to a sale's.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::ledger::{LedgerService, OwnerLocks};
use shared::cascade::{self, CascadeLink, StockShortage};
use shared::models::{StockView, Transaction, TxBody};
use shared::validation::validate_waste;
use shared::valuation;

/// Waste service
#[derive(Clone)]
pub struct WasteService {
    ledger: LedgerService,
    locks: OwnerLocks,
}

/// What was lost: a raw stock item or a finished recipe product.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WasteTarget {
    StockItem { name: String },
    Product { recipe_id: String },
}

/// Input for registering a waste event
#[derive(Debug, Deserialize)]
pub struct CreateWasteInput {
    #[serde(flatten)]
    pub target: WasteTarget,
    pub qty: Decimal,
    /// One of the catalog reasons (`shared::validation::WASTE_REASONS`).
    pub reason: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Result of registering a waste event
#[derive(Debug, Serialize)]
pub struct WasteReceipt {
    pub waste: Transaction,
    pub deductions: usize,
    pub shortages: Vec<StockShortage>,
}

impl WasteService {
    /// Create a new WasteService instance
    pub fn new(db: PgPool, locks: OwnerLocks) -> Self {
        Self {
            ledger: LedgerService::new(db),
            locks,
        }
    }

    /// All waste summaries (rows carrying a wasted item), newest first.
    pub async fn list(&self, owner: &str) -> AppResult<Vec<Transaction>> {
        let mut wastes: Vec<Transaction> = self
            .ledger
            .list(owner)
            .await?
            .into_iter()
            .filter(|tx| matches!(&tx.body, TxBody::Waste(w) if w.waste_item.is_some()))
            .collect();
        wastes.sort_by(|a, b| (b.id.len(), &b.id).cmp(&(a.id.len(), &a.id)));
        Ok(wastes)
    }

    /// Register a waste event and its stock deductions.
    pub async fn create(&self, owner: &str, input: CreateWasteInput) -> AppResult<WasteReceipt> {
        if let Err(msg) = validate_waste(input.qty, &input.reason) {
            return Err(AppError::ValidationError(msg.to_string()));
        }
        let date = input.date.unwrap_or_else(today);

        let _guard = self.locks.acquire(owner).await;

        let transactions = self.ledger.list(owner).await?;
        let waste_id = self.ledger.next_id();

        let plan = match &input.target {
            WasteTarget::StockItem { name } => {
                let key = name.trim().to_uppercase();
                let positions = valuation::view(&transactions, StockView::Manageable);
                let item = valuation::position_of(&positions, &key)
                    .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
                cascade::plan_item_waste(&waste_id, item, input.qty, &input.reason, &date)
            }
            WasteTarget::Product { recipe_id } => {
                let recipe_tx = transactions
                    .iter()
                    .find(|tx| tx.id == *recipe_id)
                    .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
                let TxBody::Recipe(recipe) = &recipe_tx.body else {
                    return Err(AppError::NotFound("Recipe".to_string()));
                };
                let positions = valuation::view(&transactions, StockView::Full);
                cascade::plan_product_waste(
                    &waste_id,
                    recipe,
                    input.qty,
                    &input.reason,
                    &date,
                    &positions,
                )
            }
        };

        let waste = self.ledger.save(plan.summary, owner).await?;
        let deductions = plan.usages.len();
        for usage in plan.usages {
            self.ledger.save(usage, owner).await?;
        }

        if !plan.shortages.is_empty() {
            tracing::warn!(
                waste_id = %waste.id,
                shortages = plan.shortages.len(),
                "waste recorded over low or negative stock"
            );
        }

        Ok(WasteReceipt {
            waste,
            deductions,
            shortages: plan.shortages,
        })
    }

    /// Delete a waste event and every deduction it owns; same two-phase
    /// cascade as sale deletion.
    pub async fn delete(&self, owner: &str, waste_id: &str) -> AppResult<bool> {
        let _guard = self.locks.acquire(owner).await;

        let transactions = self.ledger.list(owner).await?;
        let linked = cascade::linked_record_ids(&transactions, waste_id, CascadeLink::Waste);

        let mut failed = Vec::new();
        for id in linked {
            match self.ledger.delete(&id, owner).await {
                Ok(true) => {}
                Ok(false) => failed.push(id),
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "cascade delete of deduction failed");
                    failed.push(id);
                }
            }
        }
        if !failed.is_empty() {
            return Err(AppError::CascadeIncomplete {
                summary_id: waste_id.to_string(),
                failed,
            });
        }

        self.ledger.delete(waste_id, owner).await
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
