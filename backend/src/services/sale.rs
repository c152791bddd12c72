//! Product sale service
//!
//! Creation expands one sale into its summary plus per-ingredient usage
//! records; deletion reverses the expansion. Both run under the owner's
//! mutation lock because the store offers no multi-record transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::ledger::{LedgerService, OwnerLocks};
use shared::cascade::{self, CascadeLink, SaleOrder, StockShortage};
use shared::models::{StockView, Transaction, TxBody};
use shared::validation::validate_sale;
use shared::valuation;

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    ledger: LedgerService,
    locks: OwnerLocks,
}

/// Input for registering a product sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub recipe_id: String,
    pub qty: Decimal,
    /// Defaults to the recipe's sale price.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub sales_channel: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Result of registering a sale
#[derive(Debug, Serialize)]
pub struct SaleReceipt {
    pub sale: Transaction,
    /// Usage records written alongside the summary.
    pub deductions: usize,
    /// Ingredients that were already at or below zero stock. Advisory:
    /// the sale is recorded regardless.
    pub shortages: Vec<StockShortage>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool, locks: OwnerLocks) -> Self {
        Self {
            ledger: LedgerService::new(db),
            locks,
        }
    }

    /// All sale summaries, newest first.
    pub async fn list(&self, owner: &str) -> AppResult<Vec<Transaction>> {
        let mut sales: Vec<Transaction> = self
            .ledger
            .list(owner)
            .await?
            .into_iter()
            .filter(|tx| matches!(tx.body, TxBody::ProductSale(_)))
            .collect();
        sales.sort_by(|a, b| (b.id.len(), &b.id).cmp(&(a.id.len(), &a.id)));
        Ok(sales)
    }

    /// Register a sale of `qty` units of a recipe product.
    pub async fn create(&self, owner: &str, input: CreateSaleInput) -> AppResult<SaleReceipt> {
        let recipe_tx = self
            .ledger
            .get(&input.recipe_id, owner)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
        let TxBody::Recipe(recipe) = &recipe_tx.body else {
            return Err(AppError::NotFound("Recipe".to_string()));
        };

        let unit_price = input.unit_price.unwrap_or(recipe.sale_price);
        if let Err(msg) = validate_sale(input.qty, unit_price) {
            return Err(AppError::ValidationError(msg.to_string()));
        }

        let order = SaleOrder {
            qty: input.qty,
            unit_price,
            date: input.date.unwrap_or_else(today),
            client_name: input.client_name,
            client_phone: input.client_phone,
            client_address: input.client_address,
            sales_channel: input.sales_channel,
        };

        let _guard = self.locks.acquire(owner).await;

        let transactions = self.ledger.list(owner).await?;
        let positions = valuation::view(&transactions, StockView::Full);
        let sale_id = self.ledger.next_id();
        let plan =
            cascade::plan_product_sale(&sale_id, &recipe_tx.id, recipe, &order, &positions);

        let sale = self.ledger.save(plan.summary, owner).await?;
        let deductions = plan.usages.len();
        for usage in plan.usages {
            self.ledger.save(usage, owner).await?;
        }

        if !plan.shortages.is_empty() {
            tracing::warn!(
                sale_id = %sale.id,
                shortages = plan.shortages.len(),
                "sale recorded over low or negative stock"
            );
        }

        Ok(SaleReceipt {
            sale,
            deductions,
            shortages: plan.shortages,
        })
    }

    /// Delete a sale and every usage record it owns.
    ///
    /// Two-phase: linked records go first, the summary last, so a partial
    /// failure leaves the summary in place as the handle to retry from. A
    /// linked record that cannot be deleted is surfaced as the distinct
    /// cascade-incompleteness error, never a silent miss.
    pub async fn delete(&self, owner: &str, sale_id: &str) -> AppResult<bool> {
        let _guard = self.locks.acquire(owner).await;

        let transactions = self.ledger.list(owner).await?;
        let linked = cascade::linked_record_ids(&transactions, sale_id, CascadeLink::Sale);

        let mut failed = Vec::new();
        for id in linked {
            match self.ledger.delete(&id, owner).await {
                Ok(true) => {}
                Ok(false) => failed.push(id),
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "cascade delete of usage record failed");
                    failed.push(id);
                }
            }
        }
        if !failed.is_empty() {
            return Err(AppError::CascadeIncomplete {
                summary_id: sale_id.to_string(),
                failed,
            });
        }

        self.ledger.delete(sale_id, owner).await
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
