//! Stock service: valuation views, purchases, adjustments, the bulk
//! rename/normalizer and history deletion.
//!
//! Everything recomputes from the full partition on every call; nothing
//! incremental is persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::ledger::{LedgerService, OwnerLocks};
use shared::models::{
    ExtractedReceipt, InventoryPosition, StockEntry, StockView, Transaction, TxBody, TxKind,
};
use shared::types::{round_money, BaseUnit};
use shared::validation::{validate_item_name, validate_stock_entry};
use shared::valuation;

/// Stock service
#[derive(Clone)]
pub struct StockService {
    ledger: LedgerService,
    locks: OwnerLocks,
}

/// Input for recording a purchase
#[derive(Debug, Deserialize)]
pub struct RecordPurchaseInput {
    pub name: String,
    /// Number of packages bought.
    pub count: Decimal,
    /// Package size in the base unit; ignored for `UN` items.
    #[serde(default)]
    pub unit_size: Decimal,
    pub unit: BaseUnit,
    /// Total paid for the line.
    pub total: Decimal,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Input for a set-to stock correction
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    /// Item being corrected (current name).
    pub item: String,
    /// New canonical name; rename history when it differs.
    #[serde(default)]
    pub new_name: Option<String>,
    pub unit: BaseUnit,
    /// Target quantity the shelf actually holds.
    pub new_qty: Decimal,
    /// Target total value of that stock.
    pub new_total_value: Decimal,
    #[serde(default)]
    pub date: Option<String>,
}

/// Input for merging item aliases into one canonical name
#[derive(Debug, Deserialize)]
pub struct NormalizeInput {
    pub old_names: Vec<String>,
    pub new_name: String,
    pub new_unit: BaseUnit,
}

/// Input for bulk history deletion
#[derive(Debug, Deserialize)]
pub struct DeleteItemsInput {
    #[serde(default)]
    pub item_names: Vec<String>,
    #[serde(default)]
    pub delete_all: bool,
}

/// Count of records touched by a bulk operation
#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub affected: u64,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool, locks: OwnerLocks) -> Self {
        Self {
            ledger: LedgerService::new(db),
            locks,
        }
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    /// Recompute the requested positions view from the full partition.
    pub async fn positions(&self, owner: &str, view: StockView) -> AppResult<Vec<InventoryPosition>> {
        let transactions = self.ledger.list(owner).await?;
        Ok(valuation::view(&transactions, view))
    }

    /// Full transaction history, most recent id first.
    pub async fn transactions(&self, owner: &str) -> AppResult<Vec<Transaction>> {
        let mut transactions = self.ledger.list(owner).await?;
        transactions.sort_by(|a, b| (b.id.len(), &b.id).cmp(&(a.id.len(), &a.id)));
        Ok(transactions)
    }

    /// Record a manual purchase entry.
    pub async fn record_purchase(
        &self,
        owner: &str,
        input: RecordPurchaseInput,
    ) -> AppResult<Transaction> {
        let qty = match input.unit {
            BaseUnit::Each => input.count,
            BaseUnit::Grams | BaseUnit::Millilitres => input.count * input.unit_size,
        };
        if let Err(msg) = validate_stock_entry(&input.name, qty, input.total) {
            return Err(AppError::ValidationError(msg.to_string()));
        }

        let tx = Transaction::new(TxBody::Purchase(StockEntry {
            description: input.name,
            qty,
            unit_measure: input.unit,
            unit_price: input.total / qty,
            total: round_money(input.total),
            store: input.store,
        }))
        .with_date(input.date.unwrap_or_else(today));

        self.ledger.save(tx, owner).await
    }

    /// Turn confirmed receipt lines into purchase records, one per line.
    /// Lines that fail validation are skipped; the count reports how many
    /// were actually written.
    pub async fn import_receipt(
        &self,
        owner: &str,
        receipt: ExtractedReceipt,
    ) -> AppResult<BulkResult> {
        let date = receipt.date.unwrap_or_else(today);
        let store = receipt.store;
        let mut affected = 0u64;

        for item in receipt.items {
            let qty = item.purchased_qty();
            if validate_stock_entry(&item.name, qty, item.total).is_err() {
                tracing::warn!(item = %item.name, "skipping unusable receipt line");
                continue;
            }
            let tx = Transaction::new(TxBody::Purchase(StockEntry {
                description: item.name.clone(),
                qty,
                unit_measure: item.unit,
                unit_price: item.unit_price(),
                total: round_money(item.total),
                store: store.clone(),
            }))
            .with_date(date.clone());
            self.ledger.save(tx, owner).await?;
            affected += 1;
        }

        Ok(BulkResult { affected })
    }

    /// Apply a set-to correction: optionally rename the item's history,
    /// then write one manual adjustment carrying the quantity and value
    /// deltas.
    pub async fn adjust_stock(&self, owner: &str, input: AdjustStockInput) -> AppResult<()> {
        if let Err(msg) = validate_item_name(&input.item) {
            return Err(AppError::ValidationError(msg.to_string()));
        }
        let _guard = self.locks.acquire(owner).await;

        let transactions = self.ledger.list(owner).await?;
        let positions = valuation::view(&transactions, StockView::Manageable);
        let key = input.item.trim().to_uppercase();
        let current = valuation::position_of(&positions, &key)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        let canonical = input
            .new_name
            .as_deref()
            .map(|n| n.trim().to_uppercase())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| current.item.clone());

        if canonical != current.item || input.unit != current.unit {
            self.rewrite_history(
                &transactions,
                owner,
                std::slice::from_ref(&current.item),
                &canonical,
                input.unit,
            )
            .await?;
        }

        let qty_delta = input.new_qty - current.quantity;
        let value_delta = input.new_total_value - current.total_value;
        if qty_delta != Decimal::ZERO || value_delta != Decimal::ZERO {
            let tx = Transaction::new(TxBody::Adjustment(StockEntry {
                description: canonical,
                qty: qty_delta,
                unit_measure: input.unit,
                unit_price: Decimal::ZERO,
                total: round_money(value_delta),
                store: Some("Ajuste".to_string()),
            }))
            .with_date(input.date.unwrap_or_else(today));
            self.ledger.save(tx, owner).await?;
        }

        Ok(())
    }

    /// Merge historical aliases of one item into a canonical name.
    ///
    /// Scans the partition, skips recipes and product sales (their
    /// description is a product label, not a stock key), rewrites every
    /// matching record in place and reports the rewrite count. This
    /// destructively edits history; the next valuation pass merges the
    /// aliased quantities because it keys purely on description.
    pub async fn normalize(&self, owner: &str, input: NormalizeInput) -> AppResult<BulkResult> {
        if let Err(msg) = validate_item_name(&input.new_name) {
            return Err(AppError::ValidationError(msg.to_string()));
        }
        if input.old_names.is_empty() {
            return Err(AppError::ValidationError(
                "At least one name to merge is required".to_string(),
            ));
        }

        let _guard = self.locks.acquire(owner).await;
        let transactions = self.ledger.list(owner).await?;
        let affected = self
            .rewrite_history(
                &transactions,
                owner,
                &input.old_names,
                &input.new_name,
                input.new_unit,
            )
            .await?;

        Ok(BulkResult { affected })
    }

    async fn rewrite_history(
        &self,
        transactions: &[Transaction],
        owner: &str,
        old_names: &[String],
        new_name: &str,
        new_unit: BaseUnit,
    ) -> AppResult<u64> {
        let canonical = new_name.trim().to_uppercase();
        let mut affected = 0u64;

        for tx in transactions {
            if matches!(tx.kind(), TxKind::Recipe | TxKind::ProductSale) {
                continue;
            }
            if !old_names.iter().any(|n| n == tx.body.description()) {
                continue;
            }
            let mut updated = tx.clone();
            *updated.body.description_mut() = canonical.clone();
            updated.body.set_unit_measure(new_unit);
            self.ledger.save(updated, owner).await?;
            affected += 1;
        }

        Ok(affected)
    }

    /// Delete history by item names, or the whole partition.
    /// Continues past individual failures; only successes are counted.
    pub async fn delete_items(&self, owner: &str, input: DeleteItemsInput) -> AppResult<BulkResult> {
        if !input.delete_all && input.item_names.is_empty() {
            return Err(AppError::ValidationError(
                "Either item_names or delete_all is required".to_string(),
            ));
        }

        let _guard = self.locks.acquire(owner).await;
        let transactions = self.ledger.list(owner).await?;
        let mut affected = 0u64;

        for tx in &transactions {
            let matches = input.delete_all
                || input
                    .item_names
                    .iter()
                    .any(|n| n == tx.body.description());
            if !matches {
                continue;
            }
            match self.ledger.delete(&tx.id, owner).await {
                Ok(true) => affected += 1,
                Ok(false) => {
                    tracing::warn!(id = %tx.id, "record vanished before bulk delete reached it")
                }
                Err(e) => tracing::warn!(id = %tx.id, error = %e, "bulk delete item failed"),
            }
        }

        Ok(BulkResult { affected })
    }

    /// Delete one record by id.
    pub async fn delete_transaction(&self, owner: &str, id: &str) -> AppResult<bool> {
        self.ledger.delete(id, owner).await
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
