//! Reporting service
//!
//! Thin I/O shell over the pure aggregations in `shared::reporting`.

use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::ledger::LedgerService;
use shared::reporting::{
    business_summary, sales_by_product, waste_breakdown, BusinessSummary, ProductSalesRow,
    SalesSort, WasteByItemRow, WasteByReasonRow,
};

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    ledger: LedgerService,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self {
            ledger: LedgerService::new(db),
        }
    }

    /// Business overview: cash totals and negative-stock alerts.
    pub async fn summary(&self, owner: &str) -> AppResult<BusinessSummary> {
        let transactions = self.ledger.list(owner).await?;
        Ok(business_summary(&transactions))
    }

    /// Sales grouped by product.
    pub async fn sales(&self, owner: &str, sort: SalesSort) -> AppResult<Vec<ProductSalesRow>> {
        let transactions = self.ledger.list(owner).await?;
        Ok(sales_by_product(&transactions, sort))
    }

    /// Waste losses by item and by reason.
    pub async fn waste(
        &self,
        owner: &str,
    ) -> AppResult<(Vec<WasteByItemRow>, Vec<WasteByReasonRow>)> {
        let transactions = self.ledger.list(owner).await?;
        Ok(waste_breakdown(&transactions))
    }
}
