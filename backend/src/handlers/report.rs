//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::report::ReportService;
use crate::AppState;
use shared::reporting::{
    BusinessSummary, ProductSalesRow, SalesSort, WasteByItemRow, WasteByReasonRow,
};

#[derive(Debug, Deserialize)]
pub struct SalesReportQuery {
    #[serde(default)]
    pub sort: Option<SalesSort>,
}

/// Waste report payload: both breakdowns together
#[derive(Debug, Serialize)]
pub struct WasteReport {
    pub by_item: Vec<WasteByItemRow>,
    pub by_reason: Vec<WasteByReasonRow>,
}

/// Business overview
pub async fn business_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<BusinessSummary>> {
    let service = ReportService::new(state.db);
    let summary = service.summary(&current_user.0.email).await?;
    Ok(Json(summary))
}

/// Sales performance by product
pub async fn sales_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SalesReportQuery>,
) -> AppResult<Json<Vec<ProductSalesRow>>> {
    let service = ReportService::new(state.db);
    let rows = service
        .sales(&current_user.0.email, query.sort.unwrap_or_default())
        .await?;
    Ok(Json(rows))
}

/// Waste losses by item and by reason
pub async fn waste_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<WasteReport>> {
    let service = ReportService::new(state.db);
    let (by_item, by_reason) = service.waste(&current_user.0.email).await?;
    Ok(Json(WasteReport { by_item, by_reason }))
}
