//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::sale::{CreateSaleInput, SaleReceipt, SaleService};
use crate::AppState;
use shared::models::Transaction;

/// Sale history, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Transaction>>> {
    let service = SaleService::new(state.db, state.locks);
    let sales = service.list(&current_user.0.email).await?;
    Ok(Json(sales))
}

/// Register a product sale with its stock deductions
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<SaleReceipt>> {
    let service = SaleService::new(state.db, state.locks);
    let receipt = service.create(&current_user.0.email, input).await?;
    Ok(Json(receipt))
}

/// Delete a sale and every usage record it owns
pub async fn delete_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<String>,
) -> AppResult<Json<bool>> {
    let service = SaleService::new(state.db, state.locks);
    let deleted = service.delete(&current_user.0.email, &sale_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Sale".to_string()));
    }
    Ok(Json(true))
}
