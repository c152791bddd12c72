//! HTTP handlers for stock and inventory endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::external::ReceiptVisionClient;
use crate::middleware::CurrentUser;
use crate::services::stock::{
    AdjustStockInput, BulkResult, DeleteItemsInput, NormalizeInput, RecordPurchaseInput,
    StockService,
};
use crate::AppState;
use shared::models::{ExtractedReceipt, InventoryPosition, StockView, Transaction};

#[derive(Debug, Deserialize)]
pub struct PositionsQuery {
    #[serde(default)]
    pub view: Option<StockView>,
}

/// Current stock positions in the requested view
pub async fn list_positions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PositionsQuery>,
) -> AppResult<Json<Vec<InventoryPosition>>> {
    let service = StockService::new(state.db, state.locks);
    let positions = service
        .positions(&current_user.0.email, query.view.unwrap_or_default())
        .await?;
    Ok(Json(positions))
}

/// Full transaction history for the account
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Transaction>>> {
    let service = StockService::new(state.db, state.locks);
    let transactions = service.transactions(&current_user.0.email).await?;
    Ok(Json(transactions))
}

/// Record a manual purchase
pub async fn record_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordPurchaseInput>,
) -> AppResult<Json<Transaction>> {
    let service = StockService::new(state.db, state.locks);
    let transaction = service
        .record_purchase(&current_user.0.email, input)
        .await?;
    Ok(Json(transaction))
}

/// Apply a set-to stock correction
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<()>> {
    let service = StockService::new(state.db, state.locks);
    service.adjust_stock(&current_user.0.email, input).await?;
    Ok(Json(()))
}

/// Merge item aliases into one canonical name
pub async fn normalize_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<NormalizeInput>,
) -> AppResult<Json<BulkResult>> {
    let service = StockService::new(state.db, state.locks);
    let result = service.normalize(&current_user.0.email, input).await?;
    Ok(Json(result))
}

/// Bulk delete history by item names, or everything
pub async fn delete_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<DeleteItemsInput>,
) -> AppResult<Json<BulkResult>> {
    let service = StockService::new(state.db, state.locks);
    let result = service.delete_items(&current_user.0.email, input).await?;
    Ok(Json(result))
}

/// Delete a single transaction by id
pub async fn delete_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let service = StockService::new(state.db, state.locks);
    let deleted = service.delete_transaction(&current_user.0.email, &id).await?;
    if !deleted {
        return Err(AppError::NotFound("Transaction".to_string()));
    }
    Ok(Json(true))
}

/// Read a receipt photo into an editable purchase draft
pub async fn read_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<ExtractedReceipt>> {
    let mut image: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::ValidationError(format!("Invalid upload: {}", e)))?;
            image = Some(bytes.to_vec());
        }
    }
    let image = image.ok_or_else(|| {
        AppError::ValidationError("Multipart field 'file' is required".to_string())
    })?;

    // Give the model the names already in stock so it reconciles labels.
    let service = StockService::new(state.db.clone(), state.locks.clone());
    let known_items: Vec<String> = service
        .positions(&current_user.0.email, StockView::Full)
        .await?
        .into_iter()
        .map(|p| p.item)
        .collect();

    let client = ReceiptVisionClient::from_config(&state.config)?;
    let receipt = client.extract_receipt(&image, &known_items).await?;
    Ok(Json(receipt))
}

/// Persist confirmed receipt lines as purchases
pub async fn confirm_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(receipt): Json<ExtractedReceipt>,
) -> AppResult<Json<BulkResult>> {
    let service = StockService::new(state.db, state.locks);
    let result = service.import_receipt(&current_user.0.email, receipt).await?;
    Ok(Json(result))
}
