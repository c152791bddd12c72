//! HTTP handlers for waste endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::waste::{CreateWasteInput, WasteReceipt, WasteService};
use crate::AppState;
use shared::models::Transaction;
use shared::validation::WASTE_REASONS;

/// Waste history, newest first
pub async fn list_waste(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Transaction>>> {
    let service = WasteService::new(state.db, state.locks);
    let wastes = service.list(&current_user.0.email).await?;
    Ok(Json(wastes))
}

/// The fixed reason catalog clients must pick from
pub async fn list_waste_reasons() -> Json<Vec<&'static str>> {
    Json(WASTE_REASONS.to_vec())
}

/// Register a waste event with its stock deductions
pub async fn create_waste(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateWasteInput>,
) -> AppResult<Json<WasteReceipt>> {
    let service = WasteService::new(state.db, state.locks);
    let receipt = service.create(&current_user.0.email, input).await?;
    Ok(Json(receipt))
}

/// Delete a waste event and every deduction it owns
pub async fn delete_waste(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(waste_id): Path<String>,
) -> AppResult<Json<bool>> {
    let service = WasteService::new(state.db, state.locks);
    let deleted = service.delete(&current_user.0.email, &waste_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Waste record".to_string()));
    }
    Ok(Json(true))
}
