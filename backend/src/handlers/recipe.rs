//! HTTP handlers for recipe endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::recipe::{PricePreviewInput, PriceQuote, RecipeService, SaveRecipeInput};
use crate::AppState;
use shared::models::Transaction;

/// List all recipes
pub async fn list_recipes(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Transaction>>> {
    let service = RecipeService::new(state.db);
    let recipes = service.list(&current_user.0.email).await?;
    Ok(Json(recipes))
}

/// Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SaveRecipeInput>,
) -> AppResult<Json<Transaction>> {
    let service = RecipeService::new(state.db);
    let recipe = service.save(&current_user.0.email, input).await?;
    Ok(Json(recipe))
}

/// Update a recipe in place
pub async fn update_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<String>,
    Json(mut input): Json<SaveRecipeInput>,
) -> AppResult<Json<Transaction>> {
    input.id = Some(recipe_id);
    let service = RecipeService::new(state.db);
    let recipe = service.save(&current_user.0.email, input).await?;
    Ok(Json(recipe))
}

/// Delete a recipe (historical sales keep their own usage records)
pub async fn delete_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<String>,
) -> AppResult<Json<bool>> {
    let service = RecipeService::new(state.db);
    let deleted = service.delete(&current_user.0.email, &recipe_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Recipe".to_string()));
    }
    Ok(Json(true))
}

/// Solve margin↔price for a given cost without saving
pub async fn price_preview(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<PricePreviewInput>,
) -> AppResult<Json<PriceQuote>> {
    let service = RecipeService::new(state.db);
    let quote = service.price_preview(input)?;
    Ok(Json(quote))
}
