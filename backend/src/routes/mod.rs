//! Route definitions for the Kitchen Ledger backend

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - stock and inventory
        .nest("/stock", stock_routes())
        // Protected routes - recipes and pricing
        .nest("/recipes", recipe_routes())
        // Protected routes - sales
        .nest("/sales", sale_routes())
        // Protected routes - waste
        .nest("/waste", waste_routes())
        // Protected routes - reports
        .nest("/reports", report_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Stock and inventory routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/positions", get(handlers::list_positions))
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/:id", delete(handlers::delete_transaction))
        .route("/purchases", post(handlers::record_purchase))
        .route("/adjustments", post(handlers::adjust_stock))
        .route("/normalize", post(handlers::normalize_items))
        .route("/items", delete(handlers::delete_items))
        // Receipt import: extract first, persist after user confirmation
        .route("/receipt", post(handlers::read_receipt))
        .route("/receipt/confirm", post(handlers::confirm_receipt))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Recipe routes (protected)
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recipes).post(handlers::create_recipe))
        .route(
            "/:recipe_id",
            put(handlers::update_recipe).delete(handlers::delete_recipe),
        )
        .route("/price-preview", post(handlers::price_preview))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/:sale_id", delete(handlers::delete_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Waste routes (protected)
fn waste_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_waste).post(handlers::create_waste))
        .route("/reasons", get(handlers::list_waste_reasons))
        .route("/:waste_id", delete(handlers::delete_waste))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::business_summary))
        .route("/sales", get(handlers::sales_report))
        .route("/waste", get(handlers::waste_report))
        .route_layer(middleware::from_fn(auth_middleware))
}
