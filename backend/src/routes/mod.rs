//! Route definitions for the Distillery Operations Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Ad-hoc LAL and yield figures
        .route("/lal", post(handlers::calculate_lal))
        .nest("/recipes", recipe_routes())
        .nest("/bottling", bottling_routes())
        .nest("/batches", batch_routes())
}

/// Rum recipe calculator routes
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recipes))
        .route("/calculate", post(handlers::calculate_dilution))
}

/// Bottling run routes
fn bottling_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", post(handlers::bottling_summary))
        .route("/balance", post(handlers::balance_bottles))
}

/// Batch record routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/merge", post(handlers::merge_batches))
        .route("/resolve", post(handlers::resolve_batch))
        .route("/import", post(handlers::import_batches))
}
