//! HTTP handlers for batch record merging, resolution and import

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::error::AppResult;
use crate::services::batch::{ImportReport, ResolvedBatch};
use crate::services::BatchService;
use crate::AppState;

/// Merge partial batch records by batch id
pub async fn merge_batches(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> AppResult<Json<Vec<Value>>> {
    let Json(records) = payload?;
    let service = BatchService::new(state.config.engine_config());
    Ok(Json(service.merge(records)))
}

/// Decode one raw batch record and resolve its cuts and yield
pub async fn resolve_batch(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ResolvedBatch>> {
    let Json(record) = payload?;
    let service = BatchService::new(state.config.engine_config());
    let resolved = service.resolve(record)?;
    Ok(Json(resolved))
}

/// Normalise a batch import file sent as the raw request body
pub async fn import_batches(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<ImportReport>> {
    let service = BatchService::new(state.config.engine_config());
    let report = service.import(&body)?;
    Ok(Json(report))
}
