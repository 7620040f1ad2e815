//! HTTP handler for ad-hoc LAL and yield figures

use axum::{extract::rejection::JsonRejection, Json};
use validator::Validate;

use crate::error::AppResult;
use crate::services::lal::{LalInput, LalReport};
use crate::services::LalService;

/// Compute LAL, implied ABV, loss and heart yield from the supplied figures
pub async fn calculate_lal(
    payload: Result<Json<LalInput>, JsonRejection>,
) -> AppResult<Json<LalReport>> {
    let Json(input) = payload?;
    input.validate()?;
    Ok(Json(LalService::new().evaluate(&input)))
}
