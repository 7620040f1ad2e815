//! HTTP handlers for bottling run planning

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::AppResult;
use crate::services::bottling::{BalanceReport, BottlingPlanInput, BottlingReport};
use crate::services::BottlingService;

/// Summarise a bottling plan
pub async fn bottling_summary(
    payload: Result<Json<BottlingPlanInput>, JsonRejection>,
) -> AppResult<Json<BottlingReport>> {
    let Json(input) = payload?;
    let report = BottlingService::new().summarize(input)?;
    Ok(Json(report))
}

/// Scale the plan's bottle quantities to fit the final volume
pub async fn balance_bottles(
    payload: Result<Json<BottlingPlanInput>, JsonRejection>,
) -> AppResult<Json<BalanceReport>> {
    let Json(input) = payload?;
    let report = BottlingService::new().balance(input)?;
    Ok(Json(report))
}
