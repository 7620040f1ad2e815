//! HTTP handlers for the rum recipe calculator

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use shared::models::RecipeSummary;

use crate::error::AppResult;
use crate::services::recipe::{CalculateDilutionInput, DilutionResponse};
use crate::services::RecipeService;
use crate::AppState;

/// List the recipes the calculator can work from
pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<RecipeSummary>> {
    let service = RecipeService::new(state.recipes);
    Json(service.list_recipes())
}

/// Proof a volume of spirit for a recipe and scale its ingredients
pub async fn calculate_dilution(
    State(state): State<AppState>,
    payload: Result<Json<CalculateDilutionInput>, JsonRejection>,
) -> AppResult<Json<DilutionResponse>> {
    let Json(input) = payload?;
    let service = RecipeService::new(state.recipes);
    let response = service.calculate(input)?;
    Ok(Json(response))
}
