//! Recipe listing and dilution calculator service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::dilution::{self, DilutionResult};
use shared::models::{RecipeCatalog, RecipeSummary};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Recipe calculator form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CalculateDilutionInput {
    /// Recipe id or name
    #[validate(length(min = 1, message = "Recipe is required"))]
    pub recipe: String,
    #[validate(range(min = 0.0, message = "Volume cannot be negative"))]
    pub volume_l: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "ABV must be between 0 and 100"))]
    pub abv_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DilutionResponse {
    #[serde(flatten)]
    pub result: DilutionResult,
    /// Printable calculator sheet
    pub sheet: String,
}

pub struct RecipeService {
    catalog: Arc<RecipeCatalog>,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(catalog: Arc<RecipeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn list_recipes(&self) -> Vec<RecipeSummary> {
        self.catalog.list()
    }

    /// Proof a volume of spirit to the recipe's target and scale its ingredients
    pub fn calculate(&self, input: CalculateDilutionInput) -> AppResult<DilutionResponse> {
        input.validate()?;

        if input.recipe.trim().is_empty() {
            return Err(AppError::Validation {
                field: "recipe".to_string(),
                message: "Recipe is required".to_string(),
            });
        }

        let result = dilution::calculate_by_name(
            &self.catalog,
            input.volume_l,
            input.abv_percent,
            &input.recipe,
        )?;

        tracing::debug!(
            recipe = %result.recipe_id,
            total_volume_l = result.total_volume_l,
            water_to_add_l = result.water_to_add_l,
            scale_factor = result.scale_factor,
            "Dilution calculated"
        );

        Ok(DilutionResponse {
            sheet: result.to_string(),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dilution::DilutionError;

    fn service() -> RecipeService {
        RecipeService::new(Arc::new(RecipeCatalog::builtin()))
    }

    #[test]
    fn test_list_builtin_recipes() {
        let recipes = service().list_recipes();
        assert_eq!(recipes.len(), 3);
        assert!(recipes.iter().any(|r| r.id == "spiced-rum"));
    }

    #[test]
    fn test_calculate_pineapple() {
        let response = service()
            .calculate(CalculateDilutionInput {
                recipe: "Pineapple Rum".to_string(),
                volume_l: 96.0,
                abv_percent: 60.0,
            })
            .unwrap();
        assert!((response.result.total_volume_l - 144.0).abs() < 1e-9);
        assert!(response.sheet.contains("Pineapple Flavour"));
    }

    #[test]
    fn test_unknown_recipe_is_not_found() {
        let err = service()
            .calculate(CalculateDilutionInput {
                recipe: "banana-rum".to_string(),
                volume_l: 96.0,
                abv_percent: 60.0,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Dilution(DilutionError::RecipeNotFound(_))));
    }

    #[test]
    fn test_blank_recipe_rejected() {
        let err = service()
            .calculate(CalculateDilutionInput {
                recipe: "   ".to_string(),
                volume_l: 96.0,
                abv_percent: 60.0,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
