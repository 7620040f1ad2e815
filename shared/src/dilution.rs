//! Dilution and ingredient scaling for rum product recipes
//!
//! Proofing uses a mass balance on alcohol, treating water as 0% ABV and
//! volumes as additive:
//!
//! ```text
//! total_volume = input_volume × input_abv / target_abv
//! water_to_add = total_volume − input_volume
//! scale_factor = total_volume / master_batch_volume
//! ```
//!
//! Ethanol/water volume contraction is ignored. At bottling strengths the
//! error is well inside what a hydrometer reading resolves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::round_to;
use crate::models::{AmountUnit, RecipeCatalog, RumProductRecipe};
use crate::validation::{validate_abv_percent, validate_volume};

/// Reasons a dilution cannot be calculated
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DilutionError {
    #[error("Input volume must be greater than zero (got {0} L)")]
    InvalidVolume(f64),

    #[error("Input ABV must be above 0% and at most 100% (got {0}%)")]
    InvalidAbv(f64),

    #[error("Source at {input_abv}% ABV is already below the {target_abv}% target")]
    UnderProof { input_abv: f64, target_abv: f64 },

    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    #[error("Recipe {0} has no usable master batch volume")]
    InvalidMasterBatch(String),
}

/// An ingredient amount scaled to the batch being made
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaledIngredient {
    pub name: String,
    pub original_amount: f64,
    pub unit: AmountUnit,
    pub scaled_amount: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DilutionResult {
    pub input_volume_l: f64,
    pub input_abv: f64,
    pub recipe_id: String,
    pub recipe_name: String,
    /// Volume at target strength
    pub total_volume_l: f64,
    pub water_to_add_l: f64,
    pub scale_factor: f64,
    pub target_abv: f64,
    pub master_batch_l: f64,
    pub ingredients: Vec<ScaledIngredient>,
}

/// Proof `input_volume_l` of spirit at `input_abv` down to the recipe's target strength
pub fn calculate(
    input_volume_l: f64,
    input_abv: f64,
    recipe: &RumProductRecipe,
) -> Result<DilutionResult, DilutionError> {
    validate_volume(input_volume_l).map_err(|_| DilutionError::InvalidVolume(input_volume_l))?;
    validate_abv_percent(input_abv).map_err(|_| DilutionError::InvalidAbv(input_abv))?;

    let target_abv = recipe.target_abv_percent;
    if validate_abv_percent(target_abv).is_err() {
        return Err(DilutionError::InvalidAbv(target_abv));
    }
    if input_abv < target_abv {
        return Err(DilutionError::UnderProof {
            input_abv,
            target_abv,
        });
    }

    let master_batch_l = recipe.master_batch_volume_l();
    if !(master_batch_l > 0.0) {
        return Err(DilutionError::InvalidMasterBatch(recipe.id.clone()));
    }

    let total_volume_l = input_volume_l * input_abv / target_abv;
    let water_to_add_l = total_volume_l - input_volume_l;
    let scale_factor = total_volume_l / master_batch_l;

    let ingredients = recipe
        .ingredients
        .iter()
        .filter_map(|ingredient| {
            let (amount, unit) = ingredient.amount()?;
            Some(ScaledIngredient {
                name: ingredient.name.clone(),
                original_amount: amount,
                unit,
                scaled_amount: amount * scale_factor,
                note: ingredient.note.clone(),
            })
        })
        .collect();

    Ok(DilutionResult {
        input_volume_l,
        input_abv,
        recipe_id: recipe.id.clone(),
        recipe_name: recipe.name.clone(),
        total_volume_l,
        water_to_add_l,
        scale_factor,
        target_abv,
        master_batch_l,
        ingredients,
    })
}

/// Look the recipe up by id or name, then calculate
pub fn calculate_by_name(
    catalog: &RecipeCatalog,
    input_volume_l: f64,
    input_abv: f64,
    recipe_name: &str,
) -> Result<DilutionResult, DilutionError> {
    let recipe = catalog
        .find(recipe_name)
        .ok_or_else(|| DilutionError::RecipeNotFound(recipe_name.to_string()))?;
    calculate(input_volume_l, input_abv, recipe)
}

impl std::fmt::Display for DilutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} Calculator", self.recipe_name)?;
        writeln!(f)?;
        writeln!(f, "INPUT:")?;
        writeln!(f, "   Rum Volume: {:.2} L", round_to(self.input_volume_l, 2))?;
        writeln!(f, "   Rum ABV: {:.1}%", round_to(self.input_abv, 1))?;
        writeln!(f)?;
        writeln!(f, "DILUTION:")?;
        writeln!(f, "   Target ABV: {:.1}%", round_to(self.target_abv, 1))?;
        writeln!(f, "   Water to Add: {:.2} L", round_to(self.water_to_add_l, 2))?;
        writeln!(f, "   Final Volume: {:.2} L", round_to(self.total_volume_l, 2))?;
        writeln!(f)?;
        writeln!(f, "SCALING:")?;
        writeln!(f, "   Master Batch: {} L", self.master_batch_l)?;
        writeln!(f, "   Scale Factor: {:.4}", round_to(self.scale_factor, 4))?;
        writeln!(f)?;
        write!(f, "INGREDIENTS:")?;
        for ingredient in &self.ingredients {
            write!(
                f,
                "\n   {}: {:.2} {}",
                ingredient.name,
                round_to(ingredient.scaled_amount, 2),
                ingredient.unit.as_str()
            )?;
            if let Some(note) = &ingredient.note {
                write!(f, " ({})", note)?;
            }
        }
        Ok(())
    }
}
