//! Rum product recipe models
//!
//! Finished rum products are made from a proofed base spirit plus flavouring
//! ingredients. Recipes are reference data written against a master batch
//! volume; the dilution calculator scales them to the volume actually made.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recipe categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecipeCategory {
    Flavored,
    Spiced,
    Dark,
    Liqueur,
}

impl std::fmt::Display for RecipeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeCategory::Flavored => write!(f, "Flavored"),
            RecipeCategory::Spiced => write!(f, "Spiced"),
            RecipeCategory::Dark => write!(f, "Dark"),
            RecipeCategory::Liqueur => write!(f, "Liqueur"),
        }
    }
}

/// Base spirit the recipe was written against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseSpirit {
    /// Master batch volume the ingredient amounts refer to
    pub target_volume_l: f64,
    pub source_volume_l: Option<f64>,
    pub source_abv_percent: f64,
    /// Informational only; recomputed whenever a batch is scaled
    pub scaling_factor: Option<f64>,
}

/// Unit an ingredient amount is expressed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AmountUnit {
    Ml,
    G,
}

impl AmountUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountUnit::Ml => "ml",
            AmountUnit::G => "g",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    pub amount_ml: Option<f64>,
    pub amount_g: Option<f64>,
    pub note: Option<String>,
}

impl RecipeIngredient {
    pub fn volume(name: &str, amount_ml: f64, note: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            amount_ml: Some(amount_ml),
            amount_g: None,
            note: note.map(str::to_string),
        }
    }

    pub fn mass(name: &str, amount_g: f64, note: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            amount_ml: None,
            amount_g: Some(amount_g),
            note: note.map(str::to_string),
        }
    }

    /// Volume amount if non-zero, else mass amount if non-zero
    pub fn amount(&self) -> Option<(f64, AmountUnit)> {
        match (self.amount_ml, self.amount_g) {
            (Some(ml), _) if ml != 0.0 => Some((ml, AmountUnit::Ml)),
            (_, Some(g)) if g != 0.0 => Some((g, AmountUnit::G)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RumProductRecipe {
    pub id: String,
    pub name: String,
    pub added_on: Option<NaiveDate>,
    pub category: RecipeCategory,
    /// Bottling strength the base spirit is proofed down to
    pub target_abv_percent: f64,
    pub base_spirit: BaseSpirit,
    pub ingredients: Vec<RecipeIngredient>,
    pub notes: Option<String>,
}

impl RumProductRecipe {
    pub fn master_batch_volume_l(&self) -> f64 {
        self.base_spirit.target_volume_l
    }

    /// Match by id or name; case-insensitive, `_` and `-` interchangeable
    pub fn matches(&self, name_or_id: &str) -> bool {
        let wanted = name_or_id.trim().to_lowercase();
        self.id == wanted.replace('_', "-") || self.name.to_lowercase() == wanted
    }
}

/// Listing entry for recipe pickers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub category: RecipeCategory,
    pub target_abv_percent: f64,
}

/// The set of recipes the dilution calculator can work from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeCatalog {
    recipes: Vec<RumProductRecipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<RumProductRecipe>) -> Self {
        Self { recipes }
    }

    /// The house rum product recipes
    pub fn builtin() -> Self {
        Self::new(vec![
            RumProductRecipe {
                id: "pineapple-rum".to_string(),
                name: "Pineapple Rum".to_string(),
                added_on: NaiveDate::from_ymd_opt(2025, 8, 28),
                category: RecipeCategory::Flavored,
                target_abv_percent: 40.0,
                base_spirit: BaseSpirit {
                    target_volume_l: 255.0,
                    source_volume_l: Some(96.0),
                    source_abv_percent: 40.0,
                    scaling_factor: Some(137.1428571),
                },
                ingredients: vec![
                    RecipeIngredient::volume("Pineapple Flavour", 30.0, Some("ok")),
                    RecipeIngredient::volume("Glycerin", 200.0, Some("ok")),
                ],
                notes: None,
            },
            RumProductRecipe {
                id: "spiced-rum".to_string(),
                name: "Spiced Rum".to_string(),
                added_on: NaiveDate::from_ymd_opt(2025, 8, 27),
                category: RecipeCategory::Spiced,
                target_abv_percent: 40.0,
                base_spirit: BaseSpirit {
                    target_volume_l: 136.0,
                    source_volume_l: Some(75.0),
                    source_abv_percent: 40.0,
                    scaling_factor: Some(107.1428571),
                },
                ingredients: vec![
                    RecipeIngredient::mass("Cinnamon", 51.0, Some("ok but can reduce")),
                    RecipeIngredient::mass("Cardamom", 7.0, Some("ok")),
                    RecipeIngredient::mass("Cloves", 3.0, Some("ok")),
                    RecipeIngredient::mass("Star Anise", 4.0, Some("ok")),
                    RecipeIngredient::mass("Orange Peel", 220.0, Some("increase by 10g")),
                    RecipeIngredient::mass("Lime Peel", 220.0, Some("increase by 10g")),
                    RecipeIngredient::volume("Vanilla Essence", 100.0, Some("ok")),
                    RecipeIngredient::volume("Glycerine", 85.0, Some("ok")),
                ],
                notes: None,
            },
            RumProductRecipe {
                id: "merchant-made-dark-rum".to_string(),
                name: "Merchant Made Dark Rum".to_string(),
                added_on: None,
                category: RecipeCategory::Dark,
                target_abv_percent: 37.5,
                base_spirit: BaseSpirit {
                    target_volume_l: 281.0,
                    source_volume_l: None,
                    source_abv_percent: 37.5,
                    scaling_factor: None,
                },
                ingredients: vec![
                    RecipeIngredient::volume("Caramel Colour", 175.0, None),
                    RecipeIngredient::volume("Glycerine", 150.0, None),
                    RecipeIngredient::volume("Caramel Flavour (Monin)", 300.0, None),
                ],
                notes: None,
            },
        ])
    }

    pub fn find(&self, name_or_id: &str) -> Option<&RumProductRecipe> {
        self.recipes.iter().find(|r| r.matches(name_or_id))
    }

    pub fn list(&self) -> Vec<RecipeSummary> {
        self.recipes
            .iter()
            .map(|r| RecipeSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                category: r.category,
                target_abv_percent: r.target_abv_percent,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
