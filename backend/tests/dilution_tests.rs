//! Tests for the rum recipe dilution calculator
//! Verifies Property 2: LAL Conservation under proofing, and the simple dilution scenario

use proptest::prelude::*;
use shared::dilution::{calculate, calculate_by_name, DilutionError};
use shared::models::{
    AmountUnit, BaseSpirit, RecipeCatalog, RecipeCategory, RecipeIngredient, RumProductRecipe,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// A recipe written against a 100 L master batch at 40%
fn house_recipe() -> RumProductRecipe {
    RumProductRecipe {
        id: "test-rum".to_string(),
        name: "Test Rum".to_string(),
        added_on: None,
        category: RecipeCategory::Flavored,
        target_abv_percent: 40.0,
        base_spirit: BaseSpirit {
            target_volume_l: 100.0,
            source_volume_l: None,
            source_abv_percent: 40.0,
            scaling_factor: None,
        },
        ingredients: vec![
            RecipeIngredient::volume("Flavour", 30.0, None),
            RecipeIngredient::mass("Sugar", 500.0, None),
        ],
        notes: None,
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

mod scenarios {
    use super::*;

    /// 96 L at 60% proofed to 40% for a 100 L master batch
    #[test]
    fn simple_dilution() {
        let result = calculate(96.0, 60.0, &house_recipe()).unwrap();

        assert!(approx(result.total_volume_l, 144.0));
        assert!(approx(result.water_to_add_l, 48.0));
        assert!(approx(result.scale_factor, 1.44));

        let flavour = &result.ingredients[0];
        assert_eq!(flavour.unit, AmountUnit::Ml);
        assert!(approx(flavour.scaled_amount, 43.2));

        let sugar = &result.ingredients[1];
        assert_eq!(sugar.unit, AmountUnit::G);
        assert!(approx(sugar.scaled_amount, 720.0));
    }

    #[test]
    fn already_at_target_needs_no_water() {
        let result = calculate(50.0, 40.0, &house_recipe()).unwrap();
        assert!(approx(result.water_to_add_l, 0.0));
        assert!(approx(result.scale_factor, 0.5));
    }

    #[test]
    fn under_proof_source_is_rejected() {
        let err = calculate(96.0, 35.0, &house_recipe()).unwrap_err();
        assert_eq!(
            err,
            DilutionError::UnderProof {
                input_abv: 35.0,
                target_abv: 40.0
            }
        );
    }

    #[test]
    fn builtin_dark_rum_uses_its_own_target() {
        let catalog = RecipeCatalog::builtin();
        let result = calculate_by_name(&catalog, 75.0, 60.0, "Merchant Made Dark Rum").unwrap();
        assert!(approx(result.target_abv, 37.5));
        assert!(approx(result.total_volume_l, 120.0));
    }

    #[test]
    fn lookup_accepts_id_with_underscores() {
        let catalog = RecipeCatalog::builtin();
        assert!(calculate_by_name(&catalog, 96.0, 60.0, "spiced_rum").is_ok());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn volume_strategy() -> impl Strategy<Value = f64> {
        1.0..2000.0f64
    }

    /// Still strength, always at or above the 40% target
    fn abv_strategy() -> impl Strategy<Value = f64> {
        40.0..=96.0f64
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 2: LAL Conservation
        /// Proofing adds water only; alcohol in equals alcohol out
        #[test]
        fn prop_proofing_conserves_lal(volume in volume_strategy(), abv in abv_strategy()) {
            let result = calculate(volume, abv, &house_recipe()).unwrap();
            let lal_in = volume * abv / 100.0;
            let lal_out = result.total_volume_l * result.target_abv / 100.0;
            prop_assert!((lal_in - lal_out).abs() < 1e-6,
                "LAL not conserved: {} in, {} out", lal_in, lal_out);
        }

        /// Water added is never negative for an at-or-over-proof source
        #[test]
        fn prop_water_non_negative(volume in volume_strategy(), abv in abv_strategy()) {
            let result = calculate(volume, abv, &house_recipe()).unwrap();
            prop_assert!(result.water_to_add_l >= -1e-9);
            prop_assert!(approx(result.total_volume_l, volume + result.water_to_add_l));
        }

        /// Every ingredient scales by the same factor
        #[test]
        fn prop_ingredients_scale_uniformly(volume in volume_strategy(), abv in abv_strategy()) {
            let result = calculate(volume, abv, &house_recipe()).unwrap();
            for ingredient in &result.ingredients {
                prop_assert!(approx(
                    ingredient.scaled_amount,
                    ingredient.original_amount * result.scale_factor
                ));
            }
        }

        /// Anything below target strength is refused
        #[test]
        fn prop_under_proof_rejected(volume in volume_strategy(), abv in 0.1..39.9f64) {
            let is_under_proof = matches!(
                calculate(volume, abv, &house_recipe()),
                Err(DilutionError::UnderProof { .. })
            );
            prop_assert!(is_under_proof);
        }
    }
}
