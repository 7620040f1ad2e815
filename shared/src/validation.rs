//! Validation utilities for the Distillery Operations Platform
//!
//! Input checks for figures a person types in. Measured data coming from
//! import files is never rejected here; it is coerced and flagged instead.

// ============================================================================
// Strength and Volume Validations
// ============================================================================

/// ABV must be above 0% and at most 100%
pub fn validate_abv_percent(abv: f64) -> Result<(), &'static str> {
    if abv.is_nan() {
        return Err("ABV must be a number");
    }
    if abv <= 0.0 {
        return Err("ABV must be greater than 0%");
    }
    if abv > 100.0 {
        return Err("ABV cannot exceed 100%");
    }
    Ok(())
}

/// A volume to be processed must be positive
pub fn validate_volume(volume_l: f64) -> Result<(), &'static str> {
    if volume_l.is_nan() || volume_l <= 0.0 {
        return Err("Volume must be greater than zero");
    }
    if volume_l.is_infinite() {
        return Err("Volume must be finite");
    }
    Ok(())
}

/// Water added in a dilution phase cannot be negative
pub fn validate_water_added(water_l: f64) -> Result<(), &'static str> {
    if water_l.is_nan() || water_l < 0.0 {
        return Err("Water added cannot be negative");
    }
    Ok(())
}

/// Target strength must be reachable by adding water
pub fn validate_dilution_target(input_abv: f64, target_abv: f64) -> Result<(), &'static str> {
    validate_abv_percent(target_abv)?;
    if is_under_proof(input_abv, target_abv) {
        return Err("Source ABV is already below the target ABV");
    }
    Ok(())
}

pub fn is_under_proof(input_abv: f64, target_abv: f64) -> bool {
    input_abv < target_abv
}

// ============================================================================
// Bottling Validations
// ============================================================================

/// Bottle sizes seen in practice run from 50 ml miniatures to 20 L bag-in-box
pub fn validate_bottle_size(size_ml: u32) -> Result<(), &'static str> {
    if size_ml == 0 {
        return Err("Bottle size must be greater than zero");
    }
    if size_ml > 20_000 {
        return Err("Bottle size exceeds 20 L");
    }
    Ok(())
}

/// Check a batch code looks like `RUM-24-03` or `RAIN-24-3`
pub fn validate_batch_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Batch code is required");
    }
    if code.len() > 40 {
        return Err("Batch code must be at most 40 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Batch code may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}
