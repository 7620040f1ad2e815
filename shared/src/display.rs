//! Presentation rounding and formatting
//!
//! Calculators return full-precision floats. Values are rounded here, at the
//! display boundary, using decimal arithmetic so that `1.005` rounds to `1.01`
//! as a person reading the figure would expect.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder shown for a value that is not available
pub const MISSING: &str = "—";

/// Shown instead of a loss figure when output alcohol exceeds input alcohol
pub const CHECK_DATA: &str = "check data";

/// Round half away from zero to `places` decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // Display gives the shortest representation that round-trips
    match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => decimal
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        // Outside Decimal's range; plain float rounding is good enough there
        Err(_) => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
    }
}

/// Format an optional figure with a fixed number of places and a unit suffix
pub fn format_maybe(value: Option<f64>, places: u32, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.*}{}", places as usize, round_to(v, places), suffix),
        None => MISSING.to_string(),
    }
}

/// Render a loss figure, or a prompt to check the data when it cannot be valid
pub fn display_loss(loss: Option<f64>, has_data_issue: bool) -> String {
    if has_data_issue {
        CHECK_DATA.to_string()
    } else {
        format_maybe(loss, 2, " L")
    }
}
