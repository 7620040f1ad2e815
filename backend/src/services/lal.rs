//! LAL and yield figures for ad-hoc values entered in the production views

use serde::{Deserialize, Serialize};
use shared::display::{display_loss, format_maybe};
use shared::lal;
use validator::Validate;

/// Figures for one LAL check; any of them may be missing
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LalInput {
    #[validate(range(min = 0.0, message = "Volume cannot be negative"))]
    pub volume_l: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "ABV must be between 0 and 100"))]
    pub abv_percent: Option<f64>,
    /// Measured LAL; used as given when present
    pub lal: Option<f64>,
    pub lal_in: Option<f64>,
    pub lal_out: Option<f64>,
    pub hearts_lal: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LalReport {
    pub lal: Option<f64>,
    pub implied_abv: Option<f64>,
    pub loss: Option<f64>,
    pub loss_percent: Option<f64>,
    pub has_data_issue: bool,
    pub heart_yield_percent: Option<f64>,
    /// Loss as shown to operators, `"check data"` on a data issue
    pub loss_display: String,
    pub heart_yield_display: String,
}

pub struct LalService;

impl LalService {
    /// Create a new LalService instance
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, input: &LalInput) -> LalReport {
        let lal = input.lal.or_else(|| lal::lal(input.volume_l, input.abv_percent));
        let has_data_issue = lal::has_data_issue(input.lal_in, input.lal_out);

        let (loss, loss_percent) = if has_data_issue {
            (None, None)
        } else {
            let loss = lal::loss(input.lal_in, input.lal_out);
            (loss, lal::loss_percent(input.lal_in, loss))
        };
        let heart_yield_percent = lal::heart_yield_percent(input.hearts_lal, input.lal_in);

        if has_data_issue {
            tracing::warn!(
                lal_in = ?input.lal_in,
                lal_out = ?input.lal_out,
                "LAL out exceeds LAL in"
            );
        }

        LalReport {
            lal,
            implied_abv: lal::implied_abv(input.volume_l, lal),
            loss,
            loss_percent,
            has_data_issue,
            heart_yield_percent,
            loss_display: display_loss(lal::loss(input.lal_in, input.lal_out), has_data_issue),
            heart_yield_display: format_maybe(heart_yield_percent, 1, "%"),
        }
    }
}

impl Default for LalService {
    fn default() -> Self {
        Self::new()
    }
}
