//! Litres of Absolute Alcohol (LAL) calculations
//!
//! All functions return full-precision values. Rounding for display happens in
//! [`crate::display`], so composed calculations do not accumulate rounding error.
//! Absent inputs propagate as `None`; callers that want zero-filling coerce
//! first with [`crate::coercion::to_number_or_null`].

use serde::{Deserialize, Serialize};

use crate::display::round_to;
use crate::types::Measurement;

/// Tolerance between hearts LAL and final output LAL before flagging a discrepancy
pub const DILUTION_LAL_TOLERANCE: f64 = 0.2;

/// LAL = volume × ABV / 100
pub fn lal(volume_l: Option<f64>, abv_percent: Option<f64>) -> Option<f64> {
    Some(volume_l? * abv_percent? / 100.0)
}

/// ABV implied by a volume and its LAL, rounded to 3 decimal places
pub fn implied_abv(volume_l: Option<f64>, lal: Option<f64>) -> Option<f64> {
    let volume = volume_l.filter(|v| *v > 0.0)?;
    Some(round_to(lal? / volume * 100.0, 3))
}

/// Alcohol lost between input and output
pub fn loss(lal_in: Option<f64>, lal_out: Option<f64>) -> Option<f64> {
    Some(lal_in? - lal_out?)
}

pub fn loss_percent(lal_in: Option<f64>, loss: Option<f64>) -> Option<f64> {
    let lal_in = lal_in.filter(|v| *v > 0.0)?;
    Some(loss? / lal_in * 100.0)
}

/// Output alcohol exceeding input alcohol is a data-entry error, not a gain
pub fn has_data_issue(lal_in: Option<f64>, lal_out: Option<f64>) -> bool {
    matches!((lal_in, lal_out), (Some(lal_in), Some(lal_out)) if lal_out > lal_in)
}

pub fn heart_yield_percent(hearts_lal: Option<f64>, lal_in: Option<f64>) -> Option<f64> {
    let lal_in = lal_in.filter(|v| *v > 0.0)?;
    Some(hearts_lal? / lal_in * 100.0)
}

/// ABV of a blend from its total LAL and volume; 0 for an empty blend
pub fn blended_abv(total_lal: f64, total_volume_l: f64) -> f64 {
    if total_volume_l == 0.0 {
        0.0
    } else {
        total_lal / total_volume_l * 100.0
    }
}

/// ABV after adding water; LAL is conserved, only the volume changes
pub fn final_abv(total_lal: f64, initial_volume_l: f64, water_added_l: f64) -> f64 {
    blended_abv(total_lal, initial_volume_l + water_added_l)
}

/// Water required to bring a spirit down to `target_abv`.
///
/// Returns 0 when the spirit is already at or below the target.
pub fn water_needed(current_lal: f64, current_volume_l: f64, target_abv: f64) -> f64 {
    if target_abv == 0.0 {
        return 0.0;
    }
    let current_abv = blended_abv(current_lal, current_volume_l);
    if current_abv <= target_abv {
        return 0.0;
    }
    current_lal / target_abv * 100.0 - current_volume_l
}

/// Reasons a LAL figure could not be produced or looks wrong
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LalFlag {
    MissingAbv,
    MissingVolume,
    LalDiscrepancy,
    IncompleteData,
}

/// A LAL value together with the reasons it may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LalResult {
    pub value: Option<f64>,
    pub flags: Vec<LalFlag>,
}

impl LalResult {
    pub(crate) fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            flags: Vec::new(),
        }
    }

    pub(crate) fn flagged(flag: LalFlag) -> Self {
        Self {
            value: None,
            flags: vec![flag],
        }
    }
}

/// Use a supplied LAL untouched, otherwise compute it, otherwise say why not
pub fn resolve_lal(
    volume_l: Option<f64>,
    abv_percent: Option<f64>,
    existing_lal: Option<f64>,
) -> LalResult {
    if let Some(existing) = existing_lal {
        return LalResult::value(existing);
    }
    match (volume_l, abv_percent) {
        (Some(volume), Some(abv)) => LalResult::value(volume * abv / 100.0),
        (Some(_), None) => LalResult::flagged(LalFlag::MissingAbv),
        (None, _) => LalResult::flagged(LalFlag::MissingVolume),
    }
}

/// Sum the LAL of several segments, collecting flags for the ones that cannot be resolved
pub fn sum_segments_lal(segments: &[Measurement]) -> LalResult {
    let mut total = 0.0;
    let mut flags = Vec::new();

    for segment in segments {
        let resolved = resolve_lal(segment.volume_l, segment.abv_percent, segment.lal);
        match resolved.value {
            Some(value) => total += value,
            None => flags.extend(resolved.flags),
        }
    }

    LalResult {
        value: Some(total),
        flags,
    }
}

/// Compare hearts LAL with the LAL of the diluted final output.
///
/// Dilution adds only water, so the two should agree within
/// [`DILUTION_LAL_TOLERANCE`].
pub fn check_dilution_invariance(
    hearts_lal: Option<f64>,
    final_output_lal: Option<f64>,
) -> LalResult {
    match (hearts_lal, final_output_lal) {
        (Some(hearts), Some(final_lal)) => {
            let mut result = LalResult::value(final_lal);
            if (hearts - final_lal).abs() > DILUTION_LAL_TOLERANCE {
                result.flags.push(LalFlag::LalDiscrepancy);
            }
            result
        }
        _ => LalResult::flagged(LalFlag::IncompleteData),
    }
}

/// Recovery and loss indicators for one distillation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchKpi {
    pub hearts_lal: Option<f64>,
    pub heads_lal: Option<f64>,
    pub tails_lal: Option<f64>,
    pub charge_lal: Option<f64>,
    pub out_lal: Option<f64>,
    pub losses_lal: Option<f64>,
    pub hearts_recovery_pct: Option<f64>,
    pub total_recovery_pct: Option<f64>,
    pub losses_pct: Option<f64>,
    pub heads_ratio_pct: Option<f64>,
    pub tails_ratio_pct: Option<f64>,
    pub flags: Vec<LalFlag>,
}

impl BatchKpi {
    pub fn compute(
        charge_lal: Option<f64>,
        hearts: &LalResult,
        heads: &LalResult,
        tails: &LalResult,
    ) -> Self {
        let mut kpi = BatchKpi {
            hearts_lal: hearts.value,
            heads_lal: heads.value,
            tails_lal: tails.value,
            charge_lal,
            ..Default::default()
        };

        match (charge_lal.filter(|c| *c > 0.0), hearts.value, heads.value, tails.value) {
            (Some(charge), Some(hearts_lal), Some(heads_lal), Some(tails_lal)) => {
                let out = hearts_lal + heads_lal + tails_lal;
                let total_recovery = out / charge * 100.0;
                kpi.out_lal = Some(out);
                kpi.losses_lal = Some(charge - out);
                kpi.hearts_recovery_pct = Some(hearts_lal / charge * 100.0);
                kpi.total_recovery_pct = Some(total_recovery);
                kpi.losses_pct = Some(100.0 - total_recovery);
                kpi.heads_ratio_pct = Some(heads_lal / charge * 100.0);
                kpi.tails_ratio_pct = Some(tails_lal / charge * 100.0);
            }
            _ => kpi.flags.push(LalFlag::IncompleteData),
        }

        for result in [hearts, tails, heads] {
            kpi.flags.extend(result.flags.iter().copied());
        }
        kpi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lal_basic() {
        assert_eq!(lal(Some(100.0), Some(40.0)), Some(40.0));
        assert_eq!(lal(Some(0.0), Some(40.0)), Some(0.0));
    }

    #[test]
    fn test_lal_propagates_null() {
        assert_eq!(lal(None, Some(40.0)), None);
        assert_eq!(lal(Some(100.0), None), None);
    }

    #[test]
    fn test_implied_abv_rounds_to_three_places() {
        assert_eq!(implied_abv(Some(30.0), Some(22.0)), Some(73.333));
        assert_eq!(implied_abv(Some(0.0), Some(22.0)), None);
        assert_eq!(implied_abv(Some(-5.0), Some(22.0)), None);
        assert_eq!(implied_abv(None, Some(22.0)), None);
        assert_eq!(implied_abv(Some(30.0), None), None);
    }

    #[test]
    fn test_loss_and_percent() {
        let l = loss(Some(200.0), Some(180.0));
        assert_eq!(l, Some(20.0));
        assert!(approx(loss_percent(Some(200.0), l).unwrap(), 10.0));
        assert_eq!(loss(None, Some(1.0)), None);
        assert_eq!(loss_percent(Some(0.0), Some(1.0)), None);
    }

    #[test]
    fn test_data_issue() {
        assert!(has_data_issue(Some(100.0), Some(120.0)));
        assert!(!has_data_issue(Some(100.0), Some(100.0)));
        assert!(!has_data_issue(None, Some(120.0)));
    }

    #[test]
    fn test_heart_yield() {
        assert_eq!(heart_yield_percent(Some(50.0), Some(200.0)), Some(25.0));
        assert_eq!(heart_yield_percent(Some(50.0), Some(0.0)), None);
        assert_eq!(heart_yield_percent(None, Some(200.0)), None);
    }

    #[test]
    fn test_water_needed() {
        // 100 L at 60% holds 60 LAL; at 40% that is 150 L
        assert!(approx(water_needed(60.0, 100.0, 40.0), 50.0));
        assert_eq!(water_needed(30.0, 100.0, 40.0), 0.0);
        assert_eq!(water_needed(60.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn test_final_abv_conserves_lal() {
        let abv = final_abv(60.0, 100.0, 50.0);
        assert!(approx(abv, 40.0));
        assert_eq!(final_abv(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_resolve_lal_prefers_existing() {
        let r = resolve_lal(Some(10.0), Some(50.0), Some(4.8));
        assert_eq!(r.value, Some(4.8));
        assert!(r.flags.is_empty());
    }

    #[test]
    fn test_resolve_lal_flags() {
        assert_eq!(resolve_lal(Some(10.0), None, None).flags, vec![LalFlag::MissingAbv]);
        assert_eq!(resolve_lal(None, Some(50.0), None).flags, vec![LalFlag::MissingVolume]);
    }

    #[test]
    fn test_sum_segments_skips_unresolvable() {
        let segments = [
            Measurement::new(Some(10.0), Some(50.0), None),
            Measurement::new(Some(5.0), None, None),
            Measurement::new(None, None, Some(2.5)),
        ];
        let r = sum_segments_lal(&segments);
        assert_eq!(r.value, Some(7.5));
        assert_eq!(r.flags, vec![LalFlag::MissingAbv]);
    }

    #[test]
    fn test_dilution_invariance() {
        assert!(check_dilution_invariance(Some(50.0), Some(49.9)).flags.is_empty());
        assert_eq!(
            check_dilution_invariance(Some(50.0), Some(49.0)).flags,
            vec![LalFlag::LalDiscrepancy]
        );
        assert_eq!(
            check_dilution_invariance(None, Some(49.0)).flags,
            vec![LalFlag::IncompleteData]
        );
    }

    #[test]
    fn test_batch_kpi() {
        let kpi = BatchKpi::compute(
            Some(100.0),
            &LalResult::value(60.0),
            &LalResult::value(5.0),
            &LalResult::value(25.0),
        );
        assert_eq!(kpi.out_lal, Some(90.0));
        assert_eq!(kpi.losses_lal, Some(10.0));
        assert!(approx(kpi.hearts_recovery_pct.unwrap(), 60.0));
        assert!(approx(kpi.losses_pct.unwrap(), 10.0));
        assert!(kpi.flags.is_empty());
    }

    #[test]
    fn test_batch_kpi_incomplete() {
        let kpi = BatchKpi::compute(
            None,
            &LalResult::value(60.0),
            &LalResult::flagged(LalFlag::MissingAbv),
            &LalResult::value(25.0),
        );
        assert_eq!(kpi.out_lal, None);
        assert!(kpi.flags.contains(&LalFlag::IncompleteData));
        assert!(kpi.flags.contains(&LalFlag::MissingAbv));
    }
}
