//! Bottling run summary, plan validation and bottle balancing
//!
//! LAL is conserved through dilution: water adds volume but no alcohol, so the
//! final ABV is always recomputed from the drawn LAL over the final volume.

use thiserror::Error;

use crate::lal;
use crate::models::{
    BottleEntry, BottlingMode, BottlingSource, BottlingSummary, DilutionPhase,
    SelectedBatchAllocation,
};

/// Volume comparisons tolerate this much float noise
const VOLUME_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BottlingError {
    #[error("Planned bottling of {planned_l:.2} L exceeds the {available_l:.2} L available")]
    OverAllocated { planned_l: f64, available_l: f64 },
}

/// Totals for a bottling run.
///
/// `remaining_volume_l` is negative when the bottles planned exceed the
/// liquid available; see [`validate_plan`].
pub fn calculate_summary(
    allocations: &[SelectedBatchAllocation],
    dilution_phases: &[DilutionPhase],
    bottle_entries: &[BottleEntry],
) -> BottlingSummary {
    let input_volume_l: f64 = allocations.iter().map(|a| a.volume_to_use_l).sum();
    let input_lal: f64 = allocations.iter().map(|a| a.lal).sum();
    let total_water_added_l: f64 = dilution_phases.iter().map(|p| p.water_added_l).sum();

    let final_volume_l = input_volume_l + total_water_added_l;
    let final_abv = if final_volume_l > 0.0 {
        input_lal / final_volume_l * 100.0
    } else {
        0.0
    };
    let planned_bottled_volume_l: f64 = bottle_entries.iter().map(|e| e.volume_bottled_l).sum();

    BottlingSummary {
        input_volume_l,
        input_lal,
        blended_abv: lal::blended_abv(input_lal, input_volume_l),
        total_water_added_l,
        final_volume_l,
        final_abv,
        planned_bottled_volume_l,
        remaining_volume_l: final_volume_l - planned_bottled_volume_l,
    }
}

/// Running volume and ABV after each dilution phase, in the order given
pub fn dilution_progression(
    allocations: &[SelectedBatchAllocation],
    dilution_phases: &[DilutionPhase],
) -> Vec<(f64, f64)> {
    let input_lal: f64 = allocations.iter().map(|a| a.lal).sum();
    let mut volume: f64 = allocations.iter().map(|a| a.volume_to_use_l).sum();

    dilution_phases
        .iter()
        .map(|phase| {
            volume += phase.water_added_l;
            (volume, lal::blended_abv(input_lal, volume))
        })
        .collect()
}

/// Planned bottles must fit in the final volume
pub fn validate_plan(summary: &BottlingSummary) -> Result<(), BottlingError> {
    if summary.planned_bottled_volume_l > summary.final_volume_l + VOLUME_EPSILON {
        return Err(BottlingError::OverAllocated {
            planned_l: summary.planned_bottled_volume_l,
            available_l: summary.final_volume_l,
        });
    }
    Ok(())
}

/// Blend when any source is rum lineage or more than one source is drawn from
pub fn bottling_mode(sources: &[&BottlingSource]) -> BottlingMode {
    if sources.len() > 1 || sources.iter().any(|s| s.product_type.is_rum_lineage()) {
        BottlingMode::Blend
    } else {
        BottlingMode::Simple
    }
}

pub fn allocation_mode(allocations: &[SelectedBatchAllocation]) -> BottlingMode {
    let sources: Vec<&BottlingSource> = allocations.iter().map(|a| &a.source).collect();
    bottling_mode(&sources)
}

/// Scale bottle quantities down so the plan fits in `final_volume_l`.
///
/// Each quantity is multiplied by `final / planned` and floored, so a small
/// unbottled remainder may be left. Entries are returned unchanged when the
/// plan already fits. With no liquid to bottle every quantity drops to zero.
pub fn balance_bottle_entries(
    entries: &[BottleEntry],
    final_volume_l: f64,
    final_abv: f64,
) -> Vec<BottleEntry> {
    let planned: f64 = entries.iter().map(|e| e.volume_bottled_l).sum();
    if planned <= final_volume_l {
        return entries.to_vec();
    }

    let ratio = (final_volume_l / planned).max(0.0);
    entries
        .iter()
        .map(|entry| {
            let scaled = (f64::from(entry.quantity) * ratio).floor();
            entry.with_quantity(scaled as u32, final_abv)
        })
        .collect()
}
