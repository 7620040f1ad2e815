//! Bottling run planning service

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::bottling;
use shared::models::{
    BottleEntry, BottlingMode, BottlingSource, BottlingSummary, DilutionPhase,
    SelectedBatchAllocation,
};
use shared::validation::{validate_bottle_size, validate_water_added};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Spirit drawn from one source. The source is a batch or tank row as stored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AllocationInput {
    pub source: Value,
    /// Defaults to everything the source holds
    #[validate(range(min = 0.0, message = "Volume to use cannot be negative"))]
    pub volume_to_use_l: Option<f64>,
    /// Corrected ABV reading for the source
    #[validate(range(min = 0.0, max = 100.0, message = "ABV must be between 0 and 100"))]
    pub abv_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DilutionPhaseInput {
    pub date: Option<NaiveDate>,
    pub water_added_l: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BottleEntryInput {
    pub size_ml: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BottlingPlanInput {
    #[validate]
    pub allocations: Vec<AllocationInput>,
    #[serde(default)]
    pub dilution_phases: Vec<DilutionPhaseInput>,
    #[serde(default)]
    pub bottle_entries: Vec<BottleEntryInput>,
    /// Reject an over-allocated plan instead of flagging it
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BottlingReport {
    pub mode: BottlingMode,
    pub summary: BottlingSummary,
    pub over_allocated: bool,
    /// Bottle entries with LAL at the final ABV
    pub bottle_entries: Vec<BottleEntry>,
    /// Volume and ABV after each dilution phase
    pub dilution_steps: Vec<DilutionStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DilutionStep {
    pub volume_l: f64,
    pub abv_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub bottle_entries: Vec<BottleEntry>,
    pub summary: BottlingSummary,
}

struct Plan {
    allocations: Vec<SelectedBatchAllocation>,
    phases: Vec<DilutionPhase>,
    entries: Vec<BottleEntry>,
}

pub struct BottlingService;

impl BottlingService {
    /// Create a new BottlingService instance
    pub fn new() -> Self {
        Self
    }

    /// Summarise a bottling plan and flag over-allocation
    pub fn summarize(&self, input: BottlingPlanInput) -> AppResult<BottlingReport> {
        let strict = input.strict;
        let plan = self.build_plan(input)?;

        let summary = self.summary_for(&plan);
        let over_allocated = bottling::validate_plan(&summary).is_err();
        if strict {
            bottling::validate_plan(&summary)?;
        }
        if over_allocated {
            tracing::warn!(
                planned_l = summary.planned_bottled_volume_l,
                available_l = summary.final_volume_l,
                "Bottling plan exceeds final volume"
            );
        }

        let dilution_steps = bottling::dilution_progression(&plan.allocations, &plan.phases)
            .into_iter()
            .map(|(volume_l, abv_percent)| DilutionStep {
                volume_l,
                abv_percent,
            })
            .collect();

        Ok(BottlingReport {
            mode: bottling::allocation_mode(&plan.allocations),
            over_allocated,
            bottle_entries: plan.entries,
            dilution_steps,
            summary,
        })
    }

    /// Scale bottle quantities down to fit the final volume
    pub fn balance(&self, input: BottlingPlanInput) -> AppResult<BalanceReport> {
        let plan = self.build_plan(input)?;
        let before = self.summary_for(&plan);

        let entries = bottling::balance_bottle_entries(
            &plan.entries,
            before.final_volume_l,
            before.final_abv,
        );
        let summary = bottling::calculate_summary(&plan.allocations, &plan.phases, &entries);

        tracing::info!(
            planned_before_l = before.planned_bottled_volume_l,
            planned_after_l = summary.planned_bottled_volume_l,
            final_volume_l = summary.final_volume_l,
            "Bottle entries balanced"
        );

        Ok(BalanceReport {
            bottle_entries: entries,
            summary,
        })
    }

    fn summary_for(&self, plan: &Plan) -> BottlingSummary {
        bottling::calculate_summary(&plan.allocations, &plan.phases, &plan.entries)
    }

    fn build_plan(&self, input: BottlingPlanInput) -> AppResult<Plan> {
        input.validate()?;

        let mut allocations = Vec::with_capacity(input.allocations.len());
        for (index, allocation) in input.allocations.into_iter().enumerate() {
            let source = BottlingSource::from_raw(&allocation.source).ok_or_else(|| {
                AppError::Validation {
                    field: format!("allocations[{}].source", index),
                    message: "Source must be a JSON object".to_string(),
                }
            })?;

            let mut selected = SelectedBatchAllocation::whole(source);
            if let Some(abv) = allocation.abv_percent {
                selected = selected.with_abv(abv);
            }
            if let Some(volume) = allocation.volume_to_use_l {
                selected = selected.with_volume(volume);
            }
            allocations.push(selected);
        }

        let mut phases = Vec::with_capacity(input.dilution_phases.len());
        for (index, phase) in input.dilution_phases.into_iter().enumerate() {
            validate_water_added(phase.water_added_l).map_err(|message| AppError::Validation {
                field: format!("dilution_phases[{}].water_added_l", index),
                message: message.to_string(),
            })?;
            phases.push(DilutionPhase {
                date: phase.date,
                water_added_l: phase.water_added_l,
                notes: phase.notes,
            });
        }

        // LAL per bottle needs the final ABV, which does not depend on the bottles
        let final_abv = bottling::calculate_summary(&allocations, &phases, &[]).final_abv;

        let mut entries = Vec::with_capacity(input.bottle_entries.len());
        for (index, entry) in input.bottle_entries.into_iter().enumerate() {
            validate_bottle_size(entry.size_ml).map_err(|message| AppError::Validation {
                field: format!("bottle_entries[{}].size_ml", index),
                message: message.to_string(),
            })?;
            entries.push(BottleEntry::new(entry.size_ml, entry.quantity, final_abv));
        }

        Ok(Plan {
            allocations,
            phases,
            entries,
        })
    }
}

impl Default for BottlingService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(quantity: u32, strict: bool) -> BottlingPlanInput {
        serde_json::from_value(json!({
            "allocations": [
                {
                    "source": {
                        "batch_id": "RUM-24-03",
                        "product_type": "rum",
                        "volume_L": 80,
                        "abv_percent": 62.5
                    }
                }
            ],
            "dilution_phases": [ { "water_added_l": 20.0 } ],
            "bottle_entries": [
                { "size_ml": 700, "quantity": quantity },
                { "size_ml": 700, "quantity": quantity },
                { "size_ml": 700, "quantity": quantity }
            ],
            "strict": strict
        }))
        .unwrap()
    }

    #[test]
    fn test_summarize_flags_over_allocation() {
        let report = BottlingService::new().summarize(plan(60, false)).unwrap();
        assert_eq!(report.mode, BottlingMode::Blend);
        assert!((report.summary.final_volume_l - 100.0).abs() < 1e-9);
        assert!((report.summary.final_abv - 50.0).abs() < 1e-9);
        assert!(report.over_allocated);
        assert_eq!(report.dilution_steps.len(), 1);
    }

    #[test]
    fn test_strict_plan_rejected() {
        let err = BottlingService::new().summarize(plan(60, true)).unwrap_err();
        assert!(matches!(err, AppError::Bottling(_)));
    }

    #[test]
    fn test_balance_fits_final_volume() {
        let report = BottlingService::new().balance(plan(60, false)).unwrap();
        assert!(report.bottle_entries.iter().all(|e| e.quantity == 47));
        assert!(report.summary.planned_bottled_volume_l <= report.summary.final_volume_l);
    }

    #[test]
    fn test_negative_water_rejected() {
        let mut input = plan(10, false);
        input.dilution_phases[0].water_added_l = -1.0;
        let err = BottlingService::new().summarize(input).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
