//! Production batch and distillation run models
//!
//! These are the normalised shapes. Loosely-typed import records are decoded
//! into them by [`crate::normalize`]; calculators only ever see these.

use serde::{Deserialize, Serialize};

use crate::types::{CutPhase, Measurement};

/// One named cut of a distillation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CutRecord {
    pub phase: CutPhase,
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Free-text time the cut was taken, as logged
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl CutRecord {
    pub fn new(phase: CutPhase, measurement: Measurement) -> Self {
        Self {
            phase,
            measurement,
            time: None,
            notes: None,
        }
    }
}

/// Charge held by the boiler or a retort at the start of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VesselCharge {
    #[serde(flatten)]
    pub measurement: Measurement,
    /// What the vessel was charged with (e.g. "late tails from RUM-24-02")
    pub content: Option<String>,
}

/// Operator-reported totals for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub lal_in: Option<f64>,
    pub lal_out: Option<f64>,
    pub heart_yield_percent: Option<f64>,
}

/// One pass through the still
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DistillationRun {
    pub run_id: Option<String>,
    pub run_number: Option<i64>,
    pub date: Option<String>,
    pub boiler: Measurement,
    pub retort1: VesselCharge,
    pub retort2: VesselCharge,
    /// At most one record per phase
    pub cuts: Vec<CutRecord>,
    /// Granular tails segments, in collection order
    pub tails_segments: Vec<CutRecord>,
    pub summary: Option<RunSummary>,
    pub notes: Option<String>,
}

impl DistillationRun {
    pub fn cut(&self, phase: CutPhase) -> Option<&CutRecord> {
        self.cuts.iter().find(|c| c.phase == phase)
    }

    /// Cut measurement with LAL filled where derivable; empty when the phase is absent
    pub fn measurement(&self, phase: CutPhase) -> Measurement {
        self.cut(phase)
            .map(|c| c.measurement.resolved())
            .unwrap_or_default()
    }

    /// Total LAL charged across boiler and retorts
    pub fn charge_lal(&self) -> Option<f64> {
        let vessels = [
            self.boiler,
            self.retort1.measurement,
            self.retort2.measurement,
        ];
        let lals: Vec<f64> = vessels
            .iter()
            .filter_map(|m| m.resolved().lal)
            .collect();

        if lals.is_empty() {
            None
        } else {
            Some(lals.iter().sum())
        }
    }
}

/// Maturation cask details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cask {
    pub cask_number: Option<String>,
    pub fill_date: Option<String>,
    pub volume_filled_l: Option<f64>,
    pub fill_abv_percent: Option<f64>,
}

/// A physical production batch, possibly distilled over several runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    /// Merge key; `None` only for records that never carried one
    pub batch_id: Option<String>,
    pub product: Option<String>,
    pub date: Option<String>,
    pub still_used: Option<String>,
    /// Fermentation log, kept as recorded
    pub fermentation: Option<serde_json::Value>,
    pub distillation_runs: Vec<DistillationRun>,
    /// Operator-reconciled hearts total overriding the per-run sum
    pub combined_hearts: Option<Measurement>,
    pub cask: Option<Cask>,
    pub notes: Option<String>,
}
