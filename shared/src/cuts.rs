//! Cut aggregation for distillation runs and batches
//!
//! Works on the normalised [`DistillationRun`]/[`Batch`] model. Raw records go
//! through [`crate::normalize`] first.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::lal::{self, BatchKpi, LalResult};
use crate::models::{Batch, CutRecord, DistillationRun};
use crate::normalize::parse_run_timestamp;
use crate::types::{CutPhase, Measurement};

/// Tails as collected segment by segment, plus their combined total
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TailsBreakdown {
    pub segments: Vec<CutRecord>,
    pub combined: Measurement,
}

/// Resolved cuts and yield figures for a run or a whole batch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CutSummary {
    pub foreshots: Measurement,
    pub heads: Measurement,
    pub hearts: Measurement,
    pub early_tails: Measurement,
    pub late_tails: Measurement,
    pub tails: TailsBreakdown,
    pub lal_in: Option<f64>,
    pub lal_out: Option<f64>,
    /// `None` whenever `has_data_issue` is set
    pub loss: Option<f64>,
    pub loss_percent: Option<f64>,
    pub has_data_issue: bool,
    pub heart_yield_percent: Option<f64>,
    pub kpi: BatchKpi,
}

/// Hearts summed over every run of a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeartsAggregate {
    pub volume_l: Option<f64>,
    pub lal: Option<f64>,
    /// Volume-weighted: total LAL over total volume
    pub abv_percent: Option<f64>,
    /// Runs reporting at least one hearts figure
    pub valid_runs: usize,
    pub run_count: usize,
    pub last_distillation_date: Option<NaiveDateTime>,
}

impl HeartsAggregate {
    pub fn measurement(&self) -> Measurement {
        Measurement::new(self.volume_l, self.abv_percent, self.lal)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchCutSummary {
    pub batch_id: Option<String>,
    pub cuts: CutSummary,
    pub hearts_aggregate: HeartsAggregate,
    pub runs: Vec<CutSummary>,
}

/// Sum volumes and LALs, recomputing ABV from the totals.
///
/// Each total is `None` when no input supplied that figure.
pub fn sum_measurements(measurements: &[Measurement]) -> Measurement {
    let mut volume = None;
    let mut total_lal = None;

    for m in measurements.iter().map(|m| m.resolved()) {
        if let Some(v) = m.volume_l {
            volume = Some(volume.unwrap_or(0.0) + v);
        }
        if let Some(l) = m.lal {
            total_lal = Some(total_lal.unwrap_or(0.0) + l);
        }
    }

    Measurement::new(volume, lal::implied_abv(volume, total_lal), total_lal)
}

/// Tails of one run: explicit segments, else early and late tails, else a single tails cut
pub fn combine_tails(run: &DistillationRun) -> TailsBreakdown {
    let segments: Vec<CutRecord> = if !run.tails_segments.is_empty() {
        run.tails_segments.clone()
    } else {
        [CutPhase::EarlyTails, CutPhase::LateTails]
            .iter()
            .filter_map(|phase| run.cut(*phase).cloned())
            .collect()
    };

    if segments.is_empty() {
        return TailsBreakdown {
            segments: Vec::new(),
            combined: run.measurement(CutPhase::Tails),
        };
    }

    let measurements: Vec<Measurement> = segments.iter().map(|s| s.measurement).collect();
    TailsBreakdown {
        combined: sum_measurements(&measurements),
        segments,
    }
}

fn phase_lal(measurement: &Measurement) -> LalResult {
    lal::resolve_lal(measurement.volume_l, measurement.abv_percent, measurement.lal)
}

fn tails_lal(tails: &TailsBreakdown) -> LalResult {
    if tails.segments.is_empty() {
        return phase_lal(&tails.combined);
    }
    let measurements: Vec<Measurement> = tails.segments.iter().map(|s| s.measurement).collect();
    lal::sum_segments_lal(&measurements)
}

/// Fill in the derived figures once the cut measurements are settled
fn finish(
    mut summary: CutSummary,
    supplied_lal_out: Option<f64>,
    supplied_yield: Option<f64>,
) -> CutSummary {
    summary.lal_out = supplied_lal_out.or_else(|| {
        let outputs = [
            summary.foreshots,
            summary.heads,
            summary.hearts,
            summary.tails.combined,
        ];
        let lals: Vec<f64> = outputs.iter().filter_map(|m| m.resolved().lal).collect();
        if lals.is_empty() {
            None
        } else {
            Some(lals.iter().sum())
        }
    });

    summary.has_data_issue = lal::has_data_issue(summary.lal_in, summary.lal_out);
    if !summary.has_data_issue {
        summary.loss = lal::loss(summary.lal_in, summary.lal_out);
        summary.loss_percent = lal::loss_percent(summary.lal_in, summary.loss);
    }

    summary.heart_yield_percent = supplied_yield
        .or_else(|| lal::heart_yield_percent(summary.hearts.resolved().lal, summary.lal_in));

    summary.kpi = BatchKpi::compute(
        summary.lal_in,
        &phase_lal(&summary.hearts),
        &phase_lal(&summary.heads),
        &tails_lal(&summary.tails),
    );
    summary
}

/// Resolve the cuts of a single run
pub fn resolve_run(run: &DistillationRun) -> CutSummary {
    let supplied = run.summary.clone().unwrap_or_default();

    let summary = CutSummary {
        foreshots: run.measurement(CutPhase::Foreshots),
        heads: run.measurement(CutPhase::Heads),
        hearts: run.measurement(CutPhase::Hearts),
        early_tails: run.measurement(CutPhase::EarlyTails),
        late_tails: run.measurement(CutPhase::LateTails),
        tails: combine_tails(run),
        lal_in: supplied.lal_in.or_else(|| run.charge_lal()),
        ..Default::default()
    };

    finish(summary, supplied.lal_out, supplied.heart_yield_percent)
}

/// Sum hearts across runs, weighting ABV by volume
pub fn aggregate_hearts_from_runs(runs: &[DistillationRun]) -> HeartsAggregate {
    let mut aggregate = HeartsAggregate {
        run_count: runs.len(),
        ..Default::default()
    };

    for run in runs {
        let hearts = run.measurement(CutPhase::Hearts);
        if let Some(v) = hearts.volume_l {
            aggregate.volume_l = Some(aggregate.volume_l.unwrap_or(0.0) + v);
        }
        if let Some(l) = hearts.lal {
            aggregate.lal = Some(aggregate.lal.unwrap_or(0.0) + l);
        }
        if hearts.volume_l.is_some() || hearts.lal.is_some() {
            aggregate.valid_runs += 1;
        }

        let run_date = run.date.as_deref().and_then(parse_run_timestamp);
        if run_date > aggregate.last_distillation_date {
            aggregate.last_distillation_date = run_date;
        }
    }

    aggregate.abv_percent = lal::implied_abv(aggregate.volume_l, aggregate.lal);
    aggregate
}

/// Operator-entered combined figures replace the aggregated ones field by field.
/// A supplied zero is a real value and overrides.
pub fn apply_combined_override(
    aggregated: Measurement,
    combined: Option<&Measurement>,
) -> Measurement {
    match combined {
        Some(combined) => Measurement::new(
            combined.volume_l.or(aggregated.volume_l),
            combined.abv_percent.or(aggregated.abv_percent),
            combined.lal.or(aggregated.lal),
        ),
        None => aggregated,
    }
}

fn all_some(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let mut total = 0.0;
    let mut seen = false;
    for value in values {
        total += value?;
        seen = true;
    }
    seen.then_some(total)
}

/// Resolve a batch across all of its runs.
///
/// A single-run batch reports that run's cuts; several runs are summed, with
/// hearts volume-weighted. Combined hearts overrides are applied before the
/// data-issue check.
pub fn resolve_batch(batch: &Batch) -> BatchCutSummary {
    let runs: Vec<CutSummary> = batch.distillation_runs.iter().map(resolve_run).collect();
    let hearts_aggregate = aggregate_hearts_from_runs(&batch.distillation_runs);

    let sum_phase = |pick: fn(&CutSummary) -> Measurement| -> Measurement {
        match runs.as_slice() {
            [only] => pick(only),
            _ => sum_measurements(&runs.iter().map(pick).collect::<Vec<_>>()),
        }
    };

    let hearts = match runs.as_slice() {
        [only] => only.hearts,
        _ => hearts_aggregate.measurement(),
    };

    let tails = match runs.as_slice() {
        [only] => only.tails.clone(),
        _ => TailsBreakdown {
            segments: runs.iter().flat_map(|r| r.tails.segments.clone()).collect(),
            combined: sum_phase(|r| r.tails.combined),
        },
    };

    let summary = CutSummary {
        foreshots: sum_phase(|r| r.foreshots),
        heads: sum_phase(|r| r.heads),
        hearts: apply_combined_override(hearts, batch.combined_hearts.as_ref()),
        early_tails: sum_phase(|r| r.early_tails),
        late_tails: sum_phase(|r| r.late_tails),
        tails,
        lal_in: all_some(runs.iter().map(|r| r.lal_in)),
        ..Default::default()
    };

    let supplied_lal_out = all_some(
        batch
            .distillation_runs
            .iter()
            .map(|run| run.summary.as_ref().and_then(|s| s.lal_out)),
    );
    let supplied_yield = match batch.distillation_runs.as_slice() {
        [only] => only.summary.as_ref().and_then(|s| s.heart_yield_percent),
        _ => None,
    };

    BatchCutSummary {
        batch_id: batch.batch_id.clone(),
        cuts: finish(summary, supplied_lal_out, supplied_yield),
        hearts_aggregate,
        runs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunSummary;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn run_with(cuts: Vec<CutRecord>) -> DistillationRun {
        DistillationRun {
            cuts,
            ..Default::default()
        }
    }

    fn cut(phase: CutPhase, volume: f64, abv: f64) -> CutRecord {
        CutRecord::new(phase, Measurement::new(Some(volume), Some(abv), None))
    }

    #[test]
    fn test_hearts_aggregation_is_volume_weighted() {
        let mut first = run_with(vec![cut(CutPhase::Hearts, 10.0, 80.0)]);
        first.date = Some("2024-03-02".to_string());
        let mut second = run_with(vec![cut(CutPhase::Hearts, 20.0, 70.0)]);
        second.date = Some("2024-03-05T16:00:00".to_string());

        let aggregate = aggregate_hearts_from_runs(&[first, second]);
        assert_eq!(aggregate.volume_l, Some(30.0));
        assert!(approx(aggregate.lal.unwrap(), 22.0));
        assert_eq!(aggregate.abv_percent, Some(73.333));
        assert_eq!(aggregate.valid_runs, 2);
        assert_eq!(aggregate.run_count, 2);
        assert_eq!(
            aggregate.last_distillation_date,
            parse_run_timestamp("2024-03-05T16:00:00")
        );
    }

    #[test]
    fn test_aggregation_counts_valid_runs() {
        let runs = [
            run_with(vec![cut(CutPhase::Hearts, 10.0, 80.0)]),
            run_with(vec![]),
            run_with(vec![CutRecord::new(
                CutPhase::Hearts,
                Measurement::new(None, Some(75.0), None),
            )]),
        ];
        let aggregate = aggregate_hearts_from_runs(&runs);
        assert_eq!(aggregate.valid_runs, 1);
        assert_eq!(aggregate.run_count, 3);
        assert_eq!(aggregate.volume_l, Some(10.0));
    }

    #[test]
    fn test_combined_override_is_field_by_field() {
        let aggregated = Measurement::new(Some(30.0), Some(73.333), Some(22.0));
        let combined = Measurement::new(Some(29.0), None, None);
        let result = apply_combined_override(aggregated, Some(&combined));
        assert_eq!(result, Measurement::new(Some(29.0), Some(73.333), Some(22.0)));

        let zero = Measurement::new(None, None, Some(0.0));
        assert_eq!(apply_combined_override(aggregated, Some(&zero)).lal, Some(0.0));
        assert_eq!(apply_combined_override(aggregated, None), aggregated);
    }

    #[test]
    fn test_tails_segments_combined() {
        let mut run = run_with(vec![]);
        run.tails_segments = vec![
            cut(CutPhase::Tails, 20.0, 55.0),
            cut(CutPhase::Tails, 20.0, 35.0),
        ];
        let tails = combine_tails(&run);
        assert_eq!(tails.segments.len(), 2);
        assert_eq!(tails.combined.volume_l, Some(40.0));
        assert!(approx(tails.combined.lal.unwrap(), 18.0));
        assert_eq!(tails.combined.abv_percent, Some(45.0));
    }

    #[test]
    fn test_early_and_late_tails_combined() {
        let run = run_with(vec![
            cut(CutPhase::EarlyTails, 30.0, 60.0),
            cut(CutPhase::LateTails, 10.0, 20.0),
        ]);
        let tails = combine_tails(&run);
        assert_eq!(tails.segments.len(), 2);
        assert_eq!(tails.combined.volume_l, Some(40.0));
        assert_eq!(tails.combined.abv_percent, Some(50.0));
    }

    #[test]
    fn test_single_tails_cut_kept_as_is() {
        let run = run_with(vec![cut(CutPhase::Tails, 40.0, 42.0)]);
        let tails = combine_tails(&run);
        assert!(tails.segments.is_empty());
        assert_eq!(tails.combined.abv_percent, Some(42.0));
    }

    #[test]
    fn test_run_with_data_issue() {
        let mut run = run_with(vec![cut(CutPhase::Hearts, 100.0, 80.0)]);
        run.summary = Some(RunSummary {
            lal_in: Some(100.0),
            lal_out: Some(120.0),
            heart_yield_percent: None,
        });
        let summary = resolve_run(&run);
        assert!(summary.has_data_issue);
        assert_eq!(summary.loss, None);
        assert_eq!(summary.loss_percent, None);
        assert_eq!(summary.heart_yield_percent, Some(80.0));
    }

    #[test]
    fn test_run_lal_out_from_cuts() {
        let mut run = run_with(vec![
            cut(CutPhase::Heads, 5.0, 80.0),
            cut(CutPhase::Hearts, 100.0, 78.0),
            cut(CutPhase::Tails, 50.0, 40.0),
        ]);
        run.boiler = Measurement::new(Some(1000.0), Some(13.0), None);

        let summary = resolve_run(&run);
        assert_eq!(summary.lal_in, Some(130.0));
        assert!(approx(summary.lal_out.unwrap(), 102.0));
        assert!(approx(summary.loss.unwrap(), 28.0));
        assert!(!summary.has_data_issue);
        assert!(approx(summary.heart_yield_percent.unwrap(), 60.0));
        assert_eq!(summary.kpi.out_lal, summary.lal_out);
    }

    #[test]
    fn test_supplied_yield_wins() {
        let mut run = run_with(vec![cut(CutPhase::Hearts, 100.0, 78.0)]);
        run.summary = Some(RunSummary {
            lal_in: Some(130.0),
            lal_out: None,
            heart_yield_percent: Some(61.5),
        });
        assert_eq!(resolve_run(&run).heart_yield_percent, Some(61.5));
    }

    #[test]
    fn test_batch_override_applies_before_data_issue() {
        let mut first = run_with(vec![cut(CutPhase::Hearts, 10.0, 80.0)]);
        first.boiler = Measurement::new(None, None, Some(15.0));
        let mut second = run_with(vec![cut(CutPhase::Hearts, 20.0, 70.0)]);
        second.boiler = Measurement::new(None, None, Some(15.0));

        let batch = Batch {
            batch_id: Some("RUM-24-03".to_string()),
            distillation_runs: vec![first, second],
            combined_hearts: Some(Measurement::new(None, None, Some(35.0))),
            ..Default::default()
        };
        let resolved = resolve_batch(&batch);
        assert_eq!(resolved.cuts.lal_in, Some(30.0));
        assert_eq!(resolved.cuts.hearts.lal, Some(35.0));
        assert_eq!(resolved.cuts.hearts.volume_l, Some(30.0));
        assert!(resolved.cuts.has_data_issue);
        assert_eq!(resolved.runs.len(), 2);
        assert!(!resolved.runs[0].has_data_issue);
    }

    #[test]
    fn test_batch_lal_in_needs_every_run() {
        let mut first = run_with(vec![cut(CutPhase::Hearts, 10.0, 80.0)]);
        first.boiler = Measurement::new(None, None, Some(15.0));
        let second = run_with(vec![cut(CutPhase::Hearts, 20.0, 70.0)]);

        let batch = Batch {
            distillation_runs: vec![first, second],
            ..Default::default()
        };
        let resolved = resolve_batch(&batch);
        assert_eq!(resolved.cuts.lal_in, None);
        assert_eq!(resolved.cuts.heart_yield_percent, None);
        assert!(!resolved.cuts.has_data_issue);
    }
}
