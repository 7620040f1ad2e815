//! Batch record merge, cut resolution and import service

use serde::Serialize;
use serde_json::Value;
use shared::cuts::{resolve_batch, BatchCutSummary};
use shared::display::display_loss;
use shared::import::{normalize_import, ImportedBatch};
use shared::merge::merge_by_batch_id;
use shared::models::Batch;
use shared::normalize::decode_batch;
use shared::EngineConfig;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBatch {
    pub batch: Batch,
    pub summary: BatchCutSummary,
    pub loss_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_count: usize,
    /// Batches whose output LAL exceeds their input LAL
    pub data_issues: Vec<String>,
    pub batches: Vec<ImportedBatch>,
}

pub struct BatchService {
    engine: EngineConfig,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(engine: EngineConfig) -> Self {
        Self { engine }
    }

    /// Merge partial records sharing a batch id
    pub fn merge(&self, records: Vec<Value>) -> Vec<Value> {
        let merged = merge_by_batch_id(&records, &self.engine);
        tracing::info!(
            input_records = records.len(),
            output_records = merged.len(),
            "Batch records merged"
        );
        merged
    }

    /// Decode one raw batch record and resolve its cuts
    pub fn resolve(&self, record: Value) -> AppResult<ResolvedBatch> {
        if !record.is_object() {
            return Err(AppError::ValidationError(
                "Batch record must be a JSON object".to_string(),
            ));
        }

        let batch = decode_batch(&record, &self.engine);
        let summary = resolve_batch(&batch);
        self.warn_on_data_issue(&summary);

        Ok(ResolvedBatch {
            loss_display: display_loss(summary.cuts.loss, summary.cuts.has_data_issue),
            batch,
            summary,
        })
    }

    /// Parse an import file, then merge, decode and resolve every batch in it
    pub fn import(&self, text: &str) -> AppResult<ImportReport> {
        let batches = normalize_import(text, &self.engine)?;

        let data_issues: Vec<String> = batches
            .iter()
            .filter(|b| b.summary.cuts.has_data_issue)
            .map(|b| {
                self.warn_on_data_issue(&b.summary);
                b.summary
                    .batch_id
                    .clone()
                    .unwrap_or_else(|| "(no batch id)".to_string())
            })
            .collect();

        tracing::info!(
            batches = batches.len(),
            data_issues = data_issues.len(),
            "Import normalised"
        );

        Ok(ImportReport {
            batch_count: batches.len(),
            data_issues,
            batches,
        })
    }

    fn warn_on_data_issue(&self, summary: &BatchCutSummary) {
        if summary.cuts.has_data_issue {
            tracing::warn!(
                batch_id = summary.batch_id.as_deref().unwrap_or("-"),
                lal_in = ?summary.cuts.lal_in,
                lal_out = ?summary.cuts.lal_out,
                "Batch output LAL exceeds input LAL; check data"
            );
        }
    }
}
