//! Merging of partial batch records by batch id
//!
//! The same physical batch is often entered several times: a fermentation
//! log one week, distillation runs the next, cask details months later. Those
//! partial records are folded into one, left to right in input order.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::coercion::coerce_text;
use crate::config::EngineConfig;

const RUNS_FIELD: &str = "distillation_runs";

/// Identity of a distillation run for de-duplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RunKey {
    RunId(String),
    RunNumber(String),
    Date(String),
    /// Serialised run, for runs carrying none of the keys above
    Structural(String),
}

impl RunKey {
    fn of(run: &Value) -> Self {
        let field = |key: &str| run.get(key).filter(|v| !v.is_null());

        if let Some(id) = field("run_id") {
            return RunKey::RunId(key_text(id));
        }
        if let Some(number) = field("run_number") {
            return RunKey::RunNumber(key_text(number));
        }
        if let Some(date) = field("date") {
            return RunKey::Date(key_text(date));
        }
        RunKey::Structural(run.to_string())
    }
}

fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The record's batch id, from the first configured key that holds one.
///
/// Ids compare as text: spreadsheet exports write the same batch as `7` in one
/// row and `"7"` in the next, so both name one batch. Surrounding whitespace
/// is ignored and a blank id counts as no id.
pub fn batch_key(record: &Value, config: &EngineConfig) -> Option<String> {
    let object = record.as_object()?;
    config
        .batch_id_keys
        .iter()
        .find_map(|key| coerce_text(object.get(key)))
}

/// Concatenate runs, keeping the first run seen for each key
pub fn dedupe_runs(runs: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    runs.into_iter()
        .filter(|run| seen.insert(RunKey::of(run)))
        .collect()
}

fn merge_field(target: &mut Map<String, Value>, key: &str, incoming: &Value) {
    if incoming.is_null() {
        return;
    }

    if key == RUNS_FIELD {
        if let Value::Array(new_runs) = incoming {
            let existing = match target.remove(key) {
                Some(Value::Array(runs)) => runs,
                _ => Vec::new(),
            };
            let merged = dedupe_runs(existing.into_iter().chain(new_runs.iter().cloned()));
            target.insert(key.to_string(), Value::Array(merged));
            return;
        }
    }

    match (target.get_mut(key), incoming) {
        (Some(Value::Object(existing)), Value::Object(update)) => {
            for (field, value) in update {
                if !value.is_null() {
                    existing.insert(field.clone(), value.clone());
                }
            }
        }
        _ => {
            target.insert(key.to_string(), incoming.clone());
        }
    }
}

/// Fold `incoming` into `accumulator`.
///
/// Null fields never overwrite. Plain objects are shallow-merged, distillation
/// runs are appended without duplicates, anything else (arrays included) is
/// replaced by the later value.
pub fn merge_records(accumulator: &mut Value, incoming: &Value) {
    let (Value::Object(target), Value::Object(update)) = (accumulator, incoming) else {
        return;
    };
    for (key, value) in update {
        merge_field(target, key, value);
    }
}

/// Merge records sharing a batch id.
///
/// Output holds the merged records in first-seen order, followed by records
/// without a batch id, which are never merged with anything.
pub fn merge_by_batch_id(records: &[Value], config: &EngineConfig) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut anonymous: Vec<Value> = Vec::new();

    for record in records {
        let Some(key) = batch_key(record, config) else {
            anonymous.push(record.clone());
            continue;
        };

        match index.get(&key) {
            Some(&position) => merge_records(&mut merged[position], record),
            None => {
                index.insert(key, merged.len());
                merged.push(record.clone());
            }
        }
    }

    merged.extend(anonymous);
    merged
}
