//! Engine configuration
//!
//! Import normalisation and record merging used to rely on hard-coded
//! identifiers. They are passed in explicitly so callers and tests control them.

use serde::{Deserialize, Serialize};

/// Keys tried, in order, to find a record's batch identifier
pub const DEFAULT_BATCH_ID_KEYS: &[&str] = &["batch_id", "batchId", "id"];

/// Still recorded against an imported batch that does not name one
pub const DEFAULT_STILL_NAME: &str = "Roberta (simple pot still)";

/// Key holding an operator's reconciled hearts total for a whole batch
pub const DEFAULT_COMBINED_HEARTS_KEY: &str = "combined_hearts";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub batch_id_keys: Vec<String>,
    pub default_still_name: String,
    pub combined_hearts_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_id_keys: DEFAULT_BATCH_ID_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            default_still_name: DEFAULT_STILL_NAME.to_string(),
            combined_hearts_key: DEFAULT_COMBINED_HEARTS_KEY.to_string(),
        }
    }
}
