//! Parsing of batch import files
//!
//! Batch datasets are hand-maintained JSON. They may hold a single array, one
//! object, or objects written back to back (`}{` or `},{`), and often carry
//! `//` and `/* */` comments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::cuts::{resolve_batch, BatchCutSummary};
use crate::merge::merge_by_batch_id;
use crate::models::Batch;
use crate::normalize::decode_batch;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
}

/// A decoded batch with its resolved cuts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportedBatch {
    pub batch: Batch,
    pub summary: BatchCutSummary,
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// Newlines are kept so parse errors still point at the right line.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parse every JSON value in `text`, flattening top-level arrays
pub fn parse_concatenated_json(text: &str) -> Result<Vec<Value>, ImportError> {
    let cleaned = strip_comments(text);
    let mut values = Vec::new();
    let mut offset = 0;

    loop {
        let rest = &cleaned[offset..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        offset += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }

        let mut stream = serde_json::Deserializer::from_str(trimmed).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) => values.extend(items),
            Some(Ok(value)) => values.push(value),
            Some(Err(err)) => {
                let lines_before = cleaned[..offset].matches('\n').count();
                let column = if err.line() <= 1 {
                    let line_start = cleaned[..offset].rfind('\n').map_or(0, |i| i + 1);
                    offset - line_start + err.column()
                } else {
                    err.column()
                };
                return Err(ImportError::Parse {
                    line: lines_before + err.line(),
                    column,
                    message: err.to_string(),
                });
            }
            None => break,
        }
        offset += stream.byte_offset();
    }

    Ok(values)
}

/// Parse, merge, decode and resolve an import file.
///
/// Values that are not JSON objects are skipped.
pub fn normalize_import(
    text: &str,
    config: &EngineConfig,
) -> Result<Vec<ImportedBatch>, ImportError> {
    let records: Vec<Value> = parse_concatenated_json(text)?
        .into_iter()
        .filter(Value::is_object)
        .collect();

    Ok(merge_by_batch_id(&records, config)
        .iter()
        .map(|record| {
            let batch = decode_batch(record, config);
            let summary = resolve_batch(&batch);
            ImportedBatch { batch, summary }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_back_to_back_objects() {
        let values = parse_concatenated_json("{\"a\":1}{\"a\":2}\n{\"a\":3}").unwrap();
        assert_eq!(values, vec![json!({"a":1}), json!({"a":2}), json!({"a":3})]);
    }

    #[test]
    fn test_comma_separated_objects() {
        let values = parse_concatenated_json("{\"a\":1},\n{\"a\":2}").unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_array_is_flattened() {
        let values = parse_concatenated_json("[{\"a\":1},{\"a\":2}]").unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_comments_are_stripped() {
        let text = r#"
            // rum batches, March
            { "batch_id": "RUM-24-03", /* checked */ "notes": "see http://example.com/x" }
        "#;
        let values = parse_concatenated_json(text).unwrap();
        assert_eq!(values[0]["notes"], json!("see http://example.com/x"));
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let stripped = strip_comments(r#"{"a": "/* not a comment */ \" // still text"}"#);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], json!("/* not a comment */ \" // still text"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_concatenated_json("  // nothing\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse_concatenated_json("{\"a\":1}\n{\"a\": }").unwrap_err();
        let ImportError::Parse { line, .. } = err;
        assert_eq!(line, 2);
    }

    #[test]
    fn test_normalize_import_merges_and_resolves() {
        let text = r#"
            { "batch_id": "RUM-24-03", "distillation_runs": [
                { "run_id": "a", "date": "2024-03-02",
                  "cuts": { "hearts": { "volume_l": 10, "abv_percent": 80 } } }
            ] }
            { "batch_id": "RUM-24-03", "distillation_runs": [
                { "run_id": "b", "date": "2024-03-05",
                  "cuts": { "hearts": { "volume_l": 20, "abv_percent": 70 } } }
            ], "cask_number": 7 }
            42
        "#;
        let imported = normalize_import(text, &EngineConfig::default()).unwrap();
        assert_eq!(imported.len(), 1);

        let batch = &imported[0];
        assert_eq!(batch.batch.distillation_runs.len(), 2);
        assert_eq!(batch.summary.cuts.hearts.abv_percent, Some(73.333));
        assert_eq!(batch.summary.hearts_aggregate.valid_runs, 2);
    }
}
