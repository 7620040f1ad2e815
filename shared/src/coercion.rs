//! Numeric coercion for loosely-typed import and form values
//!
//! Spreadsheet exports and hand-edited JSON carry numbers as numbers, as
//! strings, as `"-"` placeholders or not at all. Everything here degrades to
//! `None` (or `0` when zero-filling is requested) and never fails.

use serde_json::{Map, Value};

/// Coerce a JSON value to a number, following JavaScript `Number()` rules.
///
/// `null`, a missing value, `""` and `"-"` are blanks. Anything that does not
/// parse as a finite number is treated the same way. Blanks become `None`,
/// or `Some(0.0)` when `fill_zeros` is set.
pub fn to_number_or_null(value: Option<&Value>, fill_zeros: bool) -> Option<f64> {
    let blank = if fill_zeros { Some(0.0) } else { None };

    match value.and_then(coerce) {
        Some(n) => Some(n),
        None => blank,
    }
}

/// Coerce the first of `keys` that holds a usable number.
///
/// Aliased field names (`volume_l` / `volume_L`) are tried in order; the
/// blank policy only applies when none of them yields a number.
pub fn coerce_field(
    record: &Map<String, Value>,
    keys: &[&str],
    fill_zeros: bool,
) -> Option<f64> {
    keys.iter()
        .find_map(|key| to_number_or_null(record.get(*key), false))
        .or(if fill_zeros { Some(0.0) } else { None })
}

/// Read a value as display text: trimmed non-empty strings and numbers
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First of `keys` that holds text
pub fn text_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| coerce_text(record.get(*key)))
}

fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw == "-" {
        return None;
    }

    // Number() ignores surrounding whitespace, and a whitespace-only string is 0
    let s = raw.trim_matches(|c: char| c.is_whitespace());
    if s.is_empty() {
        return Some(0.0);
    }

    if let Some(n) = parse_radix_literal(s) {
        return Some(n);
    }

    // Rust accepts "inf" and "nan" spellings that Number() does not
    let lower = s.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let (digits, radix) = match s.get(..2)? {
        "0x" | "0X" => (&s[2..], 16),
        "0o" | "0O" => (&s[2..], 8),
        "0b" | "0B" => (&s[2..], 2),
        _ => return None,
    };

    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce_json(v: Value) -> Option<f64> {
        to_number_or_null(Some(&v), false)
    }

    #[test]
    fn test_blanks_are_null() {
        assert_eq!(to_number_or_null(None, false), None);
        assert_eq!(coerce_json(Value::Null), None);
        assert_eq!(coerce_json(json!("")), None);
        assert_eq!(coerce_json(json!("-")), None);
    }

    #[test]
    fn test_blanks_fill_to_zero() {
        assert_eq!(to_number_or_null(None, true), Some(0.0));
        assert_eq!(to_number_or_null(Some(&json!("-")), true), Some(0.0));
        assert_eq!(to_number_or_null(Some(&json!("abc")), true), Some(0.0));
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce_json(json!(42.5)), Some(42.5));
        assert_eq!(coerce_json(json!(0)), Some(0.0));
        assert_eq!(coerce_json(json!("63.2")), Some(63.2));
        assert_eq!(coerce_json(json!(" 12 ")), Some(12.0));
        assert_eq!(coerce_json(json!("1e3")), Some(1000.0));
        assert_eq!(coerce_json(json!("0x1F")), Some(31.0));
    }

    #[test]
    fn test_surrounding_text_is_not_stripped() {
        assert_eq!(coerce_json(json!("12 L")), None);
        assert_eq!(coerce_json(json!("~40")), None);
        assert_eq!(coerce_json(json!("Infinity")), None);
        assert_eq!(coerce_json(json!("nan")), None);
    }

    #[test]
    fn test_non_scalar_values() {
        assert_eq!(coerce_json(json!(true)), Some(1.0));
        assert_eq!(coerce_json(json!(false)), Some(0.0));
        assert_eq!(coerce_json(json!([5])), None);
        assert_eq!(coerce_json(json!({"v": 5})), None);
        assert_eq!(coerce_json(json!("   ")), Some(0.0));
    }

    #[test]
    fn test_coerce_field_aliases() {
        let record = json!({ "volume_l": "-", "volume_L": "120.5" });
        let map = record.as_object().unwrap();
        assert_eq!(coerce_field(map, &["volume_l", "volume_L"], false), Some(120.5));
        assert_eq!(coerce_field(map, &["missing"], false), None);
        assert_eq!(coerce_field(map, &["missing"], true), Some(0.0));
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(Some(&json!("  RUM-24-03 "))), Some("RUM-24-03".to_string()));
        assert_eq!(coerce_text(Some(&json!(7))), Some("7".to_string()));
        assert_eq!(coerce_text(Some(&json!(""))), None);
        assert_eq!(coerce_text(Some(&json!(null))), None);
    }
}
