//! Decoding of loosely-typed batch records into the normalised model
//!
//! Production records arrive in several overlapping shapes: legacy flat
//! fields (`hearts_volume_l`), structured cuts (`cuts.hearts.volume_l`),
//! arrays of cut points tagged with a `phase`, and `totals` rollups. Each cut
//! phase is read by trying an ordered chain of extractors; the first one that
//! finds any figure wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::coercion::{coerce_field, text_field};
use crate::config::EngineConfig;
use crate::models::{Batch, Cask, CutRecord, DistillationRun, RunSummary, VesselCharge};
use crate::types::{CutPhase, Measurement};

type Record = Map<String, Value>;

/// Reads one cut phase from one record shape
type Extractor = fn(&Record, CutPhase) -> Option<CutRecord>;

/// Precedence order for cut shapes
const CUT_EXTRACTORS: [Extractor; 4] = [flat_cut, structured_cut, cut_point, totals_cut];

const VOLUME_KEYS: &[&str] = &[
    "volume_l",
    "volume_L",
    "volumeL",
    "total_volume_l",
    "total_hearts_volume_l",
];
const ABV_KEYS: &[&str] = &[
    "abv_percent",
    "abv",
    "abvPercent",
    "avgAbvPercent",
    "total_abv_percent",
];
const LAL_KEYS: &[&str] = &["lal", "LAL"];
const TIME_KEYS: &[&str] = &["time", "cut_time"];

/// Read a measurement from an object using the common field aliases
pub fn read_measurement(object: &Record) -> Measurement {
    Measurement::new(
        coerce_field(object, VOLUME_KEYS, false),
        coerce_field(object, ABV_KEYS, false),
        coerce_field(object, LAL_KEYS, false),
    )
}

fn read_cut(object: &Record, phase: CutPhase) -> Option<CutRecord> {
    let measurement = read_measurement(object);
    if measurement.is_empty() {
        return None;
    }
    Some(CutRecord {
        phase,
        measurement,
        time: text_field(object, TIME_KEYS),
        notes: text_field(object, &["notes"]),
    })
}

fn prefixed(prefix: &str, suffixes: &[&str]) -> Vec<String> {
    suffixes.iter().map(|s| format!("{}_{}", prefix, s)).collect()
}

fn coerce_prefixed(record: &Record, prefix: &str, suffixes: &[&str]) -> Option<f64> {
    let keys = prefixed(prefix, suffixes);
    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    coerce_field(record, &keys, false)
}

fn text_prefixed(record: &Record, prefix: &str, suffixes: &[&str]) -> Option<String> {
    let keys = prefixed(prefix, suffixes);
    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    text_field(record, &keys)
}

fn flat_measurement(record: &Record, prefix: &str) -> Measurement {
    Measurement::new(
        coerce_prefixed(record, prefix, &["volume_l", "volume_L"]),
        coerce_prefixed(record, prefix, &["abv_percent", "total_abv_percent", "abv"]),
        coerce_prefixed(record, prefix, &["lal", "LAL"]),
    )
}

// ============================================================================
// Cut extractors
// ============================================================================

/// Legacy flat fields: `hearts_volume_l`, `hearts_abv_percent`, `hearts_lal`
fn flat_cut(record: &Record, phase: CutPhase) -> Option<CutRecord> {
    let prefix = phase.as_str();
    let measurement = flat_measurement(record, prefix);
    if measurement.is_empty() {
        return None;
    }
    Some(CutRecord {
        phase,
        measurement,
        time: text_prefixed(record, prefix, &["cut_time", "time"]),
        notes: text_prefixed(record, prefix, &["notes"]),
    })
}

/// Nested `cuts.<phase>` (or `outputs.<phase>`) objects
fn structured_cut(record: &Record, phase: CutPhase) -> Option<CutRecord> {
    ["cuts", "outputs"].iter().find_map(|container| {
        let cut = record
            .get(*container)?
            .as_object()?
            .get(phase.as_str())?
            .as_object()?;
        read_cut(cut, phase)
    })
}

/// First `cut_points` entry whose phase label matches
fn cut_point(record: &Record, phase: CutPhase) -> Option<CutRecord> {
    let point = record
        .get("cut_points")?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .find(|point| point_phase(point) == Some(phase))?;
    read_cut(point, phase)
}

/// `totals.<phase>` rollups
fn totals_cut(record: &Record, phase: CutPhase) -> Option<CutRecord> {
    let totals = record.get("totals")?.as_object()?;
    let rollup = totals.get(phase.as_str())?.as_object()?;
    read_cut(rollup, phase)
}

fn point_phase(point: &Record) -> Option<CutPhase> {
    text_field(point, &["phase", "name"]).and_then(|label| CutPhase::from_label(&label))
}

/// Resolve one phase through the extractor chain
pub fn extract_cut(record: &Record, phase: CutPhase) -> Option<CutRecord> {
    CUT_EXTRACTORS
        .iter()
        .find_map(|extractor| extractor(record, phase))
}

/// Granular tails: an explicit `tails_segments` list, else every tails cut point
fn extract_tails_segments(record: &Record) -> Vec<CutRecord> {
    let explicit = record.get("tails_segments").or_else(|| {
        record
            .get("cuts")
            .and_then(Value::as_object)
            .and_then(|cuts| cuts.get("tails_segments"))
    });

    if let Some(segments) = explicit.and_then(Value::as_array) {
        return segments
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|segment| read_cut(segment, CutPhase::Tails))
            .collect();
    }

    record
        .get("cut_points")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|point| {
                    let phase = point_phase(point).filter(CutPhase::is_tails)?;
                    read_cut(point, phase)
                })
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Vessels and summary
// ============================================================================

fn nested_object<'a>(record: &'a Record, path: &[&str]) -> Option<&'a Record> {
    let (first, rest) = path.split_first()?;
    let mut current = record.get(*first)?.as_object()?;
    for key in rest {
        current = current.get(*key)?.as_object()?;
    }
    Some(current)
}

fn read_boiler(record: &Record) -> Measurement {
    let flat = flat_measurement(record, "boiler");
    if !flat.is_empty() {
        return flat;
    }

    [
        &["boiler"][..],
        &["charge", "total_charge"][..],
        &["charge", "total"][..],
    ]
    .iter()
    .filter_map(|path| nested_object(record, path))
    .map(read_measurement)
    .find(|m| !m.is_empty())
    .unwrap_or_default()
}

fn read_vessel(object: &Record) -> VesselCharge {
    VesselCharge {
        measurement: read_measurement(object),
        content: text_field(object, &["content"]),
    }
}

fn read_retort(record: &Record, number: u8) -> VesselCharge {
    let prefix = format!("retort{}", number);

    let flat = flat_measurement(record, &prefix);
    if !flat.is_empty() {
        return VesselCharge {
            measurement: flat,
            content: text_prefixed(record, &prefix, &["content"]),
        };
    }

    let underscored = format!("retort_{}", number);
    for key in [prefix.as_str(), underscored.as_str()] {
        if let Some(object) = record.get(key).and_then(Value::as_object) {
            return read_vessel(object);
        }
    }

    record
        .get("retorts")
        .and_then(Value::as_array)
        .and_then(|retorts| {
            let by_id = retorts.iter().filter_map(Value::as_object).find(|r| {
                coerce_field(r, &["id"], false) == Some(f64::from(number))
            });
            by_id.or_else(|| retorts.get(usize::from(number) - 1)?.as_object())
        })
        .map(read_vessel)
        .unwrap_or_default()
}

fn read_summary(record: &Record) -> Option<RunSummary> {
    let nested = nested_object(record, &["summary"]);
    let legacy_yield = nested_object(record, &["yield"]);

    let pick = |keys: &[&str], legacy: &str| {
        nested
            .and_then(|s| coerce_field(s, keys, false))
            .or_else(|| coerce_field(record, keys, false))
            .or_else(|| legacy_yield.and_then(|y| coerce_field(y, &[legacy], false)))
    };

    let summary = RunSummary {
        lal_in: pick(&["lal_in"], "total_lal_start"),
        lal_out: pick(&["lal_out"], "total_lal_end"),
        heart_yield_percent: pick(&["heart_yield_percent"], "heart_yield_percent"),
    };

    if summary.lal_in.is_none()
        && summary.lal_out.is_none()
        && summary.heart_yield_percent.is_none()
    {
        None
    } else {
        Some(summary)
    }
}

// ============================================================================
// Runs and batches
// ============================================================================

/// Decode one distillation run. Non-objects decode to an empty run.
pub fn decode_run(value: &Value) -> DistillationRun {
    let Some(record) = value.as_object() else {
        return DistillationRun::default();
    };

    let cuts = CutPhase::ALL
        .iter()
        .filter_map(|phase| extract_cut(record, *phase))
        .collect();

    DistillationRun {
        run_id: text_field(record, &["run_id"]),
        run_number: coerce_field(record, &["run_number"], false).map(|n| n as i64),
        date: text_field(record, &["date", "distillation_date"]),
        boiler: read_boiler(record),
        retort1: read_retort(record, 1),
        retort2: read_retort(record, 2),
        cuts,
        tails_segments: extract_tails_segments(record),
        summary: read_summary(record),
        notes: text_field(record, &["notes"]),
    }
}

fn read_combined_hearts(record: &Record, config: &EngineConfig) -> Option<Measurement> {
    let object = record.get(&config.combined_hearts_key)?.as_object()?;
    let measurement = Measurement::new(
        coerce_field(object, &["volume_l", "volume_L", "total_volume_l"], false),
        coerce_field(
            object,
            &["abv_percent", "abv", "combined_hearts_abv_percent"],
            false,
        ),
        coerce_field(object, &["lal", "LAL", "combined_hearts_lal"], false),
    );
    if measurement.is_empty() {
        None
    } else {
        Some(measurement)
    }
}

fn read_cask(record: &Record) -> Option<Cask> {
    if let Some(object) = record.get("cask").and_then(Value::as_object) {
        return Some(Cask {
            cask_number: text_field(object, &["cask_number", "number"]),
            fill_date: text_field(object, &["fill_date"]),
            volume_filled_l: coerce_field(object, &["volume_filled_l"], false),
            fill_abv_percent: coerce_field(object, &["fill_abv_percent"], false),
        });
    }

    let cask_number = text_field(record, &["cask_number"])?;
    Some(Cask {
        cask_number: Some(cask_number),
        fill_date: text_field(record, &["fill_date"]),
        volume_filled_l: coerce_field(record, &["volume_filled_l"], false),
        fill_abv_percent: coerce_field(record, &["fill_abv_percent"], false),
    })
}

/// Decode a batch record. A record without `distillation_runs` is read as a
/// batch of one run described by the record itself.
pub fn decode_batch(value: &Value, config: &EngineConfig) -> Batch {
    let Some(record) = value.as_object() else {
        return Batch::default();
    };

    let id_keys: Vec<&str> = config.batch_id_keys.iter().map(String::as_str).collect();

    let distillation_runs = match record.get("distillation_runs").and_then(Value::as_array) {
        Some(runs) => runs.iter().map(decode_run).collect(),
        None => vec![decode_run(value)],
    };

    Batch {
        batch_id: text_field(record, &id_keys),
        product: text_field(record, &["product", "product_name", "product_type"]),
        date: text_field(record, &["date", "distillation_date"]),
        still_used: text_field(record, &["still_used", "still"])
            .or_else(|| Some(config.default_still_name.clone())),
        fermentation: record.get("fermentation").filter(|v| !v.is_null()).cloned(),
        distillation_runs,
        combined_hearts: read_combined_hearts(record, config),
        cask: read_cask(record),
        notes: text_field(record, &["notes"]),
    }
}

/// Parse a run date or timestamp as logged: RFC 3339, a naive date-time, or a bare date
pub fn parse_run_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
