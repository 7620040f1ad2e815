//! WebAssembly module for the Distillery Operations Platform
//!
//! Provides client-side computation for:
//! - LAL and implied ABV
//! - Rum recipe dilution
//! - Bottling run summaries and bottle balancing
//! - Batch cut resolution and record merging
//!
//! Structured inputs and outputs cross the boundary as JSON strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::bottling;
use shared::cuts::resolve_batch;
use shared::dilution;
use shared::merge::merge_by_batch_id;
use shared::models::{
    BottleEntry, BottlingMode, BottlingSource, BottlingSummary, DilutionPhase, RecipeCatalog,
    SelectedBatchAllocation,
};
use shared::normalize::decode_batch;
use shared::validation;
use shared::EngineConfig;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("distillery-ops wasm ready"));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// LAL from volume and ABV; `undefined` when either is missing
#[wasm_bindgen]
pub fn calculate_lal(volume_l: Option<f64>, abv_percent: Option<f64>) -> Option<f64> {
    shared::lal::lal(volume_l, abv_percent)
}

/// ABV implied by a volume and its LAL, to 3 decimal places
#[wasm_bindgen]
pub fn implied_abv(volume_l: Option<f64>, lal: Option<f64>) -> Option<f64> {
    shared::lal::implied_abv(volume_l, lal)
}

#[derive(Deserialize)]
struct DilutionRequest {
    recipe: String,
    volume_l: f64,
    abv_percent: f64,
}

fn dilution_json(input: &str) -> Result<String, String> {
    let request: DilutionRequest =
        serde_json::from_str(input).map_err(|e| format!("Invalid dilution JSON: {}", e))?;
    let result = dilution::calculate_by_name(
        &RecipeCatalog::builtin(),
        request.volume_l,
        request.abv_percent,
        &request.recipe,
    )
    .map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| e.to_string())
}

/// Proof spirit for a built-in recipe: `{recipe, volume_l, abv_percent}`
#[wasm_bindgen]
pub fn calculate_dilution(input_json: &str) -> Result<String, JsValue> {
    dilution_json(input_json).map_err(js_error)
}

#[derive(Deserialize)]
struct AllocationRequest {
    source: Value,
    volume_to_use_l: Option<f64>,
    abv_percent: Option<f64>,
}

#[derive(Deserialize)]
struct PhaseRequest {
    water_added_l: f64,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct BottleRequest {
    size_ml: u32,
    quantity: u32,
}

#[derive(Deserialize)]
struct BottlingRequest {
    allocations: Vec<AllocationRequest>,
    #[serde(default)]
    dilution_phases: Vec<PhaseRequest>,
    #[serde(default)]
    bottle_entries: Vec<BottleRequest>,
}

#[derive(Serialize)]
struct BottlingResponse {
    mode: BottlingMode,
    summary: BottlingSummary,
    over_allocated: bool,
    bottle_entries: Vec<BottleEntry>,
}

struct BottlingPlan {
    allocations: Vec<SelectedBatchAllocation>,
    phases: Vec<DilutionPhase>,
    entries: Vec<BottleEntry>,
}

fn bottling_plan(input: &str) -> Result<BottlingPlan, String> {
    let request: BottlingRequest =
        serde_json::from_str(input).map_err(|e| format!("Invalid bottling JSON: {}", e))?;

    let allocations = request
        .allocations
        .into_iter()
        .map(|a| {
            let source = BottlingSource::from_raw(&a.source)
                .ok_or_else(|| "Allocation source must be an object".to_string())?;
            let mut selected = SelectedBatchAllocation::whole(source);
            if let Some(abv) = a.abv_percent {
                selected = selected.with_abv(abv);
            }
            if let Some(volume) = a.volume_to_use_l {
                selected = selected.with_volume(volume);
            }
            Ok(selected)
        })
        .collect::<Result<Vec<_>, String>>()?;

    let phases: Vec<DilutionPhase> = request
        .dilution_phases
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            validation::validate_water_added(p.water_added_l)
                .map_err(|msg| format!("dilution_phases[{}]: {}", i, msg))?;
            Ok(DilutionPhase {
                date: None,
                water_added_l: p.water_added_l,
                notes: p.notes,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let final_abv = bottling::calculate_summary(&allocations, &phases, &[]).final_abv;
    let entries = request
        .bottle_entries
        .into_iter()
        .map(|b| BottleEntry::new(b.size_ml, b.quantity, final_abv))
        .collect();

    Ok(BottlingPlan {
        allocations,
        phases,
        entries,
    })
}

fn bottling_summary_json(input: &str) -> Result<(String, bool), String> {
    let plan = bottling_plan(input)?;
    let summary = bottling::calculate_summary(&plan.allocations, &plan.phases, &plan.entries);
    let response = BottlingResponse {
        mode: bottling::allocation_mode(&plan.allocations),
        over_allocated: bottling::validate_plan(&summary).is_err(),
        summary,
        bottle_entries: plan.entries,
    };
    let json = serde_json::to_string(&response).map_err(|e| e.to_string())?;
    Ok((json, response.over_allocated))
}

/// Summarise a bottling plan: `{allocations, dilution_phases, bottle_entries}`
#[wasm_bindgen]
pub fn calculate_bottling_summary(input_json: &str) -> Result<String, JsValue> {
    let (json, over_allocated) = bottling_summary_json(input_json).map_err(js_error)?;
    if over_allocated {
        warn("Bottling plan exceeds the final volume");
    }
    Ok(json)
}

fn balance_json(input: &str) -> Result<String, String> {
    let plan = bottling_plan(input)?;
    let summary = bottling::calculate_summary(&plan.allocations, &plan.phases, &plan.entries);
    let balanced =
        bottling::balance_bottle_entries(&plan.entries, summary.final_volume_l, summary.final_abv);
    serde_json::to_string(&balanced).map_err(|e| e.to_string())
}

/// Scale the plan's bottle quantities down to fit its final volume
#[wasm_bindgen]
pub fn balance_bottle_entries(input_json: &str) -> Result<String, JsValue> {
    balance_json(input_json).map_err(js_error)
}

fn resolve_json(input: &str) -> Result<(String, bool), String> {
    let record: Value =
        serde_json::from_str(input).map_err(|e| format!("Invalid batch JSON: {}", e))?;
    if !record.is_object() {
        return Err("Batch record must be a JSON object".to_string());
    }
    let summary = resolve_batch(&decode_batch(&record, &EngineConfig::default()));
    let json = serde_json::to_string(&summary).map_err(|e| e.to_string())?;
    Ok((json, summary.cuts.has_data_issue))
}

/// Resolve the cuts and yield of one raw batch record
#[wasm_bindgen]
pub fn resolve_batch_cuts(record_json: &str) -> Result<String, JsValue> {
    let (json, has_data_issue) = resolve_json(record_json).map_err(js_error)?;
    if has_data_issue {
        warn("Batch output LAL exceeds input LAL; check data");
    }
    Ok(json)
}

fn merge_json(input: &str) -> Result<String, String> {
    let records: Vec<Value> =
        serde_json::from_str(input).map_err(|e| format!("Invalid records JSON: {}", e))?;
    let merged = merge_by_batch_id(&records, &EngineConfig::default());
    serde_json::to_string(&merged).map_err(|e| e.to_string())
}

/// Merge an array of partial batch records by batch id
#[wasm_bindgen]
pub fn merge_batch_records(records_json: &str) -> Result<String, JsValue> {
    merge_json(records_json).map_err(js_error)
}
