//! Bottling run models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coercion::{coerce_field, text_field};

/// Product types that can be bottled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Gin,
    Vodka,
    Rum,
    CaneSpirit,
    SpicedRum,
    PineappleRum,
    CoffeeLiqueur,
    OtherLiqueur,
}

impl ProductType {
    /// Rum and cane spirit products are always handled as blends
    pub fn is_rum_lineage(&self) -> bool {
        matches!(
            self,
            ProductType::Rum
                | ProductType::CaneSpirit
                | ProductType::SpicedRum
                | ProductType::PineappleRum
        )
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "gin" => Some(ProductType::Gin),
            "vodka" => Some(ProductType::Vodka),
            "rum" => Some(ProductType::Rum),
            "cane_spirit" => Some(ProductType::CaneSpirit),
            "spiced_rum" => Some(ProductType::SpicedRum),
            "pineapple_rum" => Some(ProductType::PineappleRum),
            "coffee_liqueur" => Some(ProductType::CoffeeLiqueur),
            "other_liqueur" => Some(ProductType::OtherLiqueur),
            _ => None,
        }
    }
}

/// Which sections of the bottling flow are emphasised
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BottlingMode {
    /// Single product straight from tank (gin, vodka)
    Simple,
    /// Several sources or rum lineage; dilution phases are tracked
    Blend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    #[default]
    InTank,
    InBarrel,
    Bottled,
    Archived,
    Draft,
    InProgress,
    Completed,
}

impl SourceStatus {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "in_tank" => Some(SourceStatus::InTank),
            "in_barrel" => Some(SourceStatus::InBarrel),
            "bottled" => Some(SourceStatus::Bottled),
            "archived" => Some(SourceStatus::Archived),
            "draft" => Some(SourceStatus::Draft),
            "in_progress" => Some(SourceStatus::InProgress),
            "completed" => Some(SourceStatus::Completed),
            _ => None,
        }
    }

    /// Liquid in these states can be drawn for bottling
    pub fn is_available(&self) -> bool {
        matches!(
            self,
            SourceStatus::InTank | SourceStatus::InBarrel | SourceStatus::Completed
        )
    }
}

/// A tank, cask or batch that spirit can be drawn from for bottling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BottlingSource {
    pub id: String,
    pub batch_code: String,
    pub product_name: String,
    pub product_type: ProductType,
    /// Liquid currently available
    pub volume_l: f64,
    pub abv_percent: f64,
    pub lal: f64,
    pub tank_code: Option<String>,
    pub status: SourceStatus,
    pub distilled_at: Option<String>,
    pub notes: Option<String>,
}

impl BottlingSource {
    pub fn new(
        batch_code: &str,
        product_type: ProductType,
        volume_l: f64,
        abv_percent: f64,
    ) -> Self {
        Self {
            id: batch_code.to_string(),
            batch_code: batch_code.to_string(),
            product_name: batch_code.to_string(),
            product_type,
            volume_l,
            abv_percent,
            lal: volume_l * abv_percent / 100.0,
            tank_code: None,
            status: SourceStatus::InTank,
            distilled_at: None,
            notes: None,
        }
    }

    /// Normalise a batch or tank row from any of the production tables.
    ///
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let record = raw.as_object()?;

        let batch_code = text_field(record, &["batch_id", "batchCode", "run_id", "id"])
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let product_name = text_field(
            record,
            &["product_name", "productName", "recipe", "display_name", "sku"],
        )
        .unwrap_or_else(|| batch_code.clone());
        let product_type = text_field(record, &["product_type", "productType"])
            .and_then(|t| ProductType::from_label(&t))
            .unwrap_or_default();

        let volume_l = coerce_field(
            record,
            &["volume_L", "volumeLitres", "volume_filled_l", "hearts_volume_l"],
            true,
        )
        .unwrap_or(0.0);
        let abv_percent = coerce_field(
            record,
            &["abv_percent", "abvPercent", "fill_abv_percent", "hearts_abv_percent"],
            true,
        )
        .unwrap_or(0.0);

        let status = text_field(record, &["status"])
            .and_then(|s| SourceStatus::from_label(&s))
            .unwrap_or_default();

        Some(Self {
            id: text_field(record, &["id"]).unwrap_or_else(|| batch_code.clone()),
            batch_code,
            product_name,
            product_type,
            volume_l,
            abv_percent,
            lal: volume_l * abv_percent / 100.0,
            tank_code: text_field(record, &["tank", "tankCode", "cask_number"]),
            status,
            distilled_at: text_field(
                record,
                &["distilled_date", "distilledAt", "date", "distillation_date"],
            ),
            notes: text_field(record, &["notes"]),
        })
    }

    pub fn is_available(&self) -> bool {
        self.volume_l > 0.0 && self.abv_percent > 0.0 && self.status.is_available()
    }
}

/// Sources that still hold liquid and are in a drawable state
pub fn available_sources(sources: Vec<BottlingSource>) -> Vec<BottlingSource> {
    sources.into_iter().filter(|s| s.is_available()).collect()
}

/// Spirit drawn from one source for a bottling run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedBatchAllocation {
    pub source: BottlingSource,
    pub volume_to_use_l: f64,
    pub lal: f64,
}

impl SelectedBatchAllocation {
    /// Allocate everything the source currently holds
    pub fn whole(source: BottlingSource) -> Self {
        let volume = source.volume_l;
        Self::new(source, volume)
    }

    pub fn new(source: BottlingSource, volume_to_use_l: f64) -> Self {
        let lal = volume_to_use_l * source.abv_percent / 100.0;
        Self {
            source,
            volume_to_use_l,
            lal,
        }
    }

    /// Change the drawn volume, clamped to what the source holds
    pub fn with_volume(self, volume_l: f64) -> Self {
        let clamped = volume_l.min(self.source.volume_l).max(0.0);
        Self::new(self.source, clamped)
    }

    /// Correct the source ABV (e.g. after a fresh hydrometer reading)
    pub fn with_abv(mut self, abv_percent: f64) -> Self {
        self.source.abv_percent = abv_percent.max(0.0);
        self.source.lal = self.source.volume_l * self.source.abv_percent / 100.0;
        let volume = self.volume_to_use_l;
        Self::new(self.source, volume)
    }

    /// Correct the source's available volume; the drawn volume is re-clamped
    pub fn with_available_volume(mut self, available_l: f64) -> Self {
        self.source.volume_l = available_l.max(0.0);
        self.source.lal = self.source.volume_l * self.source.abv_percent / 100.0;
        let volume = self.volume_to_use_l;
        self.with_volume(volume)
    }
}

/// Water added to the blend on one occasion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DilutionPhase {
    pub date: Option<NaiveDate>,
    pub water_added_l: f64,
    pub notes: Option<String>,
}

/// A planned quantity of one bottle size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BottleEntry {
    pub size_ml: u32,
    pub quantity: u32,
    pub volume_bottled_l: f64,
    pub lal_bottled: f64,
}

impl BottleEntry {
    pub fn new(size_ml: u32, quantity: u32, final_abv: f64) -> Self {
        let volume_bottled_l = f64::from(size_ml) * f64::from(quantity) / 1000.0;
        Self {
            size_ml,
            quantity,
            volume_bottled_l,
            lal_bottled: volume_bottled_l * final_abv / 100.0,
        }
    }

    pub fn with_quantity(self, quantity: u32, final_abv: f64) -> Self {
        Self::new(self.size_ml, quantity, final_abv)
    }

    /// Recompute bottled LAL after the blend's final ABV changed
    pub fn with_final_abv(self, final_abv: f64) -> Self {
        Self {
            lal_bottled: self.volume_bottled_l * final_abv / 100.0,
            ..self
        }
    }
}

/// Computed totals for a bottling run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BottlingSummary {
    pub input_volume_l: f64,
    pub input_lal: f64,
    /// ABV of the undiluted blend
    pub blended_abv: f64,
    pub total_water_added_l: f64,
    pub final_volume_l: f64,
    pub final_abv: f64,
    pub planned_bottled_volume_l: f64,
    pub remaining_volume_l: f64,
}
