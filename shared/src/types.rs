//! Common types used across the engine

use serde::{Deserialize, Serialize};

use crate::lal;

/// Volume, strength and absolute alcohol of one portion of spirit.
///
/// Figures supplied by an upstream source are kept exactly as measured, even
/// when they disagree with each other. LAL is only derived when it is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub volume_l: Option<f64>,
    pub abv_percent: Option<f64>,
    pub lal: Option<f64>,
}

impl Measurement {
    pub fn new(volume_l: Option<f64>, abv_percent: Option<f64>, lal: Option<f64>) -> Self {
        Self {
            volume_l,
            abv_percent,
            lal,
        }
    }

    /// Build a measurement from a known volume and strength, deriving LAL
    pub fn from_volume_abv(volume_l: f64, abv_percent: f64) -> Self {
        Self {
            volume_l: Some(volume_l),
            abv_percent: Some(abv_percent),
            lal: Some(volume_l * abv_percent / 100.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.volume_l.is_none() && self.abv_percent.is_none() && self.lal.is_none()
    }

    /// Fill in LAL from volume and ABV when no LAL was supplied
    pub fn resolved(self) -> Self {
        match self.lal {
            Some(_) => self,
            None => Self {
                lal: lal::lal(self.volume_l, self.abv_percent),
                ..self
            },
        }
    }
}

/// Named portions of a distillation run's output stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CutPhase {
    Foreshots,
    Heads,
    Hearts,
    EarlyTails,
    LateTails,
    /// Tails reported as a single cut, or a segment of an unlabelled tails list
    Tails,
}

impl CutPhase {
    pub const ALL: [CutPhase; 6] = [
        CutPhase::Foreshots,
        CutPhase::Heads,
        CutPhase::Hearts,
        CutPhase::EarlyTails,
        CutPhase::LateTails,
        CutPhase::Tails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CutPhase::Foreshots => "foreshots",
            CutPhase::Heads => "heads",
            CutPhase::Hearts => "hearts",
            CutPhase::EarlyTails => "early_tails",
            CutPhase::LateTails => "late_tails",
            CutPhase::Tails => "tails",
        }
    }

    /// Parse a free-text phase label such as `"Hearts"` or `"Early Tails"`
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "foreshots" | "foreshot" => Some(CutPhase::Foreshots),
            "heads" | "head" => Some(CutPhase::Heads),
            "hearts" | "heart" => Some(CutPhase::Hearts),
            "early_tails" | "early_tail" => Some(CutPhase::EarlyTails),
            "late_tails" | "late_tail" => Some(CutPhase::LateTails),
            "tails" | "tail" => Some(CutPhase::Tails),
            _ => None,
        }
    }

    pub fn is_tails(&self) -> bool {
        matches!(
            self,
            CutPhase::EarlyTails | CutPhase::LateTails | CutPhase::Tails
        )
    }
}

impl std::fmt::Display for CutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutPhase::Foreshots => write!(f, "Foreshots"),
            CutPhase::Heads => write!(f, "Heads"),
            CutPhase::Hearts => write!(f, "Hearts"),
            CutPhase::EarlyTails => write!(f, "Early Tails"),
            CutPhase::LateTails => write!(f, "Late Tails"),
            CutPhase::Tails => write!(f, "Tails"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_fills_missing_lal() {
        let m = Measurement::new(Some(100.0), Some(40.0), None).resolved();
        assert_eq!(m.lal, Some(40.0));
    }

    #[test]
    fn test_resolved_keeps_supplied_lal() {
        // 100 L at 40% would be 40 LAL, but the measured figure stands
        let m = Measurement::new(Some(100.0), Some(40.0), Some(38.7)).resolved();
        assert_eq!(m.lal, Some(38.7));
    }

    #[test]
    fn test_resolved_without_abv_stays_empty() {
        let m = Measurement::new(Some(100.0), None, None).resolved();
        assert_eq!(m.lal, None);
        assert!(!m.is_empty());
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(CutPhase::from_label("Hearts"), Some(CutPhase::Hearts));
        assert_eq!(CutPhase::from_label("HEADS"), Some(CutPhase::Heads));
        assert_eq!(CutPhase::from_label("Early Tails"), Some(CutPhase::EarlyTails));
        assert_eq!(CutPhase::from_label("late-tails"), Some(CutPhase::LateTails));
        assert_eq!(CutPhase::from_label("feints"), None);
        assert!(CutPhase::LateTails.is_tails());
        assert!(!CutPhase::Hearts.is_tails());
    }
}
