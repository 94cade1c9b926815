//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during staging
//! - exported to JSON/CSV
//! - reloaded later as calibration artifacts

use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::descriptors::ExtractorParams;

/// The three-scalar shape signature compared against the calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescriptorVector {
    pub area: f64,
    pub aspect_ratio: f64,
    pub parabolic: f64,
}

impl DescriptorVector {
    /// Canonical "no solution" value.
    pub const ZERO: DescriptorVector = DescriptorVector {
        area: 0.0,
        aspect_ratio: 0.0,
        parabolic: 0.0,
    };

    pub fn new(area: f64, aspect_ratio: f64, parabolic: f64) -> Self {
        Self {
            area,
            aspect_ratio,
            parabolic,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.area, self.aspect_ratio, self.parabolic]
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.area, self.aspect_ratio, self.parabolic)
    }

    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.area * k, self.aspect_ratio * k, self.parabolic * k)
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl From<[f64; 3]> for DescriptorVector {
    fn from([area, aspect_ratio, parabolic]: [f64; 3]) -> Self {
        Self::new(area, aspect_ratio, parabolic)
    }
}

/// Which limb was traced, inferred from the record file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Unknown,
}

impl Side {
    /// `RH`/`right` marks a right limb, `LH`/`left` a left one.
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("RH") {
            Side::Right
        } else if name.contains("LH") {
            Side::Left
        } else if name.contains("right") {
            Side::Right
        } else if name.contains("left") {
            Side::Left
        } else {
            Side::Unknown
        }
    }

    pub fn letter(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
            Side::Unknown => 'U',
        }
    }
}

/// File naming convention used to encode the nominal age of a specimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NameParser {
    /// `E<day>.<hour>_<litter>...`, e.g. `E12.18_L5.txt`.
    Heura,
    /// Quarter-day names, e.g. `E13.25_L3_RHL.txt` (13 days 6 hours).
    Welsh,
    /// `E<day>;<hour>_<litter>_<embryo>...`, e.g. `E13;06_L1_E2.txt`.
    Generic,
}

/// Nominal age parsed from a record file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalAge {
    pub day: u32,
    pub hour: u32,
    /// Label as written in the naming convention, e.g. `E13.06`.
    pub label: String,
    pub litter: String,
    pub embryo: String,
}

impl NominalAge {
    pub fn hours(&self) -> u32 {
        24 * self.day + self.hour
    }
}

/// Read-only reference polyline in descriptor space, ordered by developmental
/// progression.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCurve {
    pub points: Vec<Vector3<f64>>,
}

/// Step-index-to-age lookup paired with the calibration curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    /// `(step along the calibration curve, age in hours)`.
    pub rows: Vec<(f64, f64)>,
}

/// Both calibration artifacts, loaded once and shared immutably.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub curve: CalibrationCurve,
    pub table: CalibrationTable,
}

/// On-disk form of [`CalibrationCurve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationCurveFile {
    pub tool: String,
    /// `[area, aspect_ratio, parabolic]` per point.
    pub points: Vec<[f64; 3]>,
}

/// On-disk form of [`CalibrationTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationTableFile {
    pub tool: String,
    /// `[step, age_hours]` per row.
    pub rows: Vec<[f64; 2]>,
}

/// Outcome of matching a descriptor vector against the calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Estimated age in whole hours.
    pub best_age: i64,
    /// Heuristic uncertainty in hours from local calibration-curve density.
    pub sigma: i64,
    /// Distance from the descriptor vector to the nearest calibration point.
    pub best_score: f64,
    /// Index of the nearest calibration-curve point.
    pub curve_index: usize,
    /// The nearest calibration-curve point.
    pub nearest: [f64; 3],
}

/// Result of staging one specimen, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecimenResult {
    pub name: String,
    pub side: Side,
    pub nominal_age: Option<NominalAge>,
    /// `[0, 0, 0]` when no solution was found.
    pub descriptors: DescriptorVector,
    pub prediction: Option<Prediction>,
    /// Why no prediction was made.
    pub failure: Option<String>,
}

impl SpecimenResult {
    /// Predicted minus nominal age, in hours, when both are known.
    pub fn age_error(&self) -> Option<i64> {
        let p = self.prediction.as_ref()?;
        let nominal = self.nominal_age.as_ref()?;
        Some(p.best_age - i64::from(nominal.hours()))
    }
}

/// A single staging run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment defaults and `.env`.
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Record file to stage.
    pub record: PathBuf,
    /// Directory holding `calibration_spline.json` and `calibration_table.json`.
    pub calibration_dir: PathBuf,
    /// Name written into output record headers.
    pub operator: String,
    /// Naming convention used to read a nominal age from the record name.
    pub parser: Option<NameParser>,
    pub extractor: ExtractorParams,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Where to write the companion record and JSON result.
    pub output_dir: Option<PathBuf>,
    /// Where to write the per-round markdown dump, if requested.
    pub debug_dir: Option<PathBuf>,
}

/// Batch staging configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub source_dir: PathBuf,
    pub calibration_dir: PathBuf,
    pub parser: NameParser,
    pub extractor: ExtractorParams,
    pub export_csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_from_file_name() {
        assert_eq!(Side::from_file_name("E13.25_L3_RHL.txt"), Side::Right);
        assert_eq!(Side::from_file_name("E13.25_L3_LHL.txt"), Side::Left);
        assert_eq!(Side::from_file_name("limb_left.txt"), Side::Left);
        assert_eq!(Side::from_file_name("limb.txt"), Side::Unknown);
    }

    #[test]
    fn nominal_age_in_hours() {
        let age = NominalAge {
            day: 14,
            hour: 6,
            label: "E14.06".to_string(),
            litter: "L1".to_string(),
            embryo: String::new(),
        };
        assert_eq!(age.hours(), 342);
    }

    #[test]
    fn age_error_needs_prediction_and_nominal_age() {
        let nominal = NominalAge {
            day: 13,
            hour: 12,
            label: "E13.12".to_string(),
            litter: "L2".to_string(),
            embryo: String::new(),
        };
        let prediction = Prediction {
            best_age: 340,
            sigma: 2,
            best_score: 0.5,
            curve_index: 40,
            nearest: [0.0; 3],
        };
        let mut result = SpecimenResult {
            name: "E13.5_L2_RHL.txt".to_string(),
            side: Side::Right,
            nominal_age: Some(nominal),
            descriptors: DescriptorVector::ZERO,
            prediction: Some(prediction),
            failure: None,
        };
        assert_eq!(result.age_error(), Some(340 - 324));
        result.prediction = None;
        assert_eq!(result.age_error(), None);
    }

    #[test]
    fn descriptor_vector_scaling() {
        let v = DescriptorVector::new(1.0, 2.0, 3.0).scaled(10.0);
        assert_eq!(v.to_array(), [10.0, 20.0, 30.0]);
        assert!(v.is_finite());
        assert!(!DescriptorVector::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}
