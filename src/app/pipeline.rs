//! Shared staging pipeline used by the single-record and batch front-ends.
//!
//! outline -> descriptor extraction -> calibration match
//!
//! The front-ends can then focus on presentation and exports.

use log::{info, warn};
use nalgebra::Point2;

use crate::descriptors::{Extraction, ExtractorParams, extract};
use crate::domain::{Calibration, DescriptorVector, Prediction, SpecimenResult};
use crate::error::AppError;
use crate::io::SpecimenRecord;
use crate::staging::predict_age;

/// Fewer digitized points than this cannot describe a limb.
pub const MIN_OUTLINE_POINTS: usize = 6;

/// All computed outputs of staging one outline.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub extraction: Extraction,
    pub prediction: Prediction,
}

/// Extract descriptors from `points` and match them against `calibration`.
///
/// The matcher is only consulted when extraction succeeded; a failed extraction
/// comes back as exit code 3.
pub fn stage_outline(
    points: &[Point2<f64>],
    calibration: &Calibration,
    params: &ExtractorParams,
) -> Result<StageOutput, AppError> {
    if points.len() < MIN_OUTLINE_POINTS {
        return Err(AppError::new(
            2,
            format!("Not enough points to stage a limb: {} (need {MIN_OUTLINE_POINTS}).", points.len()),
        ));
    }

    let extraction = extract(points, params)?;
    let prediction = predict_age(&extraction.descriptors, calibration)?;
    Ok(StageOutput {
        extraction,
        prediction,
    })
}

/// Stage a loaded record, folding any failure into the result.
pub fn stage_specimen(
    record: &SpecimenRecord,
    calibration: &Calibration,
    params: &ExtractorParams,
) -> SpecimenResult {
    let (descriptors, prediction, failure) = match stage_outline(&record.points, calibration, params) {
        Ok(out) => {
            info!(
                "{}: {}h ±{}h (score {:.4})",
                record.name, out.prediction.best_age, out.prediction.sigma, out.prediction.best_score
            );
            (out.extraction.descriptors, Some(out.prediction), None)
        }
        Err(err) => {
            warn!("{}: {err}", record.name);
            (DescriptorVector::ZERO, None, Some(err.to_string()))
        }
    };

    SpecimenResult {
        name: record.name.clone(),
        side: record.side,
        nominal_age: record.nominal_age.clone(),
        descriptors,
        prediction,
        failure,
    }
}
