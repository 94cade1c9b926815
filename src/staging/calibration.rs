//! Calibration table construction and sanity checks.
//!
//! The calibration table maps a step along the calibration curve to an age. It
//! is published as a handful of anchor rows (the average age of each reference
//! age group and where that group sits along the curve) and densified by
//! resampling the anchor polyline with the same spline used for outlines.

use log::warn;
use nalgebra::Point2;

use crate::domain::{Calibration, CalibrationTable};
use crate::error::AppError;
use crate::math::{SplineOptions, resample};

/// Anchor rows of the Welsh reference data set: `(step, age in hours)`.
///
/// The first and last groups are extrapolations.
pub const WELSH_TABLE_ANCHORS: [(f64, f64); 8] = [
    (0.0, 318.0),
    (6.0, 324.0),
    (11.0, 330.0),
    (21.0, 336.0),
    (44.0, 342.0),
    (64.0, 348.0),
    (77.0, 354.0),
    (99.0, 366.0),
];

/// Number of rows in a densified calibration table.
pub const TABLE_RESOLUTION: usize = 100;

/// Densify anchor rows into `res` rows along an interpolating spline.
pub fn table_from_anchors(anchors: &[(f64, f64)], res: usize) -> CalibrationTable {
    let points: Vec<Point2<f64>> = anchors.iter().map(|&(s, a)| Point2::new(s, a)).collect();
    let opts = SplineOptions {
        count: res,
        ..SplineOptions::default()
    };
    CalibrationTable {
        rows: resample(&points, &opts).iter().map(|p| (p.x, p.y)).collect(),
    }
}

/// Reject calibration data the matcher cannot use.
///
/// A table whose steps run past the end of the curve is suspicious but usable,
/// so it only produces a warning.
pub fn validate_calibration(calibration: &Calibration) -> Result<(), AppError> {
    let curve = &calibration.curve.points;
    let rows = &calibration.table.rows;
    if curve.is_empty() {
        return Err(AppError::new(4, "Calibration curve has no points."));
    }
    if rows.is_empty() {
        return Err(AppError::new(4, "Calibration table has no rows."));
    }
    if !curve.iter().all(|p| p.iter().all(|v| v.is_finite())) {
        return Err(AppError::new(4, "Calibration curve contains non-finite values."));
    }
    if !rows.iter().all(|(s, a)| s.is_finite() && a.is_finite()) {
        return Err(AppError::new(4, "Calibration table contains non-finite values."));
    }

    let max_step = rows.iter().map(|&(s, _)| s).fold(f64::MIN, f64::max);
    if max_step > (curve.len() - 1) as f64 + 0.5 {
        warn!(
            "calibration table reaches step {max_step:.1} but the curve has only {} points",
            curve.len()
        );
    }
    Ok(())
}
