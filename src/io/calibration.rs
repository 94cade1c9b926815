//! Read/write calibration JSON files.
//!
//! A calibration directory holds two artifacts:
//! - `calibration_spline.json`: the reference curve in descriptor space
//! - `calibration_table.json`: step-along-curve to age lookup
//!
//! The schemas are defined by `domain::CalibrationCurveFile` and
//! `domain::CalibrationTableFile`.

use std::fs::File;
use std::path::Path;

use log::info;
use nalgebra::Vector3;

use crate::domain::{Calibration, CalibrationCurve, CalibrationCurveFile, CalibrationTable, CalibrationTableFile};
use crate::error::AppError;
use crate::staging::validate_calibration;

pub const CURVE_FILE_NAME: &str = "calibration_spline.json";
pub const TABLE_FILE_NAME: &str = "calibration_table.json";

const TOOL: &str = "limbstage";

/// Load and validate both artifacts from `dir`.
pub fn load_calibration(dir: &Path) -> Result<Calibration, AppError> {
    let curve = read_calibration_curve(&dir.join(CURVE_FILE_NAME))?;
    let table = read_calibration_table(&dir.join(TABLE_FILE_NAME))?;
    let calibration = Calibration { curve, table };
    validate_calibration(&calibration)?;
    info!(
        "loaded calibration from {} ({} curve points, {} table rows)",
        dir.display(),
        calibration.curve.points.len(),
        calibration.table.rows.len()
    );
    Ok(calibration)
}

/// Read a calibration curve JSON file.
pub fn read_calibration_curve(path: &Path) -> Result<CalibrationCurve, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open calibration curve '{}': {e}", path.display())))?;
    let raw: CalibrationCurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(4, format!("Invalid calibration curve JSON '{}': {e}", path.display())))?;
    Ok(CalibrationCurve {
        points: raw.points.iter().map(|&[a, b, c]| Vector3::new(a, b, c)).collect(),
    })
}

/// Read a calibration table JSON file.
pub fn read_calibration_table(path: &Path) -> Result<CalibrationTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open calibration table '{}': {e}", path.display())))?;
    let raw: CalibrationTableFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(4, format!("Invalid calibration table JSON '{}': {e}", path.display())))?;
    Ok(CalibrationTable {
        rows: raw.rows.iter().map(|&[s, a]| (s, a)).collect(),
    })
}

/// Write a calibration curve JSON file.
pub fn write_calibration_curve(path: &Path, curve: &CalibrationCurve) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create calibration curve '{}': {e}", path.display())))?;
    let raw = CalibrationCurveFile {
        tool: TOOL.to_string(),
        points: curve.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
    };
    serde_json::to_writer_pretty(file, &raw)
        .map_err(|e| AppError::new(2, format!("Failed to write calibration curve: {e}")))?;
    Ok(())
}

/// Write a calibration table JSON file.
pub fn write_calibration_table(path: &Path, table: &CalibrationTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create calibration table '{}': {e}", path.display())))?;
    let raw = CalibrationTableFile {
        tool: TOOL.to_string(),
        rows: table.rows.iter().map(|&(s, a)| [s, a]).collect(),
    };
    serde_json::to_writer_pretty(file, &raw)
        .map_err(|e| AppError::new(2, format!("Failed to write calibration table: {e}")))?;
    Ok(())
}
