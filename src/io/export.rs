//! Export staging results.
//!
//! - one JSON document per staged specimen (`write_result_json`)
//! - one CSV row per specimen for a batch run (`write_batch_csv`)
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::domain::SpecimenResult;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ResultDocument<'a> {
    tool: &'static str,
    generated: String,
    operator: &'a str,
    #[serde(flatten)]
    result: &'a SpecimenResult,
}

/// Write a single specimen's result as pretty JSON.
pub fn write_result_json(path: &Path, result: &SpecimenResult, operator: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    let doc = ResultDocument {
        tool: "limbstage",
        generated: Local::now().to_rfc3339(),
        operator,
        result,
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct BatchRow<'a> {
    name: &'a str,
    side: char,
    nominal_hours: Option<u32>,
    predicted_hours: Option<i64>,
    sigma: Option<i64>,
    error_hours: Option<i64>,
    best_score: Option<f64>,
    area: f64,
    aspect_ratio: f64,
    parabolic: f64,
    failure: &'a str,
}

impl<'a> From<&'a SpecimenResult> for BatchRow<'a> {
    fn from(r: &'a SpecimenResult) -> Self {
        Self {
            name: &r.name,
            side: r.side.letter(),
            nominal_hours: r.nominal_age.as_ref().map(|a| a.hours()),
            predicted_hours: r.prediction.map(|p| p.best_age),
            sigma: r.prediction.map(|p| p.sigma),
            error_hours: r.age_error(),
            best_score: r.prediction.map(|p| p.best_score),
            area: r.descriptors.area,
            aspect_ratio: r.descriptors.aspect_ratio,
            parabolic: r.descriptors.parabolic,
            failure: r.failure.as_deref().unwrap_or(""),
        }
    }
}

/// Write batch results to a CSV file, one row per specimen.
pub fn write_batch_csv(path: &Path, results: &[SpecimenResult]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for r in results {
        writer
            .serialize(BatchRow::from(r))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
