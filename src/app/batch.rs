//! Batch staging of a directory of records.
//!
//! Records are read sequentially so parse errors are reported per file, then
//! staged in parallel against one shared calibration. Results come back sorted
//! by file name.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;

use crate::app::pipeline::stage_specimen;
use crate::domain::{BatchConfig, Calibration, DescriptorVector, Side, SpecimenResult};
use crate::error::AppError;
use crate::io::SpecimenRecord;

/// `.txt` files directly inside `dir`, sorted by path.
pub fn collect_records(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read directory '{}': {e}", dir.display())))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Stage every record under `config.source_dir`.
pub fn run_batch(config: &BatchConfig, calibration: &Calibration) -> Result<Vec<SpecimenResult>, AppError> {
    let paths = collect_records(&config.source_dir)?;
    if paths.is_empty() {
        return Err(AppError::new(
            2,
            format!("No .txt records found in '{}'.", config.source_dir.display()),
        ));
    }
    info!("staging {} record(s) from {}", paths.len(), config.source_dir.display());

    let mut records = Vec::with_capacity(paths.len());
    let mut results = Vec::new();
    for path in &paths {
        match SpecimenRecord::load(path, Some(config.parser)) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!("{err}");
                results.push(unreadable(path, err));
            }
        }
    }

    let staged: Vec<SpecimenResult> = records
        .par_iter()
        .map(|record| stage_specimen(record, calibration, &config.extractor))
        .collect();
    results.extend(staged);

    results.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(results)
}

fn unreadable(path: &Path, err: AppError) -> SpecimenResult {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    SpecimenResult {
        side: Side::from_file_name(&name),
        name,
        nominal_age: None,
        descriptors: DescriptorVector::ZERO,
        prediction: None,
        failure: Some(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::calibration_through;
    use crate::data::synthetic::{SyntheticOutline, lobed_outline};
    use crate::descriptors::{ExtractorParams, extract};
    use crate::domain::NameParser;
    use crate::io::write_measured_record;

    #[test]
    fn stages_a_directory_and_sorts_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let outline = lobed_outline(&SyntheticOutline::default());
        write_measured_record(&dir.path().join("E14;06_L1_E2.txt"), "t", "E14;06_L1_E2", &outline).unwrap();
        write_measured_record(&dir.path().join("E13;18_L1_E1.txt"), "t", "E13;18_L1_E1", &outline).unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::write(dir.path().join("E13;00_L2_E1.txt"), "header\nMEASURED 1\n").unwrap();

        let params = ExtractorParams::default();
        let descriptors = extract(&outline, &params).unwrap().descriptors;
        let calibration = calibration_through(descriptors);
        let config = BatchConfig {
            source_dir: dir.path().to_path_buf(),
            calibration_dir: PathBuf::from("unused"),
            parser: NameParser::Generic,
            extractor: params,
            export_csv: None,
        };

        let results = run_batch(&config, &calibration).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["E13;00_L2_E1.txt", "E13;18_L1_E1.txt", "E14;06_L1_E2.txt"]);

        assert!(results[0].failure.as_deref().unwrap().contains("Malformed record"));
        assert_eq!(results[1].prediction.unwrap().best_age, 343);
        assert_eq!(results[1].age_error(), Some(343 - 330));
        assert_eq!(results[2].age_error(), Some(343 - 342));
    }

    #[test]
    fn empty_directory_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig {
            source_dir: dir.path().to_path_buf(),
            calibration_dir: PathBuf::from("unused"),
            parser: NameParser::Welsh,
            extractor: ExtractorParams::default(),
            export_csv: None,
        };
        let cal = calibration_through(DescriptorVector::ZERO);
        assert_eq!(run_batch(&config, &cal).unwrap_err().exit_code(), 2);
    }
}
