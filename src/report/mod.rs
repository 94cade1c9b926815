//! Reporting utilities: batch statistics and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::SpecimenResult;

/// Aggregate view of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub staged: usize,
    /// Names of specimens without a solution.
    pub failed: Vec<String>,
    /// Staged specimens that also carry a nominal age.
    pub compared: usize,
    pub mean_abs_error: Option<f64>,
    pub max_abs_error: Option<i64>,
    /// Compared specimens whose nominal age lies within `best_age ± sigma`.
    pub within_sigma: usize,
    pub mean_sigma: Option<f64>,
}

/// Summarize batch results against their nominal ages.
pub fn summarize_batch(results: &[SpecimenResult]) -> BatchSummary {
    let failed: Vec<String> = results
        .iter()
        .filter(|r| r.prediction.is_none())
        .map(|r| r.name.clone())
        .collect();
    let sigmas: Vec<i64> = results.iter().filter_map(|r| r.prediction.map(|p| p.sigma)).collect();

    let mut abs_errors = Vec::new();
    let mut within_sigma = 0;
    for r in results {
        let (Some(err), Some(p)) = (r.age_error(), r.prediction) else {
            continue;
        };
        abs_errors.push(err.abs());
        if err.abs() <= p.sigma {
            within_sigma += 1;
        }
    }

    BatchSummary {
        total: results.len(),
        staged: sigmas.len(),
        failed,
        compared: abs_errors.len(),
        mean_abs_error: mean(abs_errors.iter().map(|&e| e as f64)),
        max_abs_error: abs_errors.iter().copied().max(),
        within_sigma,
        mean_sigma: mean(sigmas.iter().map(|&s| s as f64)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
