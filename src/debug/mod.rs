//! Debug bundle writer for inspecting every refinement round of an extraction.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::descriptors::{Extraction, RoundDiagnostics};
use crate::domain::Prediction;
use crate::error::AppError;
use crate::math::Extremum;

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(2, format!("Failed to write debug bundle: {e}"))
}

/// Write a markdown dump of `extraction` into `dir` and return its path.
pub fn write_debug_bundle(
    dir: &Path,
    name: &str,
    extraction: &Extraction,
    prediction: Option<&Prediction>,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let stem = name.strip_suffix(".txt").unwrap_or(name);
    let path = dir.join(format!("limbstage_debug_{stem}_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create debug file: {e}")))?;

    writeln!(file, "# limbstage debug bundle").map_err(write_err)?;
    writeln!(file, "- specimen: {name}").map_err(write_err)?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339()).map_err(write_err)?;
    writeln!(file, "- resampled points: {}", extraction.curve.len()).map_err(write_err)?;
    writeln!(file, "- average size: {:.6}", extraction.scale).map_err(write_err)?;

    for round in &extraction.rounds {
        write_round(&mut file, round)?;
    }

    let d = &extraction.descriptors;
    writeln!(file, "\n## Descriptors").map_err(write_err)?;
    writeln!(file, "- final radius: {:.6}", extraction.final_circle.radius).map_err(write_err)?;
    writeln!(file, "- ribbon area: {:.6}", extraction.ribbon.area).map_err(write_err)?;
    writeln!(
        file,
        "- ribbon bounds: width {:.4}, height {:.6}",
        extraction.ribbon.bounds.width(),
        extraction.ribbon.bounds.height()
    )
    .map_err(write_err)?;
    writeln!(
        file,
        "- parabola (degree {}): {}",
        extraction.parabola.degree,
        fmt_vec(&extraction.parabola.coeffs)
    )
    .map_err(write_err)?;
    writeln!(
        file,
        "- area={:.6} aspect_ratio={:.6} parabolic={:.6}",
        d.area, d.aspect_ratio, d.parabolic
    )
    .map_err(write_err)?;

    if let Some(p) = prediction {
        writeln!(file, "\n## Prediction").map_err(write_err)?;
        writeln!(file, "- best_age: {}h ±{}h", p.best_age, p.sigma).map_err(write_err)?;
        writeln!(file, "- best_score: {:.6}", p.best_score).map_err(write_err)?;
        writeln!(file, "- nearest: #{} {}", p.curve_index, fmt_vec(&p.nearest)).map_err(write_err)?;
    }

    Ok(path)
}

fn write_round(file: &mut File, round: &RoundDiagnostics) -> Result<(), AppError> {
    writeln!(file, "\n## Round {}", round.round).map_err(write_err)?;
    writeln!(file, "- center: ({:.6}, {:.6})", round.center.x, round.center.y).map_err(write_err)?;
    let circle = match &round.circle {
        Some(c) => writeln!(file, "- circle: radius {:.6}, residual {:.3e}", c.radius, c.residual),
        None => writeln!(file, "- circle: - (centroid)"),
    };
    circle.map_err(write_err)?;

    writeln!(file, "\n| kind | index | distance |").map_err(write_err)?;
    writeln!(file, "| - | - | - |").map_err(write_err)?;
    write_extrema(file, "peak", &round.peaks)?;
    write_extrema(file, "valley", &round.valleys)?;
    Ok(())
}

fn write_extrema(file: &mut File, kind: &str, extrema: &[Extremum]) -> Result<(), AppError> {
    for e in extrema {
        writeln!(file, "| {kind} | {} | {:.6} |", e.index, e.value).map_err(write_err)?;
    }
    Ok(())
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
