//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the staging code stays clean and testable
//! - output changes are localized

use crate::domain::{DescriptorVector, NominalAge, Prediction, SpecimenResult};
use crate::report::BatchSummary;

/// `E<day>:<hh>`, e.g. 342 h -> `E14:06`.
pub fn age_as_string(hours: i64) -> String {
    let day = hours.div_euclid(24);
    let hour = hours.rem_euclid(24);
    format!("E{day}:{hour:02}")
}

/// Age in days snapped to the 0.05-day grid over `[8, 20)`, rounded to 2 decimals.
pub fn fractional_days(hours: f64) -> f64 {
    const START: f64 = 8.0;
    const STEP: f64 = 0.05;
    const COUNT: usize = 240;

    let days = hours / 24.0;
    let mut best = START;
    let mut best_dist = f64::INFINITY;
    for k in 0..COUNT {
        let candidate = START + STEP * k as f64;
        let dist = (candidate - days).abs();
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    (best * 100.0).round() / 100.0
}

/// One-line staging verdict, e.g. `Embryo is E14:06 ±2h (or E14.25, 342h)`.
pub fn format_verdict(prediction: &Prediction) -> String {
    format!(
        "Embryo is {} ±{}h (or E{}, {}h)",
        age_as_string(prediction.best_age),
        prediction.sigma,
        fractional_days(prediction.best_age as f64),
        prediction.best_age
    )
}

pub fn format_descriptors(d: &DescriptorVector) -> String {
    format!(
        "area={:.4} aspect_ratio={:.4} parabolic={:.4}",
        d.area, d.aspect_ratio, d.parabolic
    )
}

/// Full staging summary for a single specimen.
pub fn format_stage_summary(
    name: &str,
    descriptors: &DescriptorVector,
    prediction: &Prediction,
    nominal: Option<&NominalAge>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {name} ===\n"));
    out.push_str(&format_verdict(prediction));
    out.push('\n');
    out.push_str(&format!("Descriptors: {}\n", format_descriptors(descriptors)));
    out.push_str(&format!(
        "Score: {:.4} (calibration point #{})\n",
        prediction.best_score, prediction.curve_index
    ));
    if let Some(nominal) = nominal {
        let hours = nominal.hours();
        out.push_str(&format!(
            "Nominal: {} ({hours}h), off by {:+}h\n",
            nominal.label,
            prediction.best_age - i64::from(hours)
        ));
    }
    out
}

/// Per-specimen table followed by the aggregate statistics.
pub fn format_batch_report(results: &[SpecimenResult], summary: &BatchSummary) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>8} {:>8} {:>6} {:>6} {:>8}\n",
            "specimen", "nominal", "staged", "sigma", "error", "score"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<8} {:-<8} {:-<6} {:-<6} {:-<8}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in results {
        let nominal = r
            .nominal_age
            .as_ref()
            .map(|a| a.hours().to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = match r.prediction {
            Some(p) => format!(
                "{:<28} {:>8} {:>8} {:>6} {:>6} {:>8.4}",
                truncate(&r.name, 28),
                nominal,
                p.best_age,
                p.sigma,
                r.age_error().map(|e| format!("{e:+}")).unwrap_or_else(|| "-".to_string()),
                p.best_score
            ),
            None => format!(
                "{:<28} {:>8} {:>8}  {}",
                truncate(&r.name, 28),
                nominal,
                "-",
                r.failure.as_deref().unwrap_or("no solution")
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format_batch_summary(summary));
    out
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Staged {}/{} specimen(s), {} without a solution\n",
        summary.staged,
        summary.total,
        summary.failed.len()
    ));
    if let (Some(mae), Some(max)) = (summary.mean_abs_error, summary.max_abs_error) {
        out.push_str(&format!(
            "Against nominal age (n={}): mean |error| {mae:.2}h, max {max}h, {} within ±sigma\n",
            summary.compared, summary.within_sigma
        ));
    }
    if let Some(sigma) = summary.mean_sigma {
        out.push_str(&format!("Mean sigma: {sigma:.2}h\n"));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(best_age: i64, sigma: i64) -> Prediction {
        Prediction {
            best_age,
            sigma,
            best_score: 0.125,
            curve_index: 44,
            nearest: [0.0; 3],
        }
    }

    #[test]
    fn age_strings() {
        assert_eq!(age_as_string(342), "E14:06");
        assert_eq!(age_as_string(336), "E14:00");
        assert_eq!(age_as_string(329), "E13:17");
    }

    #[test]
    fn fractional_days_snap_to_grid() {
        assert_eq!(fractional_days(342.0), 14.25);
        assert_eq!(fractional_days(336.0), 14.0);
        // 330 h = 13.75 d
        assert_eq!(fractional_days(330.0), 13.75);
        // 331 h = 13.7917 d -> 13.8
        assert_eq!(fractional_days(331.0), 13.8);
        // beyond the grid: clamps to the last grid value
        assert_eq!(fractional_days(24.0 * 25.0), 19.95);
    }

    #[test]
    fn verdict_line() {
        assert_eq!(format_verdict(&prediction(342, 2)), "Embryo is E14:06 ±2h (or E14.25, 342h)");
    }

    #[test]
    fn stage_summary_mentions_nominal_offset() {
        let nominal = NominalAge {
            day: 14,
            hour: 0,
            label: "E14.00".to_string(),
            litter: "L1".to_string(),
            embryo: String::new(),
        };
        let txt = format_stage_summary(
            "E14.0_L1_RHL.txt",
            &DescriptorVector::new(1.0, 2.0, 3.0),
            &prediction(342, 2),
            Some(&nominal),
        );
        assert!(txt.starts_with("=== E14.0_L1_RHL.txt ===\nEmbryo is E14:06"));
        assert!(txt.contains("area=1.0000 aspect_ratio=2.0000 parabolic=3.0000"));
        assert!(txt.contains("Nominal: E14.00 (336h), off by +6h"));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
