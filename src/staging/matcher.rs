//! Age matching against the calibration curve.
//!
//! Given a descriptor vector `v`:
//!
//! 1. find the calibration-curve point nearest to `v` (first index wins ties)
//! 2. pick the table row whose step is closest to that point's index; its age,
//!    rounded to whole hours, is the estimate
//! 3. `best_score = |v - nearest|`
//! 4. `sigma = round((count + 1) / 2)`, `count` the number of curve points within
//!    `1.2 * best_score` of `v`
//!
//! `sigma` is a density heuristic rather than a statistical interval; it is kept
//! as-is so results stay comparable with previously staged specimens. Rounding
//! is half-to-even throughout.

use log::debug;

use crate::domain::{Calibration, CalibrationCurve, CalibrationTable, DescriptorVector, Prediction};
use crate::error::AppError;

/// Search radius multiplier for the sigma heuristic.
const SIGMA_RADIUS_FACTOR: f64 = 1.2;

/// Match `descriptors` against `calibration`.
pub fn predict_age(descriptors: &DescriptorVector, calibration: &Calibration) -> Result<Prediction, AppError> {
    let v = descriptors.to_vector();
    if !v.iter().all(|x| x.is_finite()) {
        return Err(AppError::new(4, "Descriptor vector is not finite."));
    }

    let (curve_index, best_score) = nearest_point(&calibration.curve, descriptors)
        .ok_or_else(|| AppError::new(4, "Calibration curve is empty."))?;
    let best_age = age_at_step(&calibration.table, curve_index as f64)
        .ok_or_else(|| AppError::new(4, "Calibration table is empty."))?;

    let radius = best_score * SIGMA_RADIUS_FACTOR;
    let count = points_within(&calibration.curve, descriptors, radius);
    let sigma = ((count as f64 + 1.0) / 2.0).round_ties_even() as i64;

    let q = calibration.curve.points[curve_index];
    debug!(
        "nearest calibration point #{curve_index} at distance {best_score:.4}; {count} point(s) within {radius:.4}"
    );

    Ok(Prediction {
        best_age,
        sigma,
        best_score,
        curve_index,
        nearest: [q.x, q.y, q.z],
    })
}

/// Index of, and distance to, the curve point nearest to `v`.
pub fn nearest_point(curve: &CalibrationCurve, v: &DescriptorVector) -> Option<(usize, f64)> {
    let v = v.to_vector();
    curve
        .points
        .iter()
        .map(|p| (p - v).norm())
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((i, d)),
        })
}

/// Age (rounded to whole hours) of the table row whose step is closest to `step`.
pub fn age_at_step(table: &CalibrationTable, step: f64) -> Option<i64> {
    table
        .rows
        .iter()
        .fold(None, |best: Option<(f64, f64)>, &(s, age)| {
            let d = (s - step).abs();
            match best {
                Some((bd, _)) if bd <= d => best,
                _ => Some((d, age)),
            }
        })
        .map(|(_, age)| age.round_ties_even() as i64)
}

/// Number of curve points within `radius` of `v` (inclusive).
pub fn points_within(curve: &CalibrationCurve, v: &DescriptorVector, radius: f64) -> usize {
    let v = v.to_vector();
    let r2 = radius * radius;
    curve
        .points
        .iter()
        .filter(|p| (*p - v).norm_squared() <= r2)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn calibration() -> Calibration {
        let points = (0..100)
            .map(|i| {
                let s = i as f64;
                Vector3::new(20.0 + 0.5 * s, 30.0 - 0.1 * s, 10.0 + 0.02 * s)
            })
            .collect();
        let rows = (0..100)
            .map(|i| (i as f64, 318.0 + 48.0 * i as f64 / 99.0))
            .collect();
        Calibration {
            curve: CalibrationCurve { points },
            table: CalibrationTable { rows },
        }
    }

    #[test]
    fn exact_curve_point_matches_itself() {
        let cal = calibration();
        let k = 37;
        let q = cal.curve.points[k];
        let v = DescriptorVector::new(q.x, q.y, q.z);

        let p = predict_age(&v, &cal).unwrap();
        assert_eq!(p.curve_index, k);
        assert!(p.best_score < 1e-12);
        assert_eq!(p.best_age, (318.0_f64 + 48.0 * 37.0 / 99.0).round() as i64);
        // Only the point itself lies within a zero radius.
        assert_eq!(p.sigma, 1);
    }

    #[test]
    fn sigma_grows_with_local_density() {
        let cal = calibration();
        // Off the curve, level with point 50: neighbours fall inside 1.2 * score.
        let q = cal.curve.points[50];
        let v = DescriptorVector::new(q.x, q.y, q.z + 2.0);
        let p = predict_age(&v, &cal).unwrap();
        assert_eq!(p.curve_index, 50);
        let count = points_within(&cal.curve, &v, p.best_score * 1.2);
        assert!(count > 1);
        assert_eq!(p.sigma, ((count as f64 + 1.0) / 2.0).round_ties_even() as i64);
    }

    #[test]
    fn table_lookup_uses_closest_step() {
        let table = CalibrationTable {
            rows: vec![(0.0, 318.0), (6.0, 324.0), (11.0, 330.0), (21.0, 336.4)],
        };
        assert_eq!(age_at_step(&table, 7.0), Some(324));
        assert_eq!(age_at_step(&table, 19.0), Some(336));
        assert_eq!(age_at_step(&CalibrationTable { rows: vec![] }, 1.0), None);
    }

    #[test]
    fn half_hours_round_to_even() {
        let table = CalibrationTable {
            rows: vec![(0.0, 336.5), (10.0, 337.5)],
        };
        assert_eq!(age_at_step(&table, 0.0), Some(336));
        assert_eq!(age_at_step(&table, 10.0), Some(338));
    }

    #[test]
    fn ties_resolve_to_the_first_point() {
        let curve = CalibrationCurve {
            points: vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)],
        };
        let v = DescriptorVector::new(1.0, 0.0, 0.0);
        assert_eq!(nearest_point(&curve, &v), Some((0, 1.0)));
    }

    #[test]
    fn empty_calibration_is_an_error() {
        let cal = Calibration {
            curve: CalibrationCurve { points: vec![] },
            table: CalibrationTable { rows: vec![(0.0, 318.0)] },
        };
        let err = predict_age(&DescriptorVector::ZERO, &cal).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
