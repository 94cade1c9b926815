//! Quadratic least squares fit of valley heights against valley index.

use nalgebra::{DMatrix, DVector, Point2};
use serde::Serialize;

use crate::math::ols::solve_least_squares;

/// Number of diagnostic samples along the fitted parabola.
pub const PARABOLA_SAMPLES: usize = 50;
/// Diagnostic sample range (resampled curve index space).
pub const PARABOLA_RANGE: (f64, f64) = (0.0, 200.0);

/// Quadratic fit `y = a x^2 + b x + c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParabolaFit {
    /// Coefficients, highest degree first: `[a, b, c]`.
    pub coeffs: [f64; 3],
    /// Polynomial degree actually fitted (2 unless fewer than 3 points).
    pub degree: usize,
    /// Dense samples of the fitted curve for plotting.
    pub samples: Vec<Point2<f64>>,
}

impl ParabolaFit {
    /// Leading (quadratic) coefficient.
    pub fn leading(&self) -> f64 {
        self.coeffs[0]
    }

    pub fn eval(&self, x: f64) -> f64 {
        let [a, b, c] = self.coeffs;
        (a * x + b) * x + c
    }
}

/// Fit a quadratic to `(xs[i], ys[i])`.
///
/// With fewer than three points the degree drops to what the data determines
/// (a line through two points, a constant through one) and the missing
/// higher-order coefficients are zero. Returns `None` for empty or mismatched
/// input or when the solver cannot produce finite coefficients.
pub fn fit_parabola(xs: &[f64], ys: &[f64]) -> Option<ParabolaFit> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }

    let degree = (xs.len() - 1).min(2);
    let cols = degree + 1;
    let x = DMatrix::from_fn(xs.len(), cols, |i, c| xs[i].powi((degree - c) as i32));
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&x, &y)?;
    let mut coeffs = [0.0; 3];
    for (slot, value) in coeffs[3 - cols..].iter_mut().zip(beta.iter()) {
        *slot = *value;
    }

    let mut fit = ParabolaFit {
        coeffs,
        degree,
        samples: Vec::new(),
    };
    fit.samples = sample_range(PARABOLA_RANGE, PARABOLA_SAMPLES)
        .map(|x| Point2::new(x, fit.eval(x)))
        .collect();
    Some(fit)
}

fn sample_range((lo, hi): (f64, f64), n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| lo + step * i as f64)
}
