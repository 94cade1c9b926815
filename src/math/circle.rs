//! Algebraic (Kåsa) circle fit.
//!
//! The circle `(x - a)^2 + (y - b)^2 = r^2` is rewritten as the linear model
//!
//! ```text
//! x^2 + y^2 = D x + E y + F,   a = D/2, b = E/2, r^2 = F + a^2 + b^2
//! ```
//!
//! and solved by least squares after centering the points on their mean, which
//! keeps the design matrix well conditioned for points far from the origin.

use nalgebra::{DMatrix, DVector, Point2};
use serde::Serialize;

use crate::math::ols::{numerical_rank, solve_least_squares};

/// A fitted circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
    /// Mean absolute distance of the input points from the circle.
    pub residual: f64,
}

/// Fit a circle through `points`.
///
/// Returns `None` for fewer than three points, collinear points, or a fit whose
/// radius is not a finite positive number.
pub fn fit_circle(points: &[Point2<f64>]) -> Option<Circle> {
    if points.len() < 3 {
        return None;
    }

    let n = points.len() as f64;
    let mean = points.iter().fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords) / n;

    let x = DMatrix::from_fn(points.len(), 3, |i, c| match c {
        0 => points[i].x - mean.x,
        1 => points[i].y - mean.y,
        _ => 1.0,
    });
    if numerical_rank(&x) < 3 {
        return None;
    }
    let y = DVector::from_iterator(
        points.len(),
        points.iter().map(|p| (p.coords - mean).norm_squared()),
    );

    let beta = solve_least_squares(&x, &y)?;
    let a = beta[0] / 2.0;
    let b = beta[1] / 2.0;
    let radius = (beta[2] + a * a + b * b).sqrt();
    if !(radius.is_finite() && radius > 0.0) {
        return None;
    }

    let center = Point2::new(a + mean.x, b + mean.y);
    let residual = points
        .iter()
        .map(|p| ((p - center).norm() - radius).abs())
        .sum::<f64>()
        / n;

    Some(Circle {
        center,
        radius,
        residual,
    })
}
