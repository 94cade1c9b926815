//! Synthetic limb-bud outlines.
//!
//! A lobed open arc mimics a traced autopod: the outline runs from one side of
//! the limb base round the distal edge to the other side, and the digit
//! condensations show up as `lobes` bumps in the radius:
//!
//! ```text
//! θ(t) = start + span * t
//! r(t) = R * (1 - A * cos(2π * lobes * t)),   t ∈ [0, 1]
//! ```
//!
//! so both ends sit in a valley and every lobe crest is interior. Optional
//! Gaussian jitter (seeded, reproducible) imitates hand digitization.

use nalgebra::{Point2, Vector2};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Shape parameters of a synthetic outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticOutline {
    /// Number of digitized points.
    pub points: usize,
    pub center: Point2<f64>,
    /// Mean radius `R`.
    pub radius: f64,
    pub lobes: usize,
    /// Relative lobe amplitude `A`.
    pub amplitude: f64,
    /// Angle of the first point (radians).
    pub start_angle: f64,
    /// Angular extent of the outline (radians).
    pub span: f64,
    /// Jitter standard deviation relative to `R` (0 disables jitter).
    pub noise: f64,
    pub seed: u64,
}

impl Default for SyntheticOutline {
    fn default() -> Self {
        Self {
            points: 60,
            center: Point2::origin(),
            radius: 50.0,
            lobes: 5,
            amplitude: 0.15,
            start_angle: -0.3 * std::f64::consts::PI,
            span: 1.6 * std::f64::consts::PI,
            noise: 0.0,
            seed: 42,
        }
    }
}

/// Noise-free lobed outline.
pub fn lobed_outline(shape: &SyntheticOutline) -> Vec<Point2<f64>> {
    let n = shape.points.max(2);
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let theta = shape.start_angle + shape.span * t;
            let r = shape.radius
                * (1.0 - shape.amplitude * (std::f64::consts::TAU * shape.lobes as f64 * t).cos());
            shape.center + Vector2::new(theta.cos(), theta.sin()) * r
        })
        .collect()
}

/// Lobed outline with seeded Gaussian jitter.
pub fn jittered_outline(shape: &SyntheticOutline) -> Result<Vec<Point2<f64>>, AppError> {
    let mut points = lobed_outline(shape);
    if shape.noise <= 0.0 {
        return Ok(points);
    }

    let normal = Normal::new(0.0, shape.noise * shape.radius)
        .map_err(|e| AppError::new(2, format!("Invalid jitter level {}: {e}", shape.noise)))?;
    let mut rng = StdRng::seed_from_u64(shape.seed);
    for p in points.iter_mut() {
        *p += Vector2::new(normal.sample(&mut rng), normal.sample(&mut rng));
    }
    Ok(points)
}
