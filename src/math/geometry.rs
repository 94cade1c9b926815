//! Planar geometry helpers shared by the descriptor pipeline.

use nalgebra::{Point2, Vector2};
use serde::Serialize;

/// Unweighted mean of the points (origin for an empty slice).
pub fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum = points.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / points.len() as f64)
}

/// Mean distance of the points from their centroid.
pub fn average_size(points: &[Point2<f64>]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let c = centroid(points);
    points.iter().map(|p| (p - c).norm()).sum::<f64>() / points.len() as f64
}

/// Distance from every point to `center`.
pub fn radial_profile(points: &[Point2<f64>], center: &Point2<f64>) -> Vec<f64> {
    points.iter().map(|p| (p - center).norm()).collect()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Bounds {
    /// Bounds of all points, or `None` for an empty input.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: Point2::new(b.min.x.min(p.x), b.min.y.min(p.y)),
                max: Point2::new(b.max.x.max(p.x), b.max.y.max(p.y)),
            },
        ))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Resample a polyline into `segments + 1` points evenly spaced by arc length.
///
/// A zero-length polyline resamples to copies of its first point.
pub fn resample_polyline(points: &[Point2<f64>], segments: usize) -> Vec<Point2<f64>> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for w in points.windows(2) {
        total += (w[1] - w[0]).norm();
        cumulative.push(total);
    }
    if total <= 0.0 || segments == 0 {
        return vec![first; segments + 1];
    }

    (0..=segments)
        .map(|j| {
            let s = total * j as f64 / segments as f64;
            let k = cumulative
                .partition_point(|&c| c <= s)
                .saturating_sub(1)
                .min(points.len() - 2);
            let span = cumulative[k + 1] - cumulative[k];
            if span <= 0.0 {
                return points[k];
            }
            let t = ((s - cumulative[k]) / span).clamp(0.0, 1.0);
            points[k] + (points[k + 1] - points[k]) * t
        })
        .collect()
}

/// Unsigned area of the triangle `abc`.
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    0.5 * (ab.x * ac.y - ab.y * ac.x).abs()
}
