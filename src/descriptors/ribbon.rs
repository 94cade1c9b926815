//! Ruled surface ("ribbon") between the peak and valley polylines.
//!
//! Both polylines are resampled by arc length into the same number of segments,
//! corresponding samples are joined by straight rulings, and each ruling is split
//! into strips. The surface area is the sum of the (unsigned) triangle areas of
//! that grid, so crossing rulings never cancel out.

use nalgebra::Point2;
use serde::Serialize;

use crate::math::{Bounds, resample_polyline, triangle_area};

/// Default `(segments along the lines, strips across)`.
pub const DEFAULT_RIBBON_RESOLUTION: (usize, usize) = (200, 5);

/// Area and extent of a ribbon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ribbon {
    pub area: f64,
    pub bounds: Bounds,
}

/// Build the ribbon between `line1` and `line2`.
///
/// Returns `None` if either line is empty.
pub fn ribbon(line1: &[Point2<f64>], line2: &[Point2<f64>], resolution: (usize, usize)) -> Option<Ribbon> {
    if line1.is_empty() || line2.is_empty() {
        return None;
    }
    let along = resolution.0.max(1);
    let across = resolution.1.max(1);
    let a = resample_polyline(line1, along);
    let b = resample_polyline(line2, along);
    // Extent of the surface itself, not of the input vertices.
    let bounds = Bounds::of(a.iter().chain(&b))?;

    let node = |i: usize, j: usize| -> Point2<f64> {
        let t = j as f64 / across as f64;
        a[i] + (b[i] - a[i]) * t
    };

    let mut area = 0.0;
    for i in 0..along {
        for j in 0..across {
            let p00 = node(i, j);
            let p10 = node(i + 1, j);
            let p11 = node(i + 1, j + 1);
            let p01 = node(i, j + 1);
            area += triangle_area(&p00, &p10, &p11) + triangle_area(&p00, &p11, &p01);
        }
    }

    Some(Ribbon { area, bounds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectangle_between_parallel_lines() {
        let top = [Point2::new(0.0, 2.0), Point2::new(10.0, 2.0)];
        let bottom = [Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(10.0, 0.0)];
        let r = ribbon(&top, &bottom, DEFAULT_RIBBON_RESOLUTION).unwrap();
        assert_relative_eq!(r.area, 20.0, epsilon = 1e-9);
        assert_eq!(r.bounds.width(), 10.0);
        assert_eq!(r.bounds.height(), 2.0);
    }

    #[test]
    fn trapezoid_between_lines_of_different_length() {
        let top = [Point2::new(2.0, 1.0), Point2::new(8.0, 1.0)];
        let bottom = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let r = ribbon(&top, &bottom, (50, 3)).unwrap();
        assert_relative_eq!(r.area, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn bounds_come_from_the_resampled_lines() {
        // The spike at x = 1 falls between the two resampled nodes at x = 0 and x = 2.
        let top = [Point2::new(0.0, 1.0), Point2::new(1.0, 3.0), Point2::new(2.0, 1.0)];
        let bottom = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let r = ribbon(&top, &bottom, (1, 1)).unwrap();
        assert_eq!(r.bounds.width(), 2.0);
        assert_eq!(r.bounds.height(), 1.0);
    }

    #[test]
    fn empty_line_has_no_ribbon() {
        assert!(ribbon(&[], &[Point2::new(0.0, 0.0)], DEFAULT_RIBBON_RESOLUTION).is_none());
    }
}
