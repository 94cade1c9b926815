//! Cubic spline resampling of digitized outlines.
//!
//! The outline is parametrized by cumulative chord length normalized to
//! `[0, 1]`, each coordinate is fitted with a cubic spline over that parameter,
//! and the spline is sampled at `count` evenly spaced parameter values.
//!
//! - open curves use natural end conditions (zero curvature at the ends)
//! - closed curves wrap the last point back to the first with periodic
//!   continuity, so the first and last samples coincide
//! - `smoothing > 0` first pulls the control points towards a smooth path with a
//!   second-difference penalty (Whittaker smoother, `λ = smoothing * n`), then
//!   interpolates the smoothed points
//!
//! Degenerate input is never rejected: a single distinct point resamples to
//! `count` copies of itself, two distinct points to a straight segment.

use nalgebra::{DMatrix, Point2};

/// Resampling options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineOptions {
    /// Number of output samples.
    pub count: usize,
    /// Smoothing factor; `0.0` interpolates the input exactly.
    pub smoothing: f64,
    /// Join the last point back to the first.
    pub closed: bool,
}

impl Default for SplineOptions {
    fn default() -> Self {
        Self {
            count: 200,
            smoothing: 0.0,
            closed: false,
        }
    }
}

/// Resample `points` into `opts.count` points along a cubic spline.
pub fn resample(points: &[Point2<f64>], opts: &SplineOptions) -> Vec<Point2<f64>> {
    if opts.count == 0 || points.is_empty() {
        return Vec::new();
    }

    let mut knots = dedup_consecutive(points);
    if opts.closed && knots.len() > 1 && knots.first() == knots.last() {
        knots.pop();
    }
    if knots.len() == 1 {
        return vec![knots[0]; opts.count];
    }

    if opts.smoothing > 0.0 && knots.len() >= 3 {
        let lambda = opts.smoothing * knots.len() as f64;
        knots = whittaker_smooth(&knots, lambda, opts.closed);
        // Smoothing can collapse neighbours onto each other.
        knots = dedup_consecutive(&knots);
        if knots.len() == 1 {
            return vec![knots[0]; opts.count];
        }
    }

    let closed = opts.closed && knots.len() >= 2;
    if closed {
        knots.push(knots[0]);
    }

    let params = chord_parameters(&knots);
    let second = if closed {
        periodic_second_derivatives(&knots, &params)
    } else {
        natural_second_derivatives(&knots, &params)
    };

    (0..opts.count)
        .map(|j| {
            let u = if opts.count == 1 {
                0.0
            } else {
                j as f64 / (opts.count - 1) as f64
            };
            evaluate(&knots, &params, &second, u)
        })
        .collect()
}

fn dedup_consecutive(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|&last| last != p) {
            out.push(p);
        }
    }
    out
}

/// Cumulative chord length normalized to `[0, 1]`.
fn chord_parameters(knots: &[Point2<f64>]) -> Vec<f64> {
    let mut params = Vec::with_capacity(knots.len());
    let mut acc = 0.0;
    params.push(0.0);
    for w in knots.windows(2) {
        acc += (w[1] - w[0]).norm();
        params.push(acc);
    }
    if acc > 0.0 {
        for t in params.iter_mut() {
            *t /= acc;
        }
    }
    params
}

/// Second derivatives (x and y columns) for a natural cubic spline.
fn natural_second_derivatives(knots: &[Point2<f64>], params: &[f64]) -> DMatrix<f64> {
    let n = knots.len();
    let mut second = DMatrix::<f64>::zeros(n, 2);
    if n < 3 {
        return second;
    }

    let m = n - 2;
    let mut a = DMatrix::<f64>::zeros(m, m);
    let mut rhs = DMatrix::<f64>::zeros(m, 2);
    for row in 0..m {
        let i = row + 1;
        let h_prev = params[i] - params[i - 1];
        let h_next = params[i + 1] - params[i];
        if row > 0 {
            a[(row, row - 1)] = h_prev;
        }
        a[(row, row)] = 2.0 * (h_prev + h_next);
        if row + 1 < m {
            a[(row, row + 1)] = h_next;
        }
        for c in 0..2 {
            let slope_next = (knots[i + 1][c] - knots[i][c]) / h_next;
            let slope_prev = (knots[i][c] - knots[i - 1][c]) / h_prev;
            rhs[(row, c)] = 6.0 * (slope_next - slope_prev);
        }
    }

    // The system is strictly diagonally dominant; a failed solve only happens on
    // non-finite input, in which case the curve degrades to linear segments.
    if let Some(interior) = a.lu().solve(&rhs) {
        second.rows_mut(1, m).copy_from(&interior);
    }
    second
}

/// Second derivatives for a periodic cubic spline.
///
/// `knots` already repeats the first point at the end.
fn periodic_second_derivatives(knots: &[Point2<f64>], params: &[f64]) -> DMatrix<f64> {
    let n = knots.len();
    let mut second = DMatrix::<f64>::zeros(n, 2);
    let m = n - 1;
    if m < 2 {
        return second;
    }

    let h: Vec<f64> = params.windows(2).map(|w| w[1] - w[0]).collect();
    let mut a = DMatrix::<f64>::zeros(m, m);
    let mut rhs = DMatrix::<f64>::zeros(m, 2);
    for i in 0..m {
        let prev = (i + m - 1) % m;
        let next = (i + 1) % m;
        let h_prev = h[prev];
        let h_next = h[i];
        a[(i, prev)] += h_prev;
        a[(i, i)] += 2.0 * (h_prev + h_next);
        a[(i, next)] += h_next;
        for c in 0..2 {
            let slope_next = (knots[i + 1][c] - knots[i][c]) / h_next;
            let slope_prev = (knots[i][c] - knots[prev][c]) / h_prev;
            rhs[(i, c)] = 6.0 * (slope_next - slope_prev);
        }
    }

    if let Some(solved) = a.lu().solve(&rhs) {
        second.rows_mut(0, m).copy_from(&solved);
        let first = second.row(0).into_owned();
        second.row_mut(m).copy_from(&first);
    }
    second
}

fn evaluate(knots: &[Point2<f64>], params: &[f64], second: &DMatrix<f64>, u: f64) -> Point2<f64> {
    let last = knots.len() - 1;
    // Segment k satisfies params[k] <= u <= params[k + 1].
    let k = params
        .partition_point(|&t| t <= u)
        .saturating_sub(1)
        .min(last - 1);

    let h = params[k + 1] - params[k];
    if h <= 0.0 {
        return knots[k];
    }
    let a = params[k + 1] - u;
    let b = u - params[k];

    let mut out = [0.0; 2];
    for (c, value) in out.iter_mut().enumerate() {
        let m0 = second[(k, c)];
        let m1 = second[(k + 1, c)];
        let y0 = knots[k][c];
        let y1 = knots[k + 1][c];
        *value = m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b;
    }
    Point2::new(out[0], out[1])
}

/// Penalized least squares smoothing: solve `(I + λ DᵀD) z = p` per coordinate,
/// with `D` the second-difference operator (cyclic for closed curves).
fn whittaker_smooth(points: &[Point2<f64>], lambda: f64, closed: bool) -> Vec<Point2<f64>> {
    let n = points.len();
    let rows = if closed { n } else { n - 2 };
    let mut d = DMatrix::<f64>::zeros(rows, n);
    for r in 0..rows {
        let (i0, i1, i2) = if closed {
            ((r + n - 1) % n, r, (r + 1) % n)
        } else {
            (r, r + 1, r + 2)
        };
        d[(r, i0)] += 1.0;
        d[(r, i1)] -= 2.0;
        d[(r, i2)] += 1.0;
    }

    let system = DMatrix::<f64>::identity(n, n) + d.transpose() * &d * lambda;
    let rhs = DMatrix::from_fn(n, 2, |i, c| points[i][c]);

    match system.cholesky() {
        Some(chol) => {
            let z = chol.solve(&rhs);
            (0..n).map(|i| Point2::new(z[(i, 0)], z[(i, 1)])).collect()
        }
        None => points.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(n: usize, radius: f64) -> Vec<Point2<f64>> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::PI * i as f64 / (n - 1) as f64;
                Point2::new(radius * t.cos(), radius * t.sin())
            })
            .collect()
    }

    #[test]
    fn returns_configured_count() {
        let pts = arc(12, 3.0);
        for count in [5, 100, 200, 333] {
            let opts = SplineOptions {
                count,
                ..SplineOptions::default()
            };
            assert_eq!(resample(&pts, &opts).len(), count);
        }
    }

    #[test]
    fn interpolates_end_points_of_open_curves() {
        let pts = arc(9, 2.0);
        let out = resample(&pts, &SplineOptions::default());
        assert!((out[0] - pts[0]).norm() < 1e-12);
        assert!((out[199] - pts[8]).norm() < 1e-12);
    }

    #[test]
    fn samples_stay_close_to_a_smooth_arc() {
        let pts = arc(30, 10.0);
        let out = resample(&pts, &SplineOptions::default());
        for p in &out {
            let r = p.coords.norm();
            assert!((r - 10.0).abs() < 5e-2, "radius drifted to {r}");
        }
    }

    #[test]
    fn collinear_points_stay_on_the_line() {
        let pts: Vec<_> = (0..6).map(|i| Point2::new(i as f64, 2.0 * i as f64)).collect();
        let out = resample(&pts, &SplineOptions::default());
        for p in &out {
            assert!((p.y - 2.0 * p.x).abs() < 1e-9);
        }
    }

    #[test]
    fn scaling_the_input_scales_the_output() {
        let pts = arc(15, 1.0);
        let scaled: Vec<_> = pts.iter().map(|p| Point2::from(p.coords * 2.0)).collect();
        let a = resample(&pts, &SplineOptions::default());
        let b = resample(&scaled, &SplineOptions::default());
        for (p, q) in a.iter().zip(&b) {
            assert!((p.coords * 2.0 - q.coords).norm() < 1e-9);
        }
    }

    #[test]
    fn closed_curves_return_to_the_start() {
        let pts: Vec<_> = (0..8)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / 8.0;
                Point2::new(t.cos(), t.sin())
            })
            .collect();
        let opts = SplineOptions {
            closed: true,
            ..SplineOptions::default()
        };
        let out = resample(&pts, &opts);
        assert_eq!(out.len(), 200);
        assert!((out[0] - out[199]).norm() < 1e-12);
    }

    #[test]
    fn smoothing_reduces_zigzag() {
        let pts: Vec<_> = (0..20)
            .map(|i| Point2::new(i as f64, if i % 2 == 0 { 0.5 } else { -0.5 }))
            .collect();
        let rough = resample(&pts, &SplineOptions::default());
        let smooth = resample(
            &pts,
            &SplineOptions {
                smoothing: 1.0,
                ..SplineOptions::default()
            },
        );
        let spread = |c: &[Point2<f64>]| c.iter().map(|p| p.y.abs()).fold(0.0, f64::max);
        assert!(spread(&smooth[..]) < spread(&rough[..]));
    }

    #[test]
    fn identical_points_give_a_degenerate_curve() {
        let pts = vec![Point2::new(1.0, 1.0); 5];
        let out = resample(&pts, &SplineOptions::default());
        assert_eq!(out.len(), 200);
        assert!(out.iter().all(|p| *p == Point2::new(1.0, 1.0)));
    }

    #[test]
    fn duplicate_neighbours_are_merged() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
        ];
        let out = resample(&pts, &SplineOptions::default());
        assert!(out.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
