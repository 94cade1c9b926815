//! Ordinary least squares solver.
//!
//! Both the circle fit and the valley parabola reduce to small linear regression
//! problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We solve with SVD so tall design matrices (more rows than columns) work,
//!   and rank-deficient ones return the minimum-norm solution instead of
//!   panicking. (Nalgebra's `QR::solve` is intended for square systems.)
//! - The column count is tiny (3), so SVD cost is irrelevant here.

use nalgebra::{DMatrix, DVector};

/// Ratio below which the smallest singular value is treated as zero.
const RANK_RCOND: f64 = 1e-12;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no finite solution can be produced.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);

    // Scale the cut-off by the largest singular value so that the design matrix
    // units (sample indices up to a few hundred, squared) do not matter.
    let sigma_max = svd.singular_values.max();
    let tol = (sigma_max * RANK_RCOND).max(f64::MIN_POSITIVE);

    let beta = svd.solve(y, tol).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Numerical rank of `x` using the same relative cut-off as [`solve_least_squares`].
pub fn numerical_rank(x: &DMatrix<f64>) -> usize {
    if x.nrows() == 0 || x.ncols() == 0 {
        return 0;
    }
    let singular = x.clone().svd(false, false).singular_values;
    let sigma_max = singular.max();
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return 0;
    }
    singular
        .iter()
        .filter(|&&s| s > sigma_max * RANK_RCOND)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }

    #[test]
    fn rank_of_duplicated_columns() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        assert_eq!(numerical_rank(&x), 1);
    }
}
