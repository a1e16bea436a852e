//! Ordinary least squares with an intercept.
//!
//! The intercept is handled by centring every column and the targets on
//! their means, which leaves a system without a constant term. Each centred
//! column is then divided by its largest magnitude, so the solve neither
//! overflows on large finite values nor depends on the feature units, and
//! the system is solved through an SVD.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::error::{ModelError, Result};

/// Singular values below this fraction of the largest one count as zero.
const RANK_RTOL: f64 = 1e-10;

/// Coefficients and intercept minimizing the sum of squared residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

/// Fits `y ≈ x·β + b`.
///
/// # Args
/// * `x` - Feature matrix, one row per observation. Must have at least one row and one column.
/// * `y` - Targets, one per row of `x`.
///
/// # Returns
/// The least-squares coefficients, one per column, and the intercept.
///
/// # Errors
/// * `ModelError::InvalidInput` / `ModelError::ShapeMismatch` for empty or misaligned input.
/// * `ModelError::Singular` when the centred matrix is rank deficient.
pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LeastSquares> {
    let (n, p) = x.dim();
    if n == 0 {
        return Err(ModelError::InvalidInput("feature matrix has no rows"));
    }
    if p == 0 {
        return Err(ModelError::InvalidInput("feature matrix has no columns"));
    }
    if y.len() != n {
        return Err(ModelError::ShapeMismatch {
            what: "targets",
            got: y.len(),
            expected: n,
        });
    }

    // `mean_axis` only returns None on an empty axis, ruled out above.
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or(ModelError::InvalidInput("feature matrix has no rows"))?;
    let y_mean = y.sum() / n as f64;

    let centred = &x - &x_mean;
    let x_scales = centred.map_axis(Axis(0), |col| unit_scale(col.iter().copied()));
    let y_scale = unit_scale(y.iter().map(|v| v - y_mean));

    let a = DMatrix::from_fn(n, p, |i, j| centred[[i, j]] / x_scales[j]);
    let b = DVector::from_fn(n, |i, _| (y[i] - y_mean) / y_scale);

    let beta = solve_svd(a, &b)?;
    let coefficients = Array1::from_shape_fn(p, |j| beta[j] * y_scale / x_scales[j]);
    let intercept = y_mean - x_mean.dot(&coefficients);

    Ok(LeastSquares {
        coefficients,
        intercept,
    })
}

/// Largest magnitude among `values`, or 1 when they are all zero.
fn unit_scale(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, |m, v| m.max(v.abs()));
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

/// Solves `min ‖a·β − b‖`, requiring `a` to have full column rank.
fn solve_svd(a: DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    let features = a.ncols();
    let svd = a.svd(true, true);

    let eps = RANK_RTOL * svd.singular_values.max();
    let rank = svd.rank(eps);
    if rank < features {
        return Err(ModelError::Singular { rank, features });
    }

    // Only fails when U or V were not computed.
    svd.solve(b, eps).map_err(|_| ModelError::Singular { rank, features })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const TOL: f64 = 1e-9;

    #[test]
    fn fits_a_line() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let fit = fit(x.view(), y.view()).unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < TOL);
        assert!((fit.intercept - 1.0).abs() < TOL);
    }

    #[test]
    fn recovers_plane_coefficients() {
        // y = 0.5 + 2·x0 − 3·x1
        let x = array![
            [1.0, 0.0],
            [0.0, 1.0],
            [2.0, 1.0],
            [3.0, 5.0],
            [-1.0, 2.0],
        ];
        let y = x.map_axis(Axis(1), |r| 0.5 + 2.0 * r[0] - 3.0 * r[1]);

        let fit = fit(x.view(), y.view()).unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < TOL);
        assert!((fit.coefficients[1] + 3.0).abs() < TOL);
        assert!((fit.intercept - 0.5).abs() < TOL);
    }

    #[test]
    fn overdetermined_fit_matches_closed_form() {
        // simple regression: β = cov(x, y) / var(x)
        let x = array![[1.0], [2.0], [4.0], [5.0]];
        let y = array![1.0, 3.0, 2.0, 6.0];

        let fit = fit(x.view(), y.view()).unwrap();
        // mean x = 3, mean y = 3, Sxy = 9, Sxx = 10
        assert!((fit.coefficients[0] - 0.9).abs() < TOL);
        assert!((fit.intercept - 0.3).abs() < TOL);
    }

    #[test]
    fn collinear_columns_are_singular() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let err = fit(x.view(), y.view()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Singular {
                rank: 1,
                features: 2
            }
        ));
    }

    #[test]
    fn constant_column_is_singular() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let y = array![1.0, 2.0, 3.0];

        let err = fit(x.view(), y.view()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Singular {
                rank: 1,
                features: 2
            }
        ));
    }

    #[test]
    fn large_magnitudes_stay_full_rank() {
        let x = array![[1e160], [2e160], [3e160]];
        let y = array![1.0, 2.0, 3.0];

        let fit = fit(x.view(), y.view()).unwrap();
        assert!((fit.coefficients[0] * 1e160 - 1.0).abs() < TOL);
        assert!(fit.intercept.abs() < TOL);

        let x = array![[1e200, 1.0], [3e200, 0.0], [2e200, 4.0], [5e200, 2.0]];
        let y = x.map_axis(Axis(1), |r| 7.0 + 2e-200 * r[0] - 3.0 * r[1]);
        let fit = super::fit(x.view(), y.view()).unwrap();
        assert!((fit.coefficients[0] * 1e200 - 2.0).abs() < TOL);
        assert!((fit.coefficients[1] + 3.0).abs() < TOL);
        assert!((fit.intercept - 7.0).abs() < TOL);
    }

    #[test]
    fn too_few_rows_is_singular() {
        let x = array![[1.0, 2.0], [3.0, 1.0]];
        let y = array![1.0, 2.0];

        assert!(matches!(
            fit(x.view(), y.view()),
            Err(ModelError::Singular { .. })
        ));
    }

    #[test]
    fn mismatched_targets() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];

        assert!(matches!(
            fit(x.view(), y.view()),
            Err(ModelError::ShapeMismatch {
                got: 1,
                expected: 2,
                ..
            })
        ));
    }
}
