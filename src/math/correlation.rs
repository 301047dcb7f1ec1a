//! Covariance-matrix factorisation for correlated multi-asset simulation.
//!
//! References:
//! - Glasserman, P. (2004), *Monte Carlo Methods in Financial Engineering*, Sec. 2.3.

use nalgebra::DMatrix;
use tracing::debug;

use crate::core::PricingError;

const PSD_RELATIVE_TOL: f64 = 1.0e-12;

/// Lower-triangular `L` with `L * L^T = covariance`.
///
/// Positive-definite inputs go through nalgebra's Cholesky routine. Singular
/// but positive-semidefinite inputs (for example an asset with zero variance,
/// or two perfectly correlated assets) fall back to [`cholesky_lower_psd`].
pub fn cholesky_factor(covariance: &DMatrix<f64>) -> Result<DMatrix<f64>, PricingError> {
    let n = covariance.nrows();
    if covariance.ncols() != n {
        return Err(PricingError::dimension(
            "covariance matrix columns",
            n,
            covariance.ncols(),
        ));
    }
    if n == 0 {
        return Ok(DMatrix::zeros(0, 0));
    }

    if let Some(chol) = covariance.clone().cholesky() {
        return Ok(chol.l());
    }

    let scale = covariance.diagonal().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    debug!(dimension = n, "covariance not positive definite; using semidefinite factorisation");
    cholesky_lower_psd(covariance, PSD_RELATIVE_TOL * scale.max(1.0)).ok_or_else(|| {
        PricingError::NumericalError(
            "covariance matrix is not positive semidefinite".to_string(),
        )
    })
}

/// Cholesky decomposition for symmetric positive semidefinite matrices.
///
/// Pivots at or below `tol` are treated as exact zeros and their column is
/// left empty. Returns `None` when a pivot is more negative than `-tol`.
pub fn cholesky_lower_psd(matrix: &DMatrix<f64>, tol: f64) -> Option<DMatrix<f64>> {
    let n = matrix.nrows();
    if n == 0 || matrix.ncols() != n {
        return None;
    }

    let mut l = DMatrix::<f64>::zeros(n, n);

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }

            if i == j {
                if sum < -tol {
                    return None;
                }
                l[(i, i)] = if sum > tol { sum.sqrt() } else { 0.0 };
            } else if l[(j, j)] > 0.0 {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }

    Some(l)
}

/// Pearson correlation `cov / sqrt(var1 * var2)`, or zero when either variance vanishes.
#[inline]
pub fn correlation_from_covariance(covariance: f64, variance_1: f64, variance_2: f64) -> f64 {
    let denominator = (variance_1 * variance_2).sqrt();
    if denominator > 0.0 {
        (covariance / denominator).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reconstruct(l: &DMatrix<f64>) -> DMatrix<f64> {
        l * l.transpose()
    }

    #[test]
    fn positive_definite_factor_reconstructs_input() {
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[0.04, 0.006, 0.01, 0.006, 0.09, 0.0075, 0.01, 0.0075, 0.0225],
        );
        let l = cholesky_factor(&cov).unwrap();
        let back = reconstruct(&l);
        for (a, b) in back.iter().zip(cov.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-14);
        }
        assert_eq!(l[(0, 1)], 0.0);
        assert_eq!(l[(0, 2)], 0.0);
        assert_eq!(l[(1, 2)], 0.0);
    }

    #[test]
    fn zero_variance_asset_falls_back_to_semidefinite_factor() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.04, 0.0, 0.0, 0.0]);
        let l = cholesky_factor(&cov).unwrap();
        assert_relative_eq!(l[(0, 0)], 0.2, epsilon = 1e-14);
        assert_eq!(l[(1, 0)], 0.0);
        assert_eq!(l[(1, 1)], 0.0);
    }

    #[test]
    fn perfectly_correlated_pair_factorises() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.04, 0.04, 0.04, 0.04]);
        let l = cholesky_factor(&cov).unwrap();
        let back = reconstruct(&l);
        for (a, b) in back.iter().zip(cov.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn indefinite_matrix_is_rejected() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.04, 0.5, 0.5, 0.04]);
        assert!(matches!(
            cholesky_factor(&cov),
            Err(PricingError::NumericalError(_))
        ));
    }

    #[test]
    fn correlation_guards_degenerate_variances() {
        assert_relative_eq!(correlation_from_covariance(0.01, 0.04, 0.0625), 0.2, epsilon = 1e-12);
        assert_eq!(correlation_from_covariance(0.01, 0.0, 0.0625), 0.0);
    }
}
