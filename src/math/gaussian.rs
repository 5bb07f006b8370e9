//! Multivariate normal log-density.
//!
//! ```text
//! log p(x) = -1/2 (x - mu)^T S^-1 (x - mu) - 1/2 ln((2 pi)^k det S)
//! ```
//!
//! Both terms come from one Cholesky factorisation `S = L L^T`:
//! `ln det S = 2 Σ ln L_ii` and the quadratic form is solved against `L`,
//! so neither the determinant nor the inverse is ever formed. Covariances
//! change with every candidate, so nothing is cached.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use crate::error::EstimationError;

/// Below this value of `(min L_ii / max L_ii)^2` the covariance is treated as
/// singular.
///
/// The ratio does not change when `S` is rescaled, and it stays away from 0
/// for well-conditioned matrices of any dimension.
const PIVOT_RATIO_EPS: f64 = 1e-12;

/// Log-density of `N(mean, cov)` evaluated at `x`.
pub fn log_density(
    x: &DVector<f64>,
    mean: &DVector<f64>,
    cov: &DMatrix<f64>,
) -> Result<f64, EstimationError> {
    let k = x.len();
    if k == 0 {
        return Err(EstimationError::DimensionMismatch(
            "empty observation vector".to_string(),
        ));
    }
    if mean.len() != k || cov.nrows() != k || cov.ncols() != k {
        return Err(EstimationError::DimensionMismatch(format!(
            "x has {k} entries, mean has {}, covariance is {}x{}",
            mean.len(),
            cov.nrows(),
            cov.ncols()
        )));
    }
    if cov.iter().any(|v| !v.is_finite()) {
        return Err(EstimationError::SingularCovariance);
    }

    let chol = cov
        .clone()
        .cholesky()
        .ok_or(EstimationError::SingularCovariance)?;

    let pivots = chol.l_dirty().diagonal();
    let (min_pivot, max_pivot) = pivots
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    if min_pivot <= 0.0 || (min_pivot / max_pivot).powi(2) < PIVOT_RATIO_EPS {
        return Err(EstimationError::SingularCovariance);
    }
    let log_det = 2.0 * pivots.iter().map(|p| p.ln()).sum::<f64>();

    let diff = x - mean;
    let quad = diff.dot(&chol.solve(&diff));
    if !(quad.is_finite() && log_det.is_finite()) {
        return Err(EstimationError::SingularCovariance);
    }

    let log_norm = k as f64 * (2.0 * PI).ln() + log_det;
    Ok(-0.5 * quad - 0.5 * log_norm)
}
