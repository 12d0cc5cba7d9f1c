//! Least squares line fitting.
//!
//! Both signal models are first-degree polynomials:
//!
//! ```text
//! minimize Σ (y_i - (β0 + β1 x_i))^2
//! ```
//!
//! where `x` is either raw distance or `log10(distance)`. We build the `[1, x]`
//! design matrix and solve it with SVD, which stays well-behaved when the `x`
//! values are nearly constant.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::math::stats::pearson;

/// Coefficients and goodness of fit for `y = slope · x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Squared Pearson correlation between observed and fitted `y`.
    pub r_squared: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = slope · x + intercept` by ordinary least squares.
///
/// Returns `None` when fewer than two pairs are given, the slices differ in
/// length, any value is non-finite, or all `x` are identical (slope undefined).
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let x0 = x[0];
    if x.iter().all(|&v| (v - x0).abs() <= f64::EPSILON * x0.abs().max(1.0)) {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let rhs = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &rhs)?;
    let intercept = beta[0];
    let slope = beta[1];

    let fitted: Vec<f64> = x.iter().map(|&xi| slope * xi + intercept).collect();
    let r_squared = fit_r_squared(y, &fitted);

    Some(LineFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Coefficient of determination as the squared correlation of observed vs fitted.
///
/// When either side has no variance the correlation is undefined; a fit that
/// reproduces every observation is then scored 1 and anything else 0.
fn fit_r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    if let Some(r) = pearson(observed, fitted) {
        return r * r;
    }
    let scale = observed.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    let exact = observed
        .iter()
        .zip(fitted)
        .all(|(o, f)| (o - f).abs() <= 1e-9 * scale);
    if exact { 1.0 } else { 0.0 }
}
