//! Ordinary least squares on dense design matrices

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Solve `min ||X b - y||²` through the normal equations.
///
/// `design` holds one row per observation. Fails when there are fewer rows
/// than coefficients or when `X'X` is not positive definite.
pub fn least_squares(design: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    if design.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but {} targets were given",
            design.len(),
            targets.len()
        )));
    }

    let n_cols = design.first().map(|row| row.len()).unwrap_or(0);
    if n_cols == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if design.iter().any(|row| row.len() != n_cols) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different lengths".to_string(),
        ));
    }
    if design.len() < n_cols {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} observations to fit {} coefficients, got {}",
            n_cols,
            n_cols,
            design.len()
        )));
    }

    let flat: Vec<f64> = design.iter().flatten().copied().collect();
    let x = DMatrix::from_row_slice(design.len(), n_cols, &flat);
    let y = DVector::from_column_slice(targets);

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;

    let cholesky = xtx.cholesky().ok_or_else(|| {
        MathError::CalculationError("Design matrix is singular or ill-conditioned".to_string())
    })?;

    // cond(X'X) is roughly (max/min)^2 of the factor's diagonal
    let diag = cholesky.l().diagonal();
    let max_diag = diag.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    let min_diag = diag.iter().fold(f64::INFINITY, |acc, d| acc.min(d.abs()));
    if min_diag * min_diag <= max_diag * max_diag * 1e-12 {
        return Err(MathError::CalculationError(
            "Design matrix is singular or ill-conditioned".to_string(),
        ));
    }

    let beta = cholesky.solve(&xty);

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares produced non-finite coefficients".to_string(),
        ));
    }

    Ok(beta.iter().copied().collect())
}
