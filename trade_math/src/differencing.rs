//! Differencing and its inverse for integrated (ARIMA-style) models
//!
//! The d-th difference is `Δ^d y_t = Σ_{k=0..d} (-1)^k C(d,k) y_{t-k}`, so a level
//! can be recovered from a differenced value and the `d` levels preceding it.

use crate::{MathError, Result};

/// Difference a series `d` times. Each pass shortens the series by one.
pub fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Signed binomial weights `(-1)^k C(d,k)` for `k = 0..=d`
pub fn difference_weights(d: usize) -> Vec<f64> {
    let mut weights = Vec::with_capacity(d + 1);
    let mut binom = 1.0;
    for k in 0..=d {
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        weights.push(sign * binom);
        binom = binom * (d - k) as f64 / (k + 1) as f64;
    }
    weights
}

/// Recover the next level from its `d`-th difference and the preceding levels
pub fn undifference(diffed: f64, history: &[f64], d: usize) -> Result<f64> {
    if history.len() < d {
        return Err(MathError::InsufficientData(format!(
            "Need {} preceding levels to undo differencing of order {}, got {}",
            d,
            d,
            history.len()
        )));
    }

    let weights = difference_weights(d);
    let n = history.len();
    let carried: f64 = (1..=d).map(|k| weights[k] * history[n - k]).sum();

    Ok(diffed - carried)
}

/// Turn a path of differenced forecasts back into levels, continuing `history`
pub fn integrate(diffs: &[f64], history: &[f64], d: usize) -> Result<Vec<f64>> {
    if d == 0 {
        return Ok(diffs.to_vec());
    }

    let mut levels = history[history.len().saturating_sub(d)..].to_vec();
    let mut result = Vec::with_capacity(diffs.len());
    for &diffed in diffs {
        let level = undifference(diffed, &levels, d)?;
        levels.push(level);
        result.push(level);
    }

    Ok(result)
}
