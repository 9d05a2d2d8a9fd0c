//! Summary statistics and forecast error metrics

use crate::{MathError, Result};

/// Arithmetic mean of a non-empty slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean squared error between actual and predicted values
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.len() != predicted.len() {
        return Err(MathError::InvalidInput(format!(
            "Actual length ({}) doesn't match predicted length ({})",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(MathError::InsufficientData(
            "No values to compare".to_string(),
        ));
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Root mean squared error between actual and predicted values
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    mean_squared_error(actual, predicted).map(f64::sqrt)
}

/// Position and value of the smallest element, first occurrence on ties.
///
/// NaN entries are skipped. Returns `None` when no comparable value exists.
pub fn first_argmin(values: &[f64]) -> Option<(usize, f64)> {
    extremum(values, |candidate, best| candidate < best)
}

/// Position and value of the largest element, first occurrence on ties.
pub fn first_argmax(values: &[f64]) -> Option<(usize, f64)> {
    extremum(values, |candidate, best| candidate > best)
}

fn extremum(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if !better(value, current) => {}
            _ => best = Some((idx, value)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[90.0, 120.0, 95.0]).unwrap(), 101.666_666_666, epsilon = 1e-6);
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn test_rmse() {
        let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

        // squared errors: 4, 4, 9, 9, 4 -> mse 6
        assert_relative_eq!(mean_squared_error(&actual, &predicted).unwrap(), 6.0);
        assert_relative_eq!(rmse(&actual, &predicted).unwrap(), 6.0_f64.sqrt());

        assert!(rmse(&actual, &predicted[..2]).is_err());
        assert!(rmse(&[], &[]).is_err());
    }

    #[test]
    fn test_extrema_first_occurrence() {
        let values = [5.0, 1.0, 7.0, 1.0, 7.0];
        assert_eq!(first_argmin(&values), Some((1, 1.0)));
        assert_eq!(first_argmax(&values), Some((2, 7.0)));
    }

    #[test]
    fn test_extrema_skip_nan() {
        let values = [f64::NAN, 3.0, 2.0];
        assert_eq!(first_argmin(&values), Some((2, 2.0)));
        assert_eq!(first_argmax(&values), Some((1, 3.0)));
        assert_eq!(first_argmax(&[]), None);
    }
}
