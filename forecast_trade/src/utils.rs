//! Utility functions for the forecast_trade crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// Number of leading items kept for fitting when the last `test_ratio` share
/// is held out. The held-out size is `ceil(len * test_ratio)`.
pub fn holdout_split_index(len: usize, test_ratio: f64) -> Result<usize> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Test ratio must be between 0 and 1 (exclusive), got {}",
            test_ratio
        )));
    }

    let test_size = (len as f64 * test_ratio).ceil() as usize;
    let train_size = len.saturating_sub(test_size);
    if train_size == 0 || test_size == 0 {
        return Err(ForecastError::InsufficientData(format!(
            "{} samples cannot be split into non-empty fit and evaluation parts",
            len
        )));
    }

    Ok(train_size)
}

/// Fewest samples [`holdout_split_index`] accepts for `test_ratio`
pub fn min_split_len(test_ratio: f64) -> Result<usize> {
    let mut len = 2;
    loop {
        match holdout_split_index(len, test_ratio) {
            Ok(_) => return Ok(len),
            Err(ForecastError::InsufficientData(_)) => len += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Parse the calendar date at the start of a timestamp-like string.
///
/// Accepts `2024-03-01` as well as exchange exports such as
/// `2024-03-01 00:00:00-05:00`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|e| ForecastError::InvalidData(format!("Unparseable date '{}': {}", raw, e)))
}

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as u64)
        .filter_map(|offset| last.checked_add_days(Days::new(offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_split_len_leaves_both_parts() {
        assert_eq!(min_split_len(0.2).unwrap(), 2);
        assert_eq!(min_split_len(0.5).unwrap(), 2);
        // ceil(2 * 0.6) = 2 leaves nothing to fit on
        assert_eq!(min_split_len(0.6).unwrap(), 3);
        assert!(holdout_split_index(min_split_len(0.75).unwrap(), 0.75).is_ok());
        assert!(matches!(
            min_split_len(1.5),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
