//! Lagged-price feature tables for supervised models

use crate::error::{ForecastError, Result};
use crate::utils::holdout_split_index;

/// Default number of lagged prices used as predictors
pub const DEFAULT_LAGS: usize = 5;

/// One supervised example: the previous `k` prices and the price that followed
#[derive(Debug, Clone, PartialEq)]
pub struct LagRecord {
    /// `lags[0]` is the price one step back, `lags[k-1]` is `k` steps back
    pub lags: Vec<f64>,
    pub label: f64,
}

/// Ordered table of lag records derived from a price series
#[derive(Debug, Clone, PartialEq)]
pub struct LagFeatureTable {
    lags: usize,
    records: Vec<LagRecord>,
}

impl LagFeatureTable {
    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LagRecord] {
        &self.records
    }

    pub fn features(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(|r| r.lags.clone()).collect()
    }

    pub fn labels(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.label).collect()
    }

    /// Split into leading fit rows and trailing evaluation rows, keeping order
    pub fn split_chronological(&self, test_ratio: f64) -> Result<(Self, Self)> {
        let train_len = holdout_split_index(self.records.len(), test_ratio)?;
        let (train, test) = self.records.split_at(train_len);

        Ok((
            Self {
                lags: self.lags,
                records: train.to_vec(),
            },
            Self {
                lags: self.lags,
                records: test.to_vec(),
            },
        ))
    }
}

/// Build the lag table for `prices`.
///
/// For every index `i >= lags` the record holds prices `i-1 .. i-lags` (most
/// recent first) and the label `prices[i]`. Leading rows without a full set of
/// lags are dropped.
pub fn build_lag_features(prices: &[f64], lags: usize) -> Result<LagFeatureTable> {
    if lags == 0 {
        return Err(ForecastError::InvalidParameter(
            "Lag count must be positive".to_string(),
        ));
    }

    let records: Vec<LagRecord> = (lags..prices.len())
        .map(|i| LagRecord {
            lags: (1..=lags).map(|lag| prices[i - lag]).collect(),
            label: prices[i],
        })
        .collect();

    if records.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "{} lags need at least {} prices, got {}",
            lags,
            lags + 1,
            prices.len()
        )));
    }

    Ok(LagFeatureTable { lags, records })
}
