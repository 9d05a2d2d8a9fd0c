//! Random forest regression on lagged prices

use crate::error::{ForecastError, Result};
use crate::features::{build_lag_features, DEFAULT_LAGS};
use crate::models::forest::{ForestConfig, RandomForest};
use crate::models::{ModelKind, ModelTrainer, TrainedModel};
use serde::{Deserialize, Serialize};
use trade_math::stats::rmse;

/// Lag regression configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagRegressionConfig {
    /// Number of lagged prices per example
    pub lags: usize,
    /// Trailing share of the lag table held out for scoring
    pub test_ratio: f64,
    pub forest: ForestConfig,
}

impl Default for LagRegressionConfig {
    fn default() -> Self {
        Self {
            lags: DEFAULT_LAGS,
            test_ratio: 0.2,
            forest: ForestConfig::default(),
        }
    }
}

impl LagRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lags == 0 {
            return Err(ForecastError::InvalidParameter(
                "lag_regression.lags must be positive".to_string(),
            ));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "lag_regression.test_ratio must be between 0 and 1".to_string(),
            ));
        }
        self.forest.validate()
    }
}

/// Trains a [`LagRegressionModel`]
#[derive(Debug, Clone, Default)]
pub struct LagRegressionTrainer {
    config: LagRegressionConfig,
}

impl LagRegressionTrainer {
    pub fn new(config: LagRegressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LagRegressionConfig {
        &self.config
    }

    pub fn fit(&self, prices: &[f64]) -> Result<LagRegressionModel> {
        self.config.validate()?;

        let table = build_lag_features(prices, self.config.lags)?;
        let (train, test) = table.split_chronological(self.config.test_ratio)?;

        let mut forest = RandomForest::new(self.config.forest.clone());
        forest.fit(&train.features(), &train.labels())?;

        let predicted = forest.predict(&test.features())?;
        let rmse = rmse(&test.labels(), &predicted)?;

        tracing::debug!(
            train_rows = train.len(),
            test_rows = test.len(),
            trees = forest.n_trees(),
            depth = forest.max_tree_depth(),
            rmse,
            "Fitted lag regression forest"
        );

        Ok(LagRegressionModel {
            lags: self.config.lags,
            forest,
            rmse,
        })
    }
}

impl ModelTrainer for LagRegressionTrainer {
    fn kind(&self) -> ModelKind {
        ModelKind::RegressionOnLags
    }

    fn train(&self, prices: &[f64]) -> Result<TrainedModel> {
        self.fit(prices).map(TrainedModel::RegressionOnLags)
    }
}

/// Random forest fitted on lag features
#[derive(Debug, Clone)]
pub struct LagRegressionModel {
    lags: usize,
    forest: RandomForest,
    rmse: f64,
}

impl LagRegressionModel {
    /// Number of lagged prices the model reads
    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Predict the next price from the last `lags` prices, most recent first
    pub fn predict_next(&self, recent_first: &[f64]) -> Result<f64> {
        if recent_first.len() != self.lags {
            return Err(ForecastError::InvalidParameter(format!(
                "Model reads {} lags, got {}",
                self.lags,
                recent_first.len()
            )));
        }
        self.forest.predict_one(recent_first)
    }
}
