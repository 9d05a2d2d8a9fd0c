//! Forecasting models and their trainers
//!
//! Three model families compete on the same price series. Each trainer fits
//! its model and measures RMSE on an evaluation slice; the fitted models are
//! held in the closed [`TrainedModel`] enum so the forecast generator can match
//! on every family exhaustively.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod arima;
pub mod forest;
pub mod lag_regression;
pub mod lstm;
pub mod recurrent;

pub use arima::{ArimaConfig, ArimaModel, ArimaOrder, ArimaTrainer};
pub use forest::{ForestConfig, RandomForest};
pub use lag_regression::{LagRegressionConfig, LagRegressionModel, LagRegressionTrainer};
pub use recurrent::{RecurrentConfig, RecurrentModel, RecurrentTrainer};

/// Model family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Random forest regression over lagged prices
    RegressionOnLags,
    /// ARIMA on the raw price series
    Autoregressive,
    /// LSTM over sliding price windows
    RecurrentSequence,
}

impl ModelKind {
    /// Every family, in trainer evaluation order
    pub const ALL: [ModelKind; 3] = [
        ModelKind::RegressionOnLags,
        ModelKind::Autoregressive,
        ModelKind::RecurrentSequence,
    ];

    /// Display name reported to users and written to the request log
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RegressionOnLags => "RandomForest",
            ModelKind::Autoregressive => "ARIMA",
            ModelKind::RecurrentSequence => "LSTM",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(s) || format!("{:?}", kind).eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| ForecastError::UnsupportedModel(s.to_string()))
    }
}

/// A fitted model of one of the three families, with its evaluation error
#[derive(Debug, Clone)]
pub enum TrainedModel {
    RegressionOnLags(LagRegressionModel),
    Autoregressive(ArimaModel),
    RecurrentSequence(RecurrentModel),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::RegressionOnLags(_) => ModelKind::RegressionOnLags,
            TrainedModel::Autoregressive(_) => ModelKind::Autoregressive,
            TrainedModel::RecurrentSequence(_) => ModelKind::RecurrentSequence,
        }
    }

    /// RMSE measured by the trainer on its evaluation slice
    pub fn error(&self) -> f64 {
        match self {
            TrainedModel::RegressionOnLags(model) => model.rmse(),
            TrainedModel::Autoregressive(model) => model.rmse(),
            TrainedModel::RecurrentSequence(model) => model.rmse(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Fits one model family on closing prices
pub trait ModelTrainer: Send + Sync {
    /// Family produced by this trainer
    fn kind(&self) -> ModelKind;

    /// Fit on `prices` (oldest first) and score on the family's evaluation slice
    fn train(&self, prices: &[f64]) -> Result<TrainedModel>;
}
