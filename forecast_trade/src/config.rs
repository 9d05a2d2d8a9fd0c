//! Pipeline configuration, loadable from TOML

use crate::data::Lookback;
use crate::error::{ForecastError, Result};
use crate::forecast::DEFAULT_HORIZON;
use crate::models::{ArimaConfig, LagRegressionConfig, RecurrentConfig};
use crate::selection::SelectionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything one pipeline run needs besides the price history.
///
/// Every field has a default, so a TOML file only lists what it overrides:
///
/// ```toml
/// horizon = 14
/// lookback = "1y"
///
/// [selection]
/// parallel = false
///
/// [lag_regression.forest]
/// n_trees = 50
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Days to forecast
    pub horizon: usize,
    /// History requested from the source
    pub lookback: Lookback,
    pub selection: SelectionConfig,
    pub lag_regression: LagRegressionConfig,
    pub arima: ArimaConfig,
    pub recurrent: RecurrentConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            lookback: Lookback::default(),
            selection: SelectionConfig::default(),
            lag_regression: LagRegressionConfig::default(),
            arima: ArimaConfig::default(),
            recurrent: RecurrentConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ForecastError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        self.selection.validate()?;
        self.lag_regression.validate()?;
        self.arima.validate()?;
        self.recurrent.validate()
    }
}
