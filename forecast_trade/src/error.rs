//! Error types for the forecast_trade crate

use crate::models::ModelKind;
use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the forecast_trade crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too little history to build features or fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The recurrent model's window is longer than the available history
    #[error("Insufficient history: need at least {required} observations, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// A forecast was requested for a model the generator does not know
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// Strategy evaluation was given an empty forecast
    #[error("Forecast is empty")]
    EmptyForecast,

    /// The history source has nothing for the requested ticker
    #[error("No data for ticker {0}")]
    NoData(String),

    /// A trainer did not finish within its wall-clock budget
    #[error("{kind} trainer timed out after {seconds:.1}s")]
    TrainerTimeout { kind: ModelKind, seconds: f64 },

    /// A trainer stopped without producing a result
    #[error("{kind} trainer failed: {message}")]
    TrainerFailed { kind: ModelKind, message: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Price data that violates series invariants
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Configuration could not be read or is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading or writing delimited files
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error rendering JSON output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}
