//! # Trade Math
//!
//! Numeric kernels shared by the forecasting models and the strategy evaluator.
//! This crate provides summary statistics and error metrics, min-max scaling,
//! differencing for integrated time-series models, and ordinary least squares.

use thiserror::Error;

pub mod differencing;
pub mod regression;
pub mod scaling;
pub mod stats;

pub use scaling::MinMaxScaler;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
