//! # Trade Window
//!
//! Umbrella crate for the workspace: [`trade_math`] holds the numeric kernels
//! and [`forecast_trade`] the model selection, forecasting and strategy
//! evaluation built on them.
//!
//! ## Example
//!
//! ```
//! use trade_window::forecast_trade::evaluate_strategy;
//!
//! let recommendation = evaluate_strategy(&[90.0, 120.0, 95.0], 100.0, 1_000.0).unwrap();
//! assert_eq!(recommendation.shares, 10);
//! assert_eq!(recommendation.buy_day, 1);
//! assert_eq!(recommendation.sell_day, 2);
//! ```

pub use forecast_trade;
pub use trade_math;

pub use forecast_trade::{
    run_pipeline, ForecastError, ForecastPath, ModelKind, Pipeline, PipelineConfig,
    PipelineOutcome, PriceSeries, StrategyRecommendation,
};
