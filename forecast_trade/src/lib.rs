//! # Forecast Trade
//!
//! Recommends a buy/sell window for an equity from its closing-price history.
//!
//! ## Features
//!
//! - Validated price series and CSV history sources with market-style lookbacks
//! - Three competing model families: random forest on lagged prices, ARIMA, LSTM
//! - Model selection by evaluation RMSE, with trainers on worker threads
//! - Recursive multi-day forecasts
//! - Strategy evaluation: buy/sell days, shares, profit and ROI
//! - Pluggable request log, TOML configuration, text and JSON reports
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use forecast_trade::{run_pipeline, PriceSeries};
//!
//! # fn main() -> forecast_trade::Result<()> {
//! let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
//! let closes: Vec<f64> = (0..300).map(|i| 100.0 + (i as f64 * 0.1).sin() * 5.0).collect();
//! let series = PriceSeries::from_closes(start, &closes)?;
//!
//! let outcome = run_pipeline(&series, 30, 1_000.0)?;
//! println!(
//!     "{} (rmse {:.4}): buy on day {}, sell on day {}",
//!     outcome.model_name, outcome.model_error, outcome.strategy.buy_day, outcome.strategy.sell_day
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod request_log;
pub mod selection;
pub mod strategy;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{CsvHistorySource, HistorySource, Lookback, PricePoint, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_lag_features, LagFeatureTable, LagRecord};
pub use crate::forecast::{generate_forecast, ForecastPath, RollingWindow, DEFAULT_HORIZON};
pub use crate::models::{ModelKind, ModelTrainer, TrainedModel};
pub use crate::pipeline::{run_pipeline, ForecastRequest, Pipeline, PipelineOutcome};
pub use crate::request_log::{CsvRequestLog, MemoryRequestLog, NullRequestLog, RequestLog};
pub use crate::selection::{ModelSelector, SelectionConfig, SelectionResult, TrainerOutcome};
pub use crate::strategy::{evaluate_strategy, StrategyRecommendation};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
