//! End-to-end run: train, select, forecast, evaluate

use crate::config::PipelineConfig;
use crate::data::{HistorySource, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::forecast::{generate_forecast, ForecastPath};
use crate::models::{ArimaTrainer, LagRegressionTrainer, ModelKind, RecurrentTrainer};
use crate::request_log::{FailureEntry, NullRequestLog, RequestEntry, RequestLog};
use crate::selection::{ModelSelector, TrainerOutcome};
use crate::strategy::{evaluate_strategy, StrategyRecommendation};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Who asked for which ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub requester: String,
    pub ticker: String,
}

impl ForecastRequest {
    pub fn new(requester: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
            ticker: ticker.into(),
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub model_name: String,
    pub model: ModelKind,
    /// RMSE of the selected model on its evaluation slice
    pub model_error: f64,
    pub amount: f64,
    pub forecast: ForecastPath,
    pub strategy: StrategyRecommendation,
    /// Every trainer's result, in trainer order
    pub trainers: Vec<TrainerOutcome>,
}

impl PipelineOutcome {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Train, select, forecast, and evaluate with the default configuration
pub fn run_pipeline(series: &PriceSeries, horizon: usize, amount: f64) -> Result<PipelineOutcome> {
    Pipeline::default().run_with_horizon(series, horizon, amount)
}

/// Configured pipeline with a request log
pub struct Pipeline {
    config: PipelineConfig,
    log: Arc<dyn RequestLog>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            log: Arc::new(NullRequestLog),
        }
    }

    pub fn with_request_log(mut self, log: Arc<dyn RequestLog>) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Selector over the three families in tie-breaking order
    pub fn selector(&self) -> ModelSelector {
        ModelSelector::new(self.config.selection.clone())
            .with_trainer(LagRegressionTrainer::new(self.config.lag_regression.clone()))
            .with_trainer(ArimaTrainer::new(self.config.arima.clone()))
            .with_trainer(RecurrentTrainer::new(self.config.recurrent.clone()))
    }

    /// Run over the configured horizon
    pub fn run(&self, series: &PriceSeries, amount: f64) -> Result<PipelineOutcome> {
        self.run_with_horizon(series, self.config.horizon, amount)
    }

    pub fn run_with_horizon(
        &self,
        series: &PriceSeries,
        horizon: usize,
        amount: f64,
    ) -> Result<PipelineOutcome> {
        self.config.validate()?;
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        if !(amount.is_finite() && amount >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Investment amount must be non-negative, got {}",
                amount
            )));
        }

        tracing::info!(
            observations = series.len(),
            from = %series.first_date(),
            to = %series.last_date(),
            horizon,
            "Training models"
        );

        let selection = self.selector().select(series.shared_closes())?;
        let forecast = generate_forecast(series, &selection, horizon)?;
        let strategy = evaluate_strategy(&forecast.values, forecast.current_price, amount)?;

        tracing::info!(
            model = %selection.kind(),
            buy_day = strategy.buy_day,
            sell_day = strategy.sell_day,
            roi = strategy.roi,
            "Strategy evaluated"
        );

        Ok(PipelineOutcome {
            model_name: selection.kind().name().to_string(),
            model: selection.kind(),
            model_error: selection.error(),
            amount,
            forecast,
            strategy,
            trainers: selection.outcomes().to_vec(),
        })
    }

    /// Fetch history for the request, run, and record the outcome
    pub fn run_for(
        &self,
        request: &ForecastRequest,
        source: &dyn HistorySource,
        amount: f64,
    ) -> Result<PipelineOutcome> {
        let result = source
            .fetch_history(&request.ticker, self.config.lookback)
            .and_then(|series| self.run(&series, amount));

        let logged = match &result {
            Ok(outcome) => self.log.record_request(&RequestEntry {
                timestamp: Utc::now(),
                requester: request.requester.clone(),
                ticker: request.ticker.to_uppercase(),
                amount,
                model: outcome.model_name.clone(),
                rmse: outcome.model_error,
                potential_profit: outcome.strategy.potential_profit,
            }),
            Err(err) => self.log.record_failure(&FailureEntry {
                timestamp: Utc::now(),
                requester: request.requester.clone(),
                message: err.to_string(),
            }),
        };
        if let Err(err) = logged {
            tracing::warn!(error = %err, requester = %request.requester, "Failed to write request log");
        }

        result
    }
}
