//! Multi-step price forecasts from a selected model

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ModelKind, TrainedModel};
use crate::selection::SelectionResult;
use crate::utils::future_dates;
use chrono::NaiveDate;
use serde::Serialize;

/// Default number of days to forecast
pub const DEFAULT_HORIZON: usize = 30;

/// Fixed-size window of the most recent values used for recursive forecasting.
///
/// Backed by a ring buffer: pushing overwrites the oldest slot. The window
/// starts filled with observed prices and tracks how many of them are still
/// inside as predictions are pushed in.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: Vec<f64>,
    /// Slot holding the oldest value, next to be overwritten
    head: usize,
    observed: usize,
}

impl RollingWindow {
    /// Seed with observed values, oldest first
    pub fn from_observed(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Rolling window needs at least one value".to_string(),
            ));
        }
        Ok(Self {
            buf: values.to_vec(),
            head: 0,
            observed: values.len(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Observed (not predicted) values still in the window
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Drop the oldest value and append `value` as the newest
    pub fn push(&mut self, value: f64) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.buf.len();
        self.observed = self.observed.saturating_sub(1);
    }

    pub fn oldest_first(&self) -> Vec<f64> {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer).copied().collect()
    }

    pub fn recent_first(&self) -> Vec<f64> {
        let mut values = self.oldest_first();
        values.reverse();
        values
    }
}

/// Forecast produced for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPath {
    /// One calendar day per value, starting the day after the last observation
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    /// Last observed close
    pub current_price: f64,
    pub model: ModelKind,
}

impl ForecastPath {
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Forecast `horizon` prices with the selected model
pub fn generate_forecast(
    series: &PriceSeries,
    selection: &SelectionResult,
    horizon: usize,
) -> Result<ForecastPath> {
    forecast_with_model(series, selection.model(), horizon)
}

/// Forecast `horizon` prices with any trained model
pub fn forecast_with_model(
    series: &PriceSeries,
    model: &TrainedModel,
    horizon: usize,
) -> Result<ForecastPath> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be at least 1".to_string(),
        ));
    }

    let values = match model {
        TrainedModel::RegressionOnLags(model) => {
            let lags = model.lags();
            if series.len() < lags {
                return Err(ForecastError::InsufficientData(format!(
                    "Need {} observed prices to seed the lag window, got {}",
                    lags,
                    series.len()
                )));
            }
            let mut window = RollingWindow::from_observed(series.tail(lags)?)?;
            roll_forward(&mut window, horizon, |w| model.predict_next(&w.recent_first()))?
        }
        TrainedModel::Autoregressive(model) => model.forecast(horizon)?,
        TrainedModel::RecurrentSequence(model) => {
            let mut window = RollingWindow::from_observed(series.tail(model.window())?)?;
            roll_forward(&mut window, horizon, |w| model.predict_next(&w.oldest_first()))?
        }
    };

    if values.len() != horizon {
        return Err(ForecastError::InvalidData(format!(
            "{} produced {} values for a horizon of {}",
            model.kind(),
            values.len(),
            horizon
        )));
    }

    Ok(ForecastPath {
        dates: future_dates(series.last_date(), horizon),
        values,
        current_price: series.current_price(),
        model: model.kind(),
    })
}

/// Predict, record, and feed each prediction back into the window
fn roll_forward<F>(window: &mut RollingWindow, horizon: usize, mut predict: F) -> Result<Vec<f64>>
where
    F: FnMut(&RollingWindow) -> Result<f64>,
{
    let mut path = Vec::with_capacity(horizon);
    for step in 1..=horizon {
        let next = predict(window)?;
        path.push(next);
        window.push(next);
        if window.observed() == 0 && step == window.capacity() {
            tracing::debug!(step, "Forecast window now holds only predictions");
        }
    }
    Ok(path)
}
