//! ARIMA models for time series forecasting
//!
//! The series is differenced `d` times and an ARMA(p, q) is fitted to the
//! differences: by ordinary least squares when `q = 0`, and by the two-stage
//! Hannan–Rissanen regression otherwise. An intercept is only estimated for
//! undifferenced models.
//!
//! Evaluation re-predicts the trailing share of the same series the model was
//! fitted on (one-step, in-sample). The lag regression and recurrent trainers
//! score on a true holdout instead, so ARIMA errors tend to look optimistic
//! next to theirs.

use crate::error::{ForecastError, Result};
use crate::models::{ModelKind, ModelTrainer, TrainedModel};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use trade_math::differencing::{difference, difference_weights, integrate, undifference};
use trade_math::regression::least_squares;
use trade_math::stats::rmse;

/// ARIMA order: AR terms (p), differencing (d), MA terms (q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Shortest series the trainer accepts for this order
    pub fn min_observations(&self) -> usize {
        self.d + 3 * (self.p + self.q + 1) + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// ARIMA trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    pub order: ArimaOrder,
    /// Trailing share of the series re-predicted for scoring
    pub eval_ratio: f64,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            eval_ratio: 0.2,
        }
    }
}

impl ArimaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.eval_ratio > 0.0 && self.eval_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "arima.eval_ratio must be between 0 and 1".to_string(),
            ));
        }
        if self.order.d > 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Differencing order {} is not supported (max 2)",
                self.order.d
            )));
        }
        Ok(())
    }
}

/// Fits an [`ArimaModel`] on the full series
#[derive(Debug, Clone, Default)]
pub struct ArimaTrainer {
    config: ArimaConfig,
}

impl ArimaTrainer {
    pub fn new(config: ArimaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArimaConfig {
        &self.config
    }

    pub fn fit(&self, prices: &[f64]) -> Result<ArimaModel> {
        self.config.validate()?;
        let order = self.config.order;

        if prices.len() < order.min_observations() {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs at least {} observations, got {}",
                order,
                order.min_observations(),
                prices.len()
            )));
        }

        let diffed = difference(prices, order.d);
        let include_constant = order.d == 0;
        let (constant, ar, ma) = if order.q == 0 {
            estimate_ar(&diffed, order.p, include_constant)?
        } else {
            estimate_hannan_rissanen(&diffed, order.p, order.q, include_constant)?
        };

        let mut model = ArimaModel {
            order,
            constant,
            ar,
            ma,
            history: prices.to_vec(),
            residuals: Vec::new(),
            diffed,
            sigma2: 0.0,
            rmse: 0.0,
        };
        model.residuals = model.compute_residuals();

        let fitted = &model.residuals[order.p.min(model.residuals.len())..];
        model.sigma2 = if fitted.is_empty() {
            0.0
        } else {
            fitted.iter().map(|r| r * r).sum::<f64>() / fitted.len() as f64
        };

        let eval_start = ((prices.len() as f64) * (1.0 - self.config.eval_ratio)).floor() as usize;
        let eval_start = eval_start.max(order.d);
        let predicted = model.predict_in_sample(eval_start, prices.len() - 1)?;
        model.rmse = rmse(&prices[eval_start..], &predicted)?;

        tracing::debug!(
            order = %order,
            ar = ?model.ar,
            ma = ?model.ma,
            sigma2 = model.sigma2,
            rmse = model.rmse,
            eval_start,
            "Fitted ARIMA"
        );

        Ok(model)
    }
}

impl ModelTrainer for ArimaTrainer {
    fn kind(&self) -> ModelKind {
        ModelKind::Autoregressive
    }

    fn train(&self, prices: &[f64]) -> Result<TrainedModel> {
        self.fit(prices).map(TrainedModel::Autoregressive)
    }
}

/// Fitted ARIMA model; carries the series it was fitted on so it can
/// forecast from its own state
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ArimaOrder,
    constant: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    history: Vec<f64>,
    diffed: Vec<f64>,
    residuals: Vec<f64>,
    sigma2: f64,
    rmse: f64,
}

impl ArimaModel {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Residual variance on the differenced scale
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    /// One-step prediction of `diffed[t]` from the values and residuals before it
    fn one_step(&self, t: usize, diffed: &[f64], residuals: &[f64]) -> f64 {
        let ar: f64 = self
            .ar
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < t)
            .map(|(i, phi)| phi * diffed[t - i - 1])
            .sum();
        let ma: f64 = self
            .ma
            .iter()
            .enumerate()
            .filter(|(j, _)| *j < t)
            .map(|(j, theta)| theta * residuals[t - j - 1])
            .sum();
        self.constant + ar + ma
    }

    fn compute_residuals(&self) -> Vec<f64> {
        let mut residuals = vec![0.0; self.diffed.len()];
        for t in self.order.p..self.diffed.len() {
            residuals[t] = self.diffed[t] - self.one_step(t, &self.diffed, &residuals);
        }
        residuals
    }

    /// One-step-ahead level predictions for in-sample indices `start..=end`
    pub fn predict_in_sample(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        let d = self.order.d;
        if start < d || end < start || end >= self.history.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "In-sample range {}..={} is outside {}..{}",
                start,
                end,
                d,
                self.history.len()
            )));
        }

        (start..=end)
            .map(|s| {
                let diffed = self.one_step(s - d, &self.diffed, &self.residuals);
                Ok(undifference(diffed, &self.history[..s], d)?)
            })
            .collect()
    }

    /// Multi-step forecast continuing the fitted series
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let mut diffed = self.diffed.clone();
        let mut residuals = self.residuals.clone();
        let mut path = Vec::with_capacity(steps);

        for _ in 0..steps {
            let next = self.one_step(diffed.len(), &diffed, &residuals);
            diffed.push(next);
            // future shocks have zero expectation
            residuals.push(0.0);
            path.push(next);
        }

        Ok(integrate(&path, &self.history, self.order.d)?)
    }

    /// Forecast with symmetric prediction intervals at `confidence` (e.g. 0.95)
    pub fn forecast_interval(&self, steps: usize, confidence: f64) -> Result<Vec<(f64, f64, f64)>> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence must be between 0 and 1, got {}",
                confidence
            )));
        }

        let normal =
            Normal::new(0.0, 1.0).map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + confidence / 2.0);

        let psi = self.psi_weights(steps);
        let point = self.forecast(steps)?;

        let mut cumulative = 0.0;
        Ok(point
            .into_iter()
            .zip(psi)
            .map(|(value, weight)| {
                cumulative += weight * weight;
                let margin = z * (self.sigma2 * cumulative).sqrt();
                (value - margin, value, value + margin)
            })
            .collect())
    }

    /// MA(∞) weights of the integrated process, `psi_0 = 1`
    fn psi_weights(&self, count: usize) -> Vec<f64> {
        // (1 - Σ φ_i B^i)(1 - B)^d expanded, then negated past the lead term
        let mut ar_poly = vec![1.0];
        ar_poly.extend(self.ar.iter().map(|phi| -phi));
        let diff_poly = difference_weights(self.order.d);

        let mut product = vec![0.0; ar_poly.len() + diff_poly.len() - 1];
        for (i, a) in ar_poly.iter().enumerate() {
            for (k, w) in diff_poly.iter().enumerate() {
                product[i + k] += a * w;
            }
        }
        let phi_star: Vec<f64> = product.iter().skip(1).map(|c| -c).collect();

        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let theta = self.ma.get(j - 1).copied().unwrap_or(0.0);
            let carried: f64 = (1..=j.min(phi_star.len()))
                .map(|i| phi_star[i - 1] * psi[j - i])
                .sum();
            psi.push(theta + carried);
        }
        psi
    }
}

/// OLS fit of an AR(p) on `data`; returns (constant, ar, ma)
fn estimate_ar(data: &[f64], p: usize, include_constant: bool) -> Result<(f64, Vec<f64>, Vec<f64>)> {
    if p == 0 && !include_constant {
        return Ok((0.0, Vec::new(), Vec::new()));
    }

    let (design, targets): (Vec<Vec<f64>>, Vec<f64>) = (p..data.len())
        .map(|t| {
            let mut row = Vec::with_capacity(p + 1);
            if include_constant {
                row.push(1.0);
            }
            row.extend((1..=p).map(|i| data[t - i]));
            (row, data[t])
        })
        .unzip();

    let beta = least_squares(&design, &targets)?;
    Ok(split_coefficients(&beta, include_constant, p))
}

/// Hannan–Rissanen: a long AR supplies residual estimates that become the MA
/// regressors of a second least-squares pass
fn estimate_hannan_rissanen(
    data: &[f64],
    p: usize,
    q: usize,
    include_constant: bool,
) -> Result<(f64, Vec<f64>, Vec<f64>)> {
    let long_order = (p + q).max(10).min(data.len() / 4).max(1);
    let (long_constant, long_ar, _) = estimate_ar(data, long_order, include_constant)?;

    let mut innovations = vec![0.0; data.len()];
    for t in long_order..data.len() {
        let fitted: f64 = long_ar
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * data[t - i - 1])
            .sum();
        innovations[t] = data[t] - long_constant - fitted;
    }

    let start = p.max(long_order + q);
    let (design, targets): (Vec<Vec<f64>>, Vec<f64>) = (start..data.len())
        .map(|t| {
            let mut row = Vec::with_capacity(p + q + 1);
            if include_constant {
                row.push(1.0);
            }
            row.extend((1..=p).map(|i| data[t - i]));
            row.extend((1..=q).map(|j| innovations[t - j]));
            (row, data[t])
        })
        .unzip();

    let beta = least_squares(&design, &targets)?;
    Ok(split_coefficients(&beta, include_constant, p))
}

/// Split a coefficient vector into (constant, first `p` terms, remainder)
fn split_coefficients(beta: &[f64], include_constant: bool, p: usize) -> (f64, Vec<f64>, Vec<f64>) {
    let (constant, terms) = if include_constant {
        (beta[0], &beta[1..])
    } else {
        (0.0, beta)
    };
    (constant, terms[..p].to_vec(), terms[p..].to_vec())
}
