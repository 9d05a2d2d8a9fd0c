//! Buy/sell recommendation derived from a price forecast

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use trade_math::stats::{first_argmax, first_argmin, mean};

/// Recommended trading window and the return it implies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecommendation {
    pub current_price: f64,
    /// Mean forecast price relative to the current price, in percent
    pub price_change_percent: f64,
    pub min_forecast_price: f64,
    /// 1-indexed day of the lowest forecast price
    pub buy_day: usize,
    pub max_forecast_price: f64,
    /// 1-indexed day of the highest forecast price
    pub sell_day: usize,
    /// Whole shares affordable at the current price
    pub shares: u64,
    /// Profit from buying now and selling at the forecast maximum
    pub potential_profit: f64,
    /// Profit as a percentage of the invested amount
    pub roi: f64,
}

impl StrategyRecommendation {
    /// Buying on the forecast low happens after the forecast high
    pub fn sell_precedes_buy(&self) -> bool {
        self.sell_day < self.buy_day
    }
}

/// Evaluate a forecast for an investment of `amount` at `current_price`.
///
/// Ties for the minimum or maximum resolve to the earliest day.
pub fn evaluate_strategy(
    forecast: &[f64],
    current_price: f64,
    amount: f64,
) -> Result<StrategyRecommendation> {
    if forecast.is_empty() {
        return Err(ForecastError::EmptyForecast);
    }
    if !(current_price.is_finite() && current_price > 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Current price must be positive, got {}",
            current_price
        )));
    }
    if !(amount.is_finite() && amount >= 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Investment amount must be non-negative, got {}",
            amount
        )));
    }

    let average = mean(forecast)?;
    let price_change_percent = (average - current_price) / current_price * 100.0;

    let (min_idx, min_forecast_price) = first_argmin(forecast).ok_or_else(no_prices)?;
    let (max_idx, max_forecast_price) = first_argmax(forecast).ok_or_else(no_prices)?;

    let shares = affordable_shares(amount, current_price)?;
    let potential_profit = shares as f64 * (max_forecast_price - current_price);
    let roi = if amount > 0.0 {
        potential_profit / amount * 100.0
    } else {
        0.0
    };

    Ok(StrategyRecommendation {
        current_price,
        price_change_percent,
        min_forecast_price,
        buy_day: min_idx + 1,
        max_forecast_price,
        sell_day: max_idx + 1,
        shares,
        potential_profit,
        roi,
    })
}

fn no_prices() -> ForecastError {
    ForecastError::InvalidData("Forecast holds no comparable prices".to_string())
}

/// Whole share counts above this lose integer precision as `f64`
const MAX_EXACT_SHARES: f64 = 9_007_199_254_740_992.0;

/// Largest whole number of shares with `shares * price <= amount`
fn affordable_shares(amount: f64, price: f64) -> Result<u64> {
    let estimate = (amount / price).floor();
    if estimate >= MAX_EXACT_SHARES {
        return Err(ForecastError::InvalidParameter(format!(
            "Investment amount {} buys more shares at {} than can be counted exactly",
            amount, price
        )));
    }

    let mut shares = estimate as u64;
    // the division can land one off in either direction
    while shares > 0 && shares as f64 * price > amount {
        shares -= 1;
    }
    while let Some(next) = shares.checked_add(1) {
        if next as f64 * price > amount {
            break;
        }
        shares = next;
    }
    Ok(shares)
}
