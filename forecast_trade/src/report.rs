//! Human-readable rendering of a pipeline outcome

use crate::pipeline::PipelineOutcome;
use std::fmt::{self, Write};

const DISCLAIMER: &str =
    "Attention: this is a forecast based on historical data and does not constitute financial advice.";

/// Plain-text summary of an outcome for `ticker`
pub fn render_text(ticker: &str, outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    let _ = write_text(&mut out, ticker, outcome);
    out
}

fn write_text(out: &mut String, ticker: &str, outcome: &PipelineOutcome) -> fmt::Result {
    let strategy = &outcome.strategy;

    writeln!(out, "Results of the analysis for {}", ticker.to_uppercase())?;
    writeln!(out)?;
    writeln!(out, "Current price: ${:.2}", strategy.current_price)?;
    writeln!(out, "Best model: {}", outcome.model_name)?;
    writeln!(out, "RMSE: {:.4}", outcome.model_error)?;
    writeln!(out)?;

    writeln!(out, "{}-day forecast", outcome.forecast.horizon())?;
    if let (Some(first), Some(last)) = (outcome.forecast.dates.first(), outcome.forecast.dates.last()) {
        writeln!(out, "- Period: {} to {}", first, last)?;
    }
    writeln!(
        out,
        "- Expected change percentage: {:+.2}%",
        strategy.price_change_percent
    )?;
    writeln!(
        out,
        "- Minimal price: ${:.2} (day {})",
        strategy.min_forecast_price, strategy.buy_day
    )?;
    writeln!(
        out,
        "- Max price: ${:.2} (day {})",
        strategy.max_forecast_price, strategy.sell_day
    )?;
    writeln!(out)?;

    writeln!(out, "Trading recommendations:")?;
    writeln!(out, "- Purchase, recommended day {}", strategy.buy_day)?;
    writeln!(out, "- Sale, recommended day {}", strategy.sell_day)?;
    if strategy.sell_precedes_buy() {
        writeln!(out, "- Note: the forecast high comes before the forecast low")?;
    }
    writeln!(out)?;

    writeln!(out, "Potential profit:")?;
    writeln!(out, "- Investing ${:.2} ({} shares)", outcome.amount, strategy.shares)?;
    writeln!(out, "- Profit: ${:.2}", strategy.potential_profit)?;
    writeln!(out, "- ROI: {:+.2}%", strategy.roi)?;
    writeln!(out)?;

    writeln!(out, "Model errors:")?;
    for trainer in &outcome.trainers {
        match (trainer.rmse, &trainer.error) {
            (Some(rmse), _) => {
                writeln!(out, "- {}: {:.4}", trainer.kind, rmse)?;
            }
            (None, Some(message)) => {
                writeln!(out, "- {}: failed ({})", trainer.kind, message)?;
            }
            (None, None) => {
                writeln!(out, "- {}: no result", trainer.kind)?;
            }
        }
    }
    writeln!(out)?;

    out.push_str(DISCLAIMER);
    Ok(())
}

/// Pretty-printed JSON of an outcome
pub fn render_json(outcome: &PipelineOutcome) -> crate::error::Result<String> {
    outcome.to_json()
}
