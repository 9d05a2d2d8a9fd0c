//! Run the full pipeline on a generated random-walk series and print the
//! report, recording the request in memory.

use chrono::NaiveDate;
use forecast_trade::report::render_text;
use forecast_trade::{
    ForecastError, ForecastRequest, HistorySource, Lookback, MemoryRequestLog, Pipeline,
    PipelineConfig, PriceSeries,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::sync::Arc;

/// Serves one generated series under a single ticker
struct SyntheticSource {
    ticker: String,
    series: PriceSeries,
}

impl HistorySource for SyntheticSource {
    fn fetch_history(&self, ticker: &str, lookback: Lookback) -> forecast_trade::Result<PriceSeries> {
        if !ticker.eq_ignore_ascii_case(&self.ticker) {
            return Err(ForecastError::NoData(ticker.to_uppercase()));
        }
        match lookback.start_from(self.series.last_date()) {
            Some(start) => self.series.since(start),
            None => Ok(self.series.clone()),
        }
    }
}

fn generate_series(days: usize) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let shocks = Normal::new(0.0005, 0.015)?;

    let mut price = 150.0;
    let mut closes = Vec::with_capacity(days);
    for _ in 0..days {
        price *= 1.0 + shocks.sample(&mut rng);
        closes.push(price);
    }

    let start = NaiveDate::from_ymd_opt(2022, 1, 3).ok_or("invalid start date")?;
    Ok(PriceSeries::from_closes(start, &closes)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let source = SyntheticSource {
        ticker: "DEMO".to_string(),
        series: generate_series(500)?,
    };

    let mut config = PipelineConfig::default();
    config.lookback = Lookback::Years(1);
    config.lag_regression.forest.n_trees = 50;
    config.recurrent.max_epochs = 10;

    let log = Arc::new(MemoryRequestLog::new());
    let pipeline = Pipeline::new(config).with_request_log(log.clone());

    let request = ForecastRequest::new("demo-user", "DEMO");
    let outcome = pipeline.run_for(&request, &source, 5_000.0)?;
    println!("{}", render_text(&request.ticker, &outcome));

    // unknown tickers are reported and logged as failures
    let missing = ForecastRequest::new("demo-user", "NOPE");
    if let Err(err) = pipeline.run_for(&missing, &source, 5_000.0) {
        println!("\n{}: {}", missing.ticker, err);
    }

    println!(
        "\nRequest log: {} success, {} failure",
        log.requests().len(),
        log.failures().len()
    );

    Ok(())
}
