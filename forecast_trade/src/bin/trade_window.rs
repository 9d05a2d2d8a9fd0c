//! Recommend a buy/sell window for one ticker from CSV price history

use clap::Parser;
use forecast_trade::report::{render_json, render_text};
use forecast_trade::{
    CsvHistorySource, CsvRequestLog, ForecastRequest, Lookback, Pipeline, PipelineConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trade-window")]
#[command(version, about = "Forecast closing prices and recommend a buy/sell window")]
struct Args {
    /// Directory holding <TICKER>.csv files with Date and Close columns
    #[arg(long)]
    data_dir: PathBuf,

    /// Ticker symbol
    #[arg(long, short)]
    ticker: String,

    /// Amount to invest
    #[arg(long, short)]
    amount: f64,

    /// Days to forecast (overrides the config file)
    #[arg(long)]
    horizon: Option<usize>,

    /// History to use, e.g. 6mo, 2y or max (overrides the config file)
    #[arg(long)]
    lookback: Option<Lookback>,

    /// Path to a TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Append a request record to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Name recorded in the request log
    #[arg(long, default_value = "cli")]
    requester: String,

    /// Print the outcome as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(lookback) = args.lookback {
        config.lookback = lookback;
    }
    config.validate()?;

    let mut pipeline = Pipeline::new(config);
    if let Some(path) = &args.log_file {
        pipeline = pipeline.with_request_log(Arc::new(CsvRequestLog::new(path)));
    }

    let source = CsvHistorySource::new(&args.data_dir);
    let request = ForecastRequest::new(args.requester.clone(), args.ticker.clone());
    let outcome = pipeline.run_for(&request, &source, args.amount)?;

    if args.json {
        println!("{}", render_json(&outcome)?);
    } else {
        println!("{}", render_text(&args.ticker, &outcome));
    }

    Ok(())
}
