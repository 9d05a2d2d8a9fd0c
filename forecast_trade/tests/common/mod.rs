#![allow(dead_code)]

use chrono::NaiveDate;
use forecast_trade::{PipelineConfig, PriceSeries};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Upward drift with a slow cycle and seeded noise
pub fn noisy_closes(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.8).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.2 * t + 4.0 * (t / 6.0).sin() + noise.sample(&mut rng)
        })
        .collect()
}

pub fn series_of(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(start_date(), closes).unwrap()
}

/// Defaults shrunk so full selections finish quickly
pub fn small_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.horizon = 10;
    config.lag_regression.forest.n_trees = 12;
    config.recurrent.window = 10;
    config.recurrent.hidden_size = 4;
    config.recurrent.max_epochs = 3;
    config.recurrent.batch_size = 8;
    config.selection.trainer_timeout_secs = Some(120.0);
    config
}
