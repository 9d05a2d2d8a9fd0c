//! LSTM regression over sliding price windows

use crate::error::{ForecastError, Result};
use crate::models::lstm::{Adam, LstmNetwork};
use crate::models::{ModelKind, ModelTrainer, TrainedModel};
use crate::utils::{holdout_split_index, min_split_len};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use trade_math::stats::rmse;
use trade_math::MinMaxScaler;

/// Recurrent trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrentConfig {
    /// Prices per input sequence
    pub window: usize,
    pub hidden_size: usize,
    pub max_epochs: usize,
    pub batch_size: usize,
    /// Epochs without validation improvement before stopping
    pub patience: usize,
    pub learning_rate: f64,
    /// Global gradient norm cap
    pub clip_norm: f64,
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for RecurrentConfig {
    fn default() -> Self {
        Self {
            window: 30,
            hidden_size: 32,
            max_epochs: 40,
            batch_size: 16,
            patience: 5,
            learning_rate: 0.005,
            clip_norm: 5.0,
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

impl RecurrentConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("window", self.window),
            ("hidden_size", self.hidden_size),
            ("max_epochs", self.max_epochs),
            ("batch_size", self.batch_size),
            ("patience", self.patience),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ForecastError::InvalidParameter(format!(
                "recurrent.{} must be positive",
                name
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "recurrent.learning_rate must be positive".to_string(),
            ));
        }
        if !(self.clip_norm > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "recurrent.clip_norm must be positive".to_string(),
            ));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "recurrent.test_ratio must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trains a [`RecurrentModel`]
#[derive(Debug, Clone, Default)]
pub struct RecurrentTrainer {
    config: RecurrentConfig,
}

impl RecurrentTrainer {
    pub fn new(config: RecurrentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecurrentConfig {
        &self.config
    }

    pub fn fit(&self, prices: &[f64]) -> Result<RecurrentModel> {
        let config = &self.config;
        config.validate()?;

        let window = config.window;
        let required = window + min_split_len(config.test_ratio)?;
        if prices.len() < required {
            return Err(ForecastError::InsufficientHistory {
                required,
                available: prices.len(),
            });
        }

        let n_samples = prices.len() - window;
        let train_len = holdout_split_index(n_samples, config.test_ratio)?;

        // the last training target sits at index train_len - 1 + window
        let scaler = MinMaxScaler::fit(&prices[..train_len + window])?;
        let scaled = scaler.transform_all(prices);

        let samples: Vec<(&[f64], f64)> = (0..n_samples)
            .map(|i| (&scaled[i..i + window], scaled[i + window]))
            .collect();
        let (train, validation) = samples.split_at(train_len);

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut network = LstmNetwork::new(config.hidden_size, &mut rng);
        let mut optimizer = Adam::new(config.hidden_size, config.learning_rate, config.clip_norm);

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut best_params = network.params().clone();
        let mut best_loss = f64::INFINITY;
        let mut best_epoch = 0;
        let mut stale = 0;
        let mut epochs_run = 0;

        for epoch in 1..=config.max_epochs {
            epochs_run = epoch;
            order.shuffle(&mut rng);

            let mut train_loss = 0.0;
            let mut batches = 0;
            for chunk in order.chunks(config.batch_size) {
                let batch: Vec<(&[f64], f64)> = chunk.iter().map(|&i| train[i]).collect();
                train_loss += network.train_batch(&batch, &mut optimizer);
                batches += 1;
            }
            let train_loss = train_loss / batches.max(1) as f64;
            let val_loss = network.mean_squared_error(validation);

            tracing::debug!(epoch, train_loss, val_loss, "LSTM epoch");

            if val_loss < best_loss {
                best_loss = val_loss;
                best_epoch = epoch;
                best_params = network.params().clone();
                stale = 0;
            } else {
                stale += 1;
                if stale >= config.patience {
                    tracing::debug!(epoch, best_epoch, best_loss, "LSTM early stopping");
                    break;
                }
            }
        }

        network.set_params(best_params);

        let predicted: Vec<f64> = validation
            .iter()
            .map(|(input, _)| scaler.inverse(network.predict(input)))
            .collect();
        let actual = &prices[train_len + window..];
        let rmse = rmse(actual, &predicted)?;

        if !rmse.is_finite() {
            return Err(ForecastError::TrainerFailed {
                kind: ModelKind::RecurrentSequence,
                message: "LSTM training diverged".to_string(),
            });
        }

        tracing::debug!(epochs_run, best_epoch, rmse, "Fitted LSTM");

        Ok(RecurrentModel {
            window,
            network,
            scaler,
            rmse,
            epochs_run,
            best_epoch,
        })
    }
}

impl ModelTrainer for RecurrentTrainer {
    fn kind(&self) -> ModelKind {
        ModelKind::RecurrentSequence
    }

    fn train(&self, prices: &[f64]) -> Result<TrainedModel> {
        self.fit(prices).map(TrainedModel::RecurrentSequence)
    }
}

/// Fitted LSTM with the scaler of its training slice
#[derive(Debug, Clone)]
pub struct RecurrentModel {
    window: usize,
    network: LstmNetwork,
    scaler: MinMaxScaler,
    rmse: f64,
    epochs_run: usize,
    best_epoch: usize,
}

impl RecurrentModel {
    /// Prices per input sequence
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    /// Epoch whose weights were kept
    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    /// Predict the next price from exactly `window` prices, oldest first
    pub fn predict_next(&self, oldest_first: &[f64]) -> Result<f64> {
        if oldest_first.len() < self.window {
            return Err(ForecastError::InsufficientHistory {
                required: self.window,
                available: oldest_first.len(),
            });
        }
        if oldest_first.len() > self.window {
            return Err(ForecastError::InvalidParameter(format!(
                "Model reads {} prices, got {}",
                self.window,
                oldest_first.len()
            )));
        }

        let scaled = self.scaler.transform_all(oldest_first);
        Ok(self.scaler.inverse(self.network.predict(&scaled)))
    }
}
