//! Trains every model family on the same series and keeps the most accurate

use crate::error::{ForecastError, Result};
use crate::models::{ModelKind, ModelTrainer, TrainedModel};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How trainers are scheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Run each trainer on its own worker thread
    pub parallel: bool,
    /// Wall-clock budget per trainer; only enforced in parallel mode
    pub trainer_timeout_secs: Option<f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            trainer_timeout_secs: Some(300.0),
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.trainer_timeout_secs {
            if !(secs > 0.0 && secs.is_finite()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "selection.trainer_timeout_secs must be positive, got {}",
                    secs
                )));
            }
        }
        Ok(())
    }

    fn timeout(&self) -> Option<Duration> {
        self.trainer_timeout_secs.map(Duration::from_secs_f64)
    }
}

/// What one trainer produced, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainerOutcome {
    pub kind: ModelKind,
    /// Evaluation RMSE when the trainer succeeded
    pub rmse: Option<f64>,
    /// Failure message otherwise
    pub error: Option<String>,
}

impl TrainerOutcome {
    pub fn succeeded(&self) -> bool {
        self.rmse.is_some()
    }
}

/// The winning model plus every trainer's outcome, in trainer order
#[derive(Debug, Clone)]
pub struct SelectionResult {
    model: TrainedModel,
    outcomes: Vec<TrainerOutcome>,
}

impl SelectionResult {
    pub fn new(model: TrainedModel, outcomes: Vec<TrainerOutcome>) -> Self {
        Self { model, outcomes }
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// RMSE of the selected model
    pub fn error(&self) -> f64 {
        self.model.error()
    }

    pub fn outcomes(&self) -> &[TrainerOutcome] {
        &self.outcomes
    }

    pub fn into_model(self) -> TrainedModel {
        self.model
    }
}

/// Pick the candidate with the lowest error.
///
/// Candidates are visited in order and only a strictly lower error replaces
/// the current best, so the earliest candidate wins ties. Non-finite errors
/// count as failures. When nothing succeeds the first failure is returned.
pub fn pick_lowest_error<T>(
    candidates: Vec<(ModelKind, Result<T>)>,
    error_of: impl Fn(&T) -> f64,
) -> Result<(ModelKind, T)> {
    let mut best: Option<(ModelKind, T, f64)> = None;
    let mut first_failure: Option<ForecastError> = None;

    for (kind, result) in candidates {
        match result {
            Ok(candidate) => {
                let error = error_of(&candidate);
                if !error.is_finite() {
                    first_failure.get_or_insert(ForecastError::TrainerFailed {
                        kind,
                        message: format!("non-finite evaluation error {}", error),
                    });
                    continue;
                }
                let better = match &best {
                    Some((_, _, best_error)) => error < *best_error,
                    None => true,
                };
                if better {
                    best = Some((kind, candidate, error));
                }
            }
            Err(err) => {
                first_failure.get_or_insert(err);
            }
        }
    }

    match best {
        Some((kind, candidate, _)) => Ok((kind, candidate)),
        None => Err(first_failure.unwrap_or_else(|| {
            ForecastError::InvalidParameter("No trainers to select from".to_string())
        })),
    }
}

/// Runs a fixed, ordered set of trainers and selects the best model
pub struct ModelSelector {
    trainers: Vec<Arc<dyn ModelTrainer>>,
    config: SelectionConfig,
}

impl ModelSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            trainers: Vec::new(),
            config,
        }
    }

    /// Append a trainer; order decides ties
    pub fn with_trainer<T: ModelTrainer + 'static>(mut self, trainer: T) -> Self {
        self.trainers.push(Arc::new(trainer));
        self
    }

    pub fn trainer_kinds(&self) -> Vec<ModelKind> {
        self.trainers.iter().map(|t| t.kind()).collect()
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Train every family on `prices` and keep the lowest-RMSE model
    pub fn select(&self, prices: Arc<[f64]>) -> Result<SelectionResult> {
        self.config.validate()?;
        if self.trainers.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "No trainers to select from".to_string(),
            ));
        }

        let results = if self.config.parallel {
            self.train_parallel(prices)?
        } else {
            self.train_sequential(&prices)
        };

        let mut outcomes = Vec::with_capacity(results.len());
        for (kind, result) in &results {
            let outcome = match result {
                Ok(model) if model.error().is_finite() => {
                    tracing::info!(model = %kind, rmse = model.error(), "Trainer finished");
                    TrainerOutcome {
                        kind: *kind,
                        rmse: Some(model.error()),
                        error: None,
                    }
                }
                Ok(model) => {
                    tracing::warn!(model = %kind, rmse = model.error(), "Trainer produced a non-finite error");
                    TrainerOutcome {
                        kind: *kind,
                        rmse: None,
                        error: Some(format!("non-finite evaluation error {}", model.error())),
                    }
                }
                Err(err) => {
                    tracing::warn!(model = %kind, error = %err, "Trainer failed");
                    TrainerOutcome {
                        kind: *kind,
                        rmse: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let (kind, model) = pick_lowest_error(results, TrainedModel::error)?;
        tracing::info!(model = %kind, rmse = model.error(), "Selected model");

        Ok(SelectionResult::new(model, outcomes))
    }

    fn train_sequential(&self, prices: &[f64]) -> Vec<(ModelKind, Result<TrainedModel>)> {
        self.trainers
            .iter()
            .map(|trainer| {
                let kind = trainer.kind();
                let result = panic::catch_unwind(AssertUnwindSafe(|| trainer.train(prices)))
                    .unwrap_or_else(|payload| Err(panic_failure(kind, payload)));
                (kind, result)
            })
            .collect()
    }

    /// One named worker per trainer; results come back over a channel until
    /// the shared deadline passes. Late workers are left detached.
    fn train_parallel(&self, prices: Arc<[f64]>) -> Result<Vec<(ModelKind, Result<TrainedModel>)>> {
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();
        let timeout = self.config.timeout();

        for (idx, trainer) in self.trainers.iter().enumerate() {
            let trainer = Arc::clone(trainer);
            let prices = Arc::clone(&prices);
            let tx = tx.clone();
            let kind = trainer.kind();

            thread::Builder::new()
                .name(format!("trainer-{}", kind.name().to_lowercase()))
                .spawn(move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| trainer.train(&prices)))
                        .unwrap_or_else(|payload| Err(panic_failure(kind, payload)));
                    // the selector may have stopped listening after its deadline
                    let _ = tx.send((idx, result));
                })?;
        }
        drop(tx);

        let mut slots: Vec<Option<Result<TrainedModel>>> =
            (0..self.trainers.len()).map(|_| None).collect();
        let mut pending = slots.len();

        while pending > 0 {
            let received = match timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    rx.recv_timeout(remaining)
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok((idx, result)) => {
                    slots[idx] = Some(result);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        Ok(self
            .trainers
            .iter()
            .zip(slots)
            .map(|(trainer, slot)| {
                let kind = trainer.kind();
                let result = slot.unwrap_or_else(|| match timeout {
                    Some(limit) if started.elapsed() >= limit => Err(ForecastError::TrainerTimeout {
                        kind,
                        seconds: elapsed,
                    }),
                    _ => Err(ForecastError::TrainerFailed {
                        kind,
                        message: "worker exited without reporting".to_string(),
                    }),
                });
                (kind, result)
            })
            .collect())
    }
}

fn panic_failure(kind: ModelKind, payload: Box<dyn Any + Send>) -> ForecastError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "trainer panicked".to_string());
    ForecastError::TrainerFailed { kind, message }
}
