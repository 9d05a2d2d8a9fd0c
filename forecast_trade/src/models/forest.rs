//! Random forest regression: bootstrap-aggregated CART trees

use crate::error::{ForecastError, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (unbounded if None)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (all if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 || self.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be >= 1 and min_samples_split >= 2".to_string(),
            ));
        }
        if self.max_depth == Some(0) || self.max_features == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_depth and max_features must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Regression tree grown by variance reduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [f64],
    config: &'a ForestConfig,
    n_features: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize, rng: &mut ChaCha8Rng) -> Node {
        let n = indices.len();
        let mean = indices.iter().map(|&i| self.labels[i]).sum::<f64>() / n as f64;
        let sse: f64 = indices
            .iter()
            .map(|&i| (self.labels[i] - mean).powi(2))
            .sum();

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || sse <= 1e-12
        {
            return Node::Leaf { value: mean };
        }

        let split = match self.best_split(indices, mean, rng) {
            Some(split) if split.score < sse - 1e-12 => split,
            _ => return Node::Leaf { value: mean },
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { value: mean };
        }

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(&left, depth + 1, rng)),
            right: Box::new(self.build(&right, depth + 1, rng)),
        }
    }

    /// Lowest total squared error over candidate features, sweeping sorted values
    fn best_split(&self, indices: &[usize], mean: f64, rng: &mut ChaCha8Rng) -> Option<Split> {
        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        if let Some(max_features) = self.config.max_features {
            if max_features < self.n_features {
                candidates.shuffle(rng);
                candidates.truncate(max_features);
            }
        }

        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf;
        let total_sum: f64 = indices.iter().map(|&i| self.labels[i] - mean).sum();
        let total_sq: f64 = indices
            .iter()
            .map(|&i| (self.labels[i] - mean).powi(2))
            .sum();

        let mut sorted = indices.to_vec();
        let mut best: Option<Split> = None;

        for feature in candidates {
            sorted.sort_by(|&a, &b| {
                self.features[a][feature].total_cmp(&self.features[b][feature])
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let centered = self.labels[sorted[k - 1]] - mean;
                left_sum += centered;
                left_sq += centered * centered;

                let left_n = k;
                let right_n = n - k;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let lo = self.features[sorted[k - 1]][feature];
                let hi = self.features[sorted[k]][feature];
                if lo >= hi {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let score = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);

                if best.as_ref().map_or(true, |b| score < b.score) {
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(Split {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }
}

/// Random forest regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Create an unfitted forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Train the forest; trees are grown in parallel, each with its own seed
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[f64]) -> Result<()> {
        self.config.validate()?;

        if features.is_empty() || features.len() != labels.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Need matching non-empty features and labels, got {} and {}",
                features.len(),
                labels.len()
            )));
        }
        let n_features = features[0].len();
        if n_features == 0 || features.iter().any(|row| row.len() != n_features) {
            return Err(ForecastError::InvalidParameter(
                "Feature rows must share a positive width".to_string(),
            ));
        }
        if features.iter().flatten().chain(labels).any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidData(
                "Training data contains non-finite values".to_string(),
            ));
        }

        let builder = TreeBuilder {
            features,
            labels,
            config: &self.config,
            n_features,
        };
        let n = labels.len();

        let trees: Vec<RegressionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(i as u64));
                let sample: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree {
                    root: builder.build(&sample, 0, &mut rng),
                }
            })
            .collect();

        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    /// Predict for a single sample (mean over trees)
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Random forest has not been fitted".to_string(),
            ));
        }
        if features.len() != self.n_features {
            return Err(ForecastError::InvalidParameter(format!(
                "Expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let total: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Predict for multiple samples
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn max_tree_depth(&self) -> usize {
        self.trees.iter().map(RegressionTree::depth).max().unwrap_or(0)
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}
