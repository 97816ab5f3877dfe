//! Binary linear classifier with margin scores
//!
//! One instance learns a single "is it this category, or not" decision over
//! sparse TF-IDF rows. Training is full-batch subgradient descent on
//! L2-regularized hinge loss; `decision_function` returns the raw margin
//! `w·x + b`, not a probability, so callers choose their own cutoff.

use crate::ml::vectorizer::SparseRow;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hyperparameters for one binary linear classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearConfig {
    /// Gradient-descent step size
    pub learning_rate: f32,
    /// Number of full-batch iterations
    pub max_iter: usize,
    /// L2 regularization strength
    pub lambda: f32,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_iter: 200,
            lambda: 1e-4,
        }
    }
}

/// Binary hinge-loss linear classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    weights: Vec<f32>,
    bias: f32,
    config: LinearConfig,
}

impl LinearClassifier {
    /// Create an unfitted classifier with default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LinearConfig::default())
    }

    /// Create an unfitted classifier with explicit hyperparameters.
    #[must_use]
    pub fn with_config(config: LinearConfig) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            config,
        }
    }

    /// Whether `fit` has been called.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Train on sparse rows against boolean targets.
    ///
    /// `dimension` is the feature-space width (the vectorizer's vocabulary
    /// size); every column index in `rows` must be below it. Training
    /// replaces any previously fitted weights. Iteration stops early once
    /// every sample has a functional margin of at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `rows` and `targets` disagree in
    /// length, and [`Error::EmptyTrainingSet`] on an empty batch or a
    /// zero-width feature space.
    pub fn fit(&mut self, rows: &[SparseRow], targets: &[bool], dimension: usize) -> Result<()> {
        if rows.len() != targets.len() {
            return Err(Error::ShapeMismatch {
                left: rows.len(),
                right: targets.len(),
            });
        }
        if rows.is_empty() || dimension == 0 {
            return Err(Error::EmptyTrainingSet);
        }

        self.weights = vec![0.0; dimension];
        self.bias = 0.0;

        let n = rows.len() as f32;
        let lr = self.config.learning_rate;
        let decay = 1.0 - lr * self.config.lambda;

        for _ in 0..self.config.max_iter {
            let mut grad = vec![0.0f32; dimension];
            let mut grad_bias = 0.0f32;
            let mut violations = 0usize;

            for (row, &target) in rows.iter().zip(targets) {
                let y = if target { 1.0 } else { -1.0 };
                if y * self.decision_function(row) < 1.0 {
                    for &(column, value) in row {
                        grad[column] += y * value;
                    }
                    grad_bias += y;
                    violations += 1;
                }
            }

            if violations == 0 {
                break;
            }

            for (weight, g) in self.weights.iter_mut().zip(&grad) {
                *weight = *weight * decay + lr * g / n;
            }
            self.bias += lr * grad_bias / n;
        }

        Ok(())
    }

    /// Raw decision margin `w·x + b` for one sparse row.
    ///
    /// Positive means "carries the category"; the magnitude is the
    /// confidence of the linear boundary. Unfitted classifiers score every
    /// row at exactly the bias (zero).
    #[must_use]
    pub fn decision_function(&self, row: &SparseRow) -> f32 {
        let mut score = self.bias;
        for &(column, value) in row {
            if let Some(weight) = self.weights.get(column) {
                score += weight * value;
            }
        }
        score
    }
}

impl Default for LinearClassifier {
    fn default() -> Self {
        Self::new()
    }
}
