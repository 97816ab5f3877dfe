//! Classification pipeline
//!
//! A [`ClassifierPipeline`] composes a [`TfidfVectorizer`] with one binary
//! [`LinearClassifier`] per category column (one-vs-rest decomposition):
//! category `j`'s classifier learns to distinguish indicator column `j`
//! independently of every other column. Because the binary problems are
//! independent, they train in parallel with rayon.
//!
//! `fit` replaces all fitted state wholesale; `predict` scores documents
//! against the already-fitted vocabulary and boundaries, returning raw
//! decision margins rather than probabilities.

mod linear;
mod vectorizer;

pub use linear::{LinearClassifier, LinearConfig};
pub use vectorizer::{SparseRow, TfidfVectorizer};

use crate::data::{IndicatorMatrix, LabelIndex};
use crate::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Smallest n-gram length
    pub ngram_min: usize,
    /// Largest n-gram length
    pub ngram_max: usize,
    /// Per-category classifier step size
    pub learning_rate: f32,
    /// Per-category classifier iteration cap
    pub max_iter: usize,
    /// Per-category L2 regularization strength
    pub lambda: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 5,
            learning_rate: 0.5,
            max_iter: 200,
            lambda: 1e-4,
        }
    }
}

/// Documents × categories matrix of raw decision scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl ScoreMatrix {
    /// Create an all-zero score matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Number of document rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of category columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Score at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "index out of range");
        self.data[row * self.cols + col]
    }

    /// Set the score at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        assert!(row < self.rows && col < self.cols, "index out of range");
        self.data[row * self.cols + col] = value;
    }

    /// One document's full score row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        assert!(row < self.rows, "row out of range");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

/// TF-IDF vectorization composed with one-vs-rest linear classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierPipeline {
    config: PipelineConfig,
    vectorizer: TfidfVectorizer,
    classifiers: Vec<LinearClassifier>,
}

impl ClassifierPipeline {
    /// Create an unfitted pipeline with default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create an unfitted pipeline with explicit hyperparameters.
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            vectorizer: TfidfVectorizer::new(),
            classifiers: Vec::new(),
        }
    }

    /// Whether `fit` has completed at least once.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted() && !self.classifiers.is_empty()
    }

    /// Number of categories the fitted pipeline scores.
    #[must_use]
    pub fn num_categories(&self) -> usize {
        self.classifiers.len()
    }

    /// Train the vectorizer and every per-category classifier.
    ///
    /// Retraining is not incremental: the vocabulary and all decision
    /// boundaries are recomputed and replace any prior fitted state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] when `texts` and `indicator` row
    /// counts disagree, and [`Error::EmptyTrainingSet`] when there are no
    /// documents or no category columns.
    pub fn fit(&mut self, texts: &[String], indicator: &IndicatorMatrix) -> Result<()> {
        if texts.len() != indicator.rows() {
            return Err(Error::ShapeMismatch {
                left: texts.len(),
                right: indicator.rows(),
            });
        }
        if texts.is_empty() || indicator.cols() == 0 {
            return Err(Error::EmptyTrainingSet);
        }

        let mut vectorizer =
            TfidfVectorizer::new().with_ngram_range(self.config.ngram_min, self.config.ngram_max);
        let rows = vectorizer.fit_transform(texts)?;
        let dimension = vectorizer.vocabulary_size();

        let linear_config = LinearConfig {
            learning_rate: self.config.learning_rate,
            max_iter: self.config.max_iter,
            lambda: self.config.lambda,
        };

        // one-vs-rest: column j trains independently against the rest
        let columns: Vec<Vec<bool>> = (0..indicator.cols())
            .map(|col| (0..indicator.rows()).map(|row| indicator.get(row, col)).collect())
            .collect();

        let classifiers = columns
            .into_par_iter()
            .map(|targets| {
                let mut classifier = LinearClassifier::with_config(linear_config.clone());
                classifier.fit(&rows, &targets, dimension)?;
                Ok(classifier)
            })
            .collect::<Result<Vec<_>>>()?;

        self.vectorizer = vectorizer;
        self.classifiers = classifiers;

        Ok(())
    }

    /// Score documents against every category.
    ///
    /// Vectorizes with the already-fitted vocabulary (out-of-vocabulary
    /// terms are ignored) and returns one raw decision margin per
    /// (document, category) pair. A document carries category `j` iff its
    /// score exceeds the caller's cutoff; zero is the linear boundary
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnfittedModel`] if `fit` has never run.
    pub fn predict(&self, texts: &[String]) -> Result<ScoreMatrix> {
        if !self.is_fitted() {
            return Err(Error::UnfittedModel("classifier pipeline"));
        }

        let rows = self.vectorizer.transform(texts)?;
        let mut scores = ScoreMatrix::zeros(texts.len(), self.classifiers.len());
        for (i, row) in rows.iter().enumerate() {
            for (j, classifier) in self.classifiers.iter().enumerate() {
                scores.set(i, j, classifier.decision_function(row));
            }
        }

        Ok(scores)
    }

    /// Save the fitted pipeline to a JSON file.
    ///
    /// The blob is independent of the label index; persist both to classify
    /// in a later process without refitting.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted pipeline from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if file reading or parsing fails.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Default for ClassifierPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Map score rows to the category names whose score exceeds the cutoff.
///
/// Columns beyond the label index are ignored; with an index and pipeline
/// built from the same corpus the shapes always agree.
#[must_use]
pub fn decode(scores: &ScoreMatrix, index: &LabelIndex, cutoff: f32) -> Vec<Vec<String>> {
    let mut decoded = Vec::with_capacity(scores.rows());
    for row in 0..scores.rows() {
        let mut labels = Vec::new();
        for col in 0..scores.cols() {
            if scores.get(row, col) > cutoff {
                if let Some(name) = index.name_of(col) {
                    labels.push(name.to_string());
                }
            }
        }
        decoded.push(labels);
    }
    decoded
}
