//! Multi-label evaluation harness
//!
//! This module scores predictions against ground truth and drives k-fold
//! cross-validation:
//!
//! - [`ConfusionCell`] - per-category TP/FP/FN/TN counters with the
//!   degenerate-safe precision/recall/F1 definitions
//! - [`MultiLabelConfusion`] - one cell per category, accumulated over one
//!   or more evaluation rounds
//! - [`KFoldEvaluator`] - contiguous-fold cross-validation driver
//! - [`EvaluationReport`] - per-category and macro/micro rows, serializable
//!   for external rendering plus an ASCII table for operators
//!
//! Folds are contiguous slices of `n / k` documents; when `k` does not
//! divide `n`, the final partial remainder is excluded from evaluation. The
//! report carries the evaluated and excluded counts so that undercoverage
//! stays visible.

use crate::data::{self, IndicatorMatrix, LabelIndex};
use crate::ml::{ClassifierPipeline, PipelineConfig, ScoreMatrix};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Per-category confusion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCell {
    /// Predicted positive, actually positive
    pub tp: usize,
    /// Predicted positive, actually negative
    pub fp: usize,
    /// Predicted negative, actually positive
    pub r#fn: usize,
    /// Predicted negative, actually negative
    pub tn: usize,
}

impl ConfusionCell {
    /// Precision = TP / (TP + FP); `1.0` when no predictions were made
    /// (vacuously precise, never an error).
    #[must_use]
    pub fn precision(&self) -> f64 {
        if self.tp + self.fp == 0 {
            1.0
        } else {
            self.tp as f64 / (self.tp + self.fp) as f64
        }
    }

    /// Recall = TP / (TP + FN); `1.0` when there is no positive ground
    /// truth (vacuously recalled).
    #[must_use]
    pub fn recall(&self) -> f64 {
        if self.tp + self.r#fn == 0 {
            1.0
        } else {
            self.tp as f64 / (self.tp + self.r#fn) as f64
        }
    }

    /// F1 = 2·precision·recall / (precision + recall); `0.0` when the
    /// denominator is zero. Never NaN.
    #[must_use]
    pub fn f1(&self) -> f64 {
        f1_from(self.precision(), self.recall())
    }

    /// Total decisions recorded in this cell.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.r#fn + self.tn
    }

    fn add(&mut self, other: &Self) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.r#fn += other.r#fn;
        self.tn += other.tn;
    }
}

/// F1 from precision and recall, `0.0` on a zero denominator.
fn f1_from(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// One confusion cell per category, accumulated across evaluation rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLabelConfusion {
    cells: Vec<ConfusionCell>,
}

impl MultiLabelConfusion {
    /// Create a zeroed accumulator for `num_categories` categories.
    #[must_use]
    pub fn new(num_categories: usize) -> Self {
        Self {
            cells: vec![ConfusionCell::default(); num_categories],
        }
    }

    /// Number of category cells.
    #[must_use]
    pub fn num_categories(&self) -> usize {
        self.cells.len()
    }

    /// All per-category cells in index order.
    #[must_use]
    pub fn cells(&self) -> &[ConfusionCell] {
        &self.cells
    }

    /// Record one round of predictions against ground truth.
    ///
    /// Every (document, category) pair is one binary decision:
    /// predicted-positive iff `score >= cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the truth and score matrices
    /// disagree with each other or with the number of category cells.
    pub fn accumulate(
        &mut self,
        truth: &IndicatorMatrix,
        scores: &ScoreMatrix,
        cutoff: f32,
    ) -> Result<()> {
        if truth.rows() != scores.rows() {
            return Err(Error::ShapeMismatch {
                left: truth.rows(),
                right: scores.rows(),
            });
        }
        if truth.cols() != self.cells.len() || scores.cols() != self.cells.len() {
            return Err(Error::ShapeMismatch {
                left: truth.cols(),
                right: scores.cols(),
            });
        }

        for row in 0..truth.rows() {
            for (col, cell) in self.cells.iter_mut().enumerate() {
                let predicted = scores.get(row, col) >= cutoff;
                let actual = truth.get(row, col);
                match (predicted, actual) {
                    (true, true) => cell.tp += 1,
                    (true, false) => cell.fp += 1,
                    (false, true) => cell.r#fn += 1,
                    (false, false) => cell.tn += 1,
                }
            }
        }

        Ok(())
    }

    /// Grand totals pooled across every category.
    #[must_use]
    pub fn totals(&self) -> ConfusionCell {
        let mut totals = ConfusionCell::default();
        for cell in &self.cells {
            totals.add(cell);
        }
        totals
    }
}

/// One report row for a single category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRow {
    /// Category name
    pub label: String,
    /// Confusion counters for this category
    pub cell: ConfusionCell,
    /// Precision for this category
    pub precision: f64,
    /// Recall for this category
    pub recall: f64,
    /// F1 for this category
    pub f1: f64,
}

/// Aggregate report row (macro or micro averaged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Grand-total confusion counters across all categories
    pub cell: ConfusionCell,
    /// Averaged precision
    pub precision: f64,
    /// Averaged recall
    pub recall: f64,
    /// Averaged F1
    pub f1: f64,
}

/// Full evaluation report: per-category rows plus macro and micro totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// One row per category, in label-index order
    pub categories: Vec<CategoryRow>,
    /// Unweighted per-category means; macro-F1 derived from macro-P/macro-R
    pub macro_totals: AggregateRow,
    /// Pooled-count metrics over every (document, category) decision
    pub micro_totals: AggregateRow,
    /// Documents actually scored across all folds
    pub documents_evaluated: usize,
    /// Documents in the excluded partial remainder
    pub documents_excluded: usize,
    /// Number of folds evaluated
    pub folds: usize,
}

impl EvaluationReport {
    /// Build a report from an accumulated confusion matrix.
    #[must_use]
    pub fn from_confusion(
        confusion: &MultiLabelConfusion,
        index: &LabelIndex,
        documents_evaluated: usize,
        documents_excluded: usize,
        folds: usize,
    ) -> Self {
        let categories: Vec<CategoryRow> = confusion
            .cells()
            .iter()
            .enumerate()
            .map(|(col, cell)| CategoryRow {
                label: index
                    .name_of(col)
                    .map_or_else(|| format!("category {col}"), ToString::to_string),
                cell: *cell,
                precision: cell.precision(),
                recall: cell.recall(),
                f1: cell.f1(),
            })
            .collect();

        let totals = confusion.totals();
        let n = categories.len() as f64;

        let (macro_precision, macro_recall) = if categories.is_empty() {
            (0.0, 0.0)
        } else {
            (
                categories.iter().map(|r| r.precision).sum::<f64>() / n,
                categories.iter().map(|r| r.recall).sum::<f64>() / n,
            )
        };

        let macro_totals = AggregateRow {
            cell: totals,
            precision: macro_precision,
            recall: macro_recall,
            f1: f1_from(macro_precision, macro_recall),
        };

        let micro_totals = AggregateRow {
            cell: totals,
            precision: totals.precision(),
            recall: totals.recall(),
            f1: totals.f1(),
        };

        Self {
            categories,
            macro_totals,
            micro_totals,
            documents_evaluated,
            documents_excluded,
            folds,
        }
    }

    /// Render the report as an ASCII table.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<28} {:>6} {:>6} {:>6} {:>6} {:>10} {:>8} {:>8}",
            "Label", "TP", "FP", "FN", "TN", "Precision", "Recall", "F1"
        );

        for row in &self.categories {
            let _ = writeln!(
                out,
                "{:<28} {:>6} {:>6} {:>6} {:>6} {:>10.3} {:>8.3} {:>8.3}",
                row.label, row.cell.tp, row.cell.fp, row.cell.r#fn, row.cell.tn,
                row.precision, row.recall, row.f1
            );
        }

        for (name, row) in [
            ("Macro Averaged Totals", &self.macro_totals),
            ("Micro Averaged Totals", &self.micro_totals),
        ] {
            let _ = writeln!(
                out,
                "{:<28} {:>6} {:>6} {:>6} {:>6} {:>10.3} {:>8.3} {:>8.3}",
                name, row.cell.tp, row.cell.fp, row.cell.r#fn, row.cell.tn,
                row.precision, row.recall, row.f1
            );
        }

        let _ = writeln!(
            out,
            "\n{} documents evaluated across {} folds ({} excluded as partial remainder)",
            self.documents_evaluated, self.folds, self.documents_excluded
        );

        out
    }
}

/// K-fold cross-validation driver.
///
/// Partitions the (already optionally randomized) dataset into `k`
/// contiguous folds of `n / k` documents, refits the pipeline on each outer
/// set, scores the held-out inner set, and accumulates everything into one
/// shared confusion matrix. Folds run sequentially and independently; no
/// fold's held-out labels reach another fold's training set.
#[derive(Debug, Clone)]
pub struct KFoldEvaluator {
    folds: usize,
    cutoff: f32,
    show_progress: bool,
    config: PipelineConfig,
}

impl KFoldEvaluator {
    /// Create an evaluator with 10 folds and the positive-margin cutoff.
    #[must_use]
    pub fn new() -> Self {
        Self {
            folds: 10,
            cutoff: 1.0,
            show_progress: false,
            config: PipelineConfig::default(),
        }
    }

    /// Set the number of folds.
    #[must_use]
    pub fn folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Set the decision cutoff applied to raw scores.
    ///
    /// The default of `1.0` attaches a document to a category only on a
    /// clearly positive margin; `0.0` is the bare linear boundary.
    #[must_use]
    pub fn cutoff(mut self, cutoff: f32) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Enable or disable a progress bar over folds.
    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set the pipeline hyperparameters used for every fold's refit.
    #[must_use]
    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Run cross-validation and build the aggregated report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] when the fold count is zero or larger
    /// than the document count, [`Error::ShapeMismatch`] when texts, labels,
    /// and index disagree, and any pipeline error from a fold's refit.
    pub fn evaluate(
        &self,
        texts: &[String],
        indicator: &IndicatorMatrix,
        index: &LabelIndex,
    ) -> Result<EvaluationReport> {
        if texts.len() != indicator.rows() {
            return Err(Error::ShapeMismatch {
                left: texts.len(),
                right: indicator.rows(),
            });
        }
        if index.len() != indicator.cols() {
            return Err(Error::ShapeMismatch {
                left: index.len(),
                right: indicator.cols(),
            });
        }
        if self.folds == 0 {
            return Err(Error::Evaluation("fold count must be positive".to_string()));
        }

        let slice_size = texts.len() / self.folds;
        if slice_size == 0 {
            return Err(Error::Evaluation(format!(
                "{} documents cannot fill {} folds",
                texts.len(),
                self.folds
            )));
        }

        let progress = if self.show_progress {
            let pb = ProgressBar::new(self.folds as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] fold {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let mut confusion = MultiLabelConfusion::new(index.len());

        for fold in 0..self.folds {
            let start = fold * slice_size;
            let end = (fold + 1) * slice_size;

            let split = data::slice(texts, indicator, start, end)?;

            let mut pipeline = ClassifierPipeline::with_config(self.config.clone());
            pipeline.fit(&split.outer_texts, &split.outer_indicator)?;
            let scores = pipeline.predict(&split.inner_texts)?;
            confusion.accumulate(&split.inner_indicator, &scores, self.cutoff)?;

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &progress {
            pb.finish_with_message("cross-validation complete");
        }

        let documents_evaluated = slice_size * self.folds;
        Ok(EvaluationReport::from_confusion(
            &confusion,
            index,
            documents_evaluated,
            texts.len() - documents_evaluated,
            self.folds,
        ))
    }
}

impl Default for KFoldEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
