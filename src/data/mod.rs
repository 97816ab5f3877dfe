//! Dataset construction for multi-label training
//!
//! This module turns a loaded [`Corpus`] into the numeric structures the
//! classifier consumes:
//!
//! - [`LabelIndex`] - dense integer index over distinct category names
//! - [`IndicatorMatrix`] - documents × categories 0/1 label matrix
//! - [`DatasetBuilder`] - parallel text list + indicator matrix, with
//!   optional seeded shuffling
//! - [`slice`] - contiguous inner/outer split used by cross-validation
//! - [`to_prediction_set`] - label-free projection for classification runs

use crate::corpus::Corpus;
use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Bijective mapping between category names and dense integers.
///
/// Indices are assigned in first-seen order over a corpus traversal, so the
/// same corpus (which iterates in identifier order) always produces the same
/// index. The bijection holds by construction: a name is only inserted when
/// absent, and every index points back at exactly one name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelIndex {
    name_to_index: HashMap<String, usize>,
    names: Vec<String>,
}

impl LabelIndex {
    /// Build an index over every distinct category in the corpus.
    #[must_use]
    pub fn build(corpus: &Corpus) -> Self {
        let mut index = Self::default();
        for document in corpus.iter() {
            for category in &document.categories {
                if !index.name_to_index.contains_key(category) {
                    index
                        .name_to_index
                        .insert(category.clone(), index.names.len());
                    index.names.push(category.clone());
                }
            }
        }
        index
    }

    /// Dense index of a category name, if known.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Category name at a dense index, if in range.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of distinct categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the index holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All category names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Save the index to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load an index from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if file reading or parsing fails.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Documents × categories 0/1 matrix, row-major.
///
/// Row `i` is set at column `j` iff document `i` carries category `j`. Rows
/// correspond one-to-one, in order, with the parallel text list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorMatrix {
    rows: usize,
    cols: usize,
    data: Vec<bool>,
}

impl IndicatorMatrix {
    /// Create an all-zero matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![false; rows * cols],
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

    /// Value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.rows && col < self.cols, "index out of range");
        self.data[row * self.cols + col]
    }

    /// Set the value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(row < self.rows && col < self.cols, "index out of range");
        self.data[row * self.cols + col] = value;
    }

    /// One document's full label row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[bool] {
        assert!(row < self.rows, "row out of range");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Append a copy of `row` as the next document row.
    ///
    /// # Panics
    ///
    /// Panics if the row width differs from the matrix width.
    pub fn push_row(&mut self, row: &[bool]) {
        assert!(row.len() == self.cols, "row width mismatch");
        self.data.extend_from_slice(row);
        self.rows += 1;
    }
}

/// Parallel text list and indicator matrix, ready for training.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// Document bodies, one per row
    pub texts: Vec<String>,
    /// Label matrix, rows parallel to `texts`
    pub indicator: IndicatorMatrix,
}

/// Builds a [`TrainingSet`] from a corpus and a label index.
///
/// With `randomize` enabled, one seeded uniform permutation is applied to
/// the document order before matrix construction; text and indicator rows
/// move together. The default seed is 42 so randomized runs stay
/// reproducible unless the caller picks a different seed.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    randomize: bool,
    seed: u64,
}

impl DatasetBuilder {
    /// Create a builder with randomization off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            randomize: false,
            seed: 42,
        }
    }

    /// Enable or disable order randomization.
    #[must_use]
    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the parallel text list and indicator matrix.
    ///
    /// One row per document, in corpus order unless randomization is on.
    /// Categories missing from the index are skipped; with an index built
    /// over the same corpus that never happens.
    #[must_use]
    pub fn build(&self, corpus: &Corpus, index: &LabelIndex) -> TrainingSet {
        let mut documents: Vec<_> = corpus.iter().collect();

        if self.randomize {
            let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
            documents.shuffle(&mut rng);
        }

        let mut texts = Vec::with_capacity(documents.len());
        let mut indicator = IndicatorMatrix::zeros(documents.len(), index.len());

        for (row, document) in documents.iter().enumerate() {
            texts.push(document.body.clone());
            for category in &document.categories {
                if let Some(col) = index.index_of(category) {
                    indicator.set(row, col, true);
                }
            }
        }

        TrainingSet { texts, indicator }
    }
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A contiguous inner/outer split of a training set.
///
/// `inner` is the held-out range `[start, end)`; `outer` is everything else
/// in original relative order.
#[derive(Debug, Clone)]
pub struct SplitSet {
    /// Held-out texts
    pub inner_texts: Vec<String>,
    /// Held-out label rows
    pub inner_indicator: IndicatorMatrix,
    /// Remaining texts for training
    pub outer_texts: Vec<String>,
    /// Remaining label rows for training
    pub outer_indicator: IndicatorMatrix,
}

/// Split texts and labels into the inner range `[start, end)` and the outer
/// remainder.
///
/// # Errors
///
/// Returns [`Error::SliceRange`] when `start > end` or `end > len` (a
/// harness programming error, never clamped) and [`Error::ShapeMismatch`]
/// when texts and indicator rows disagree.
pub fn slice(
    texts: &[String],
    indicator: &IndicatorMatrix,
    start: usize,
    end: usize,
) -> Result<SplitSet> {
    if texts.len() != indicator.rows() {
        return Err(Error::ShapeMismatch {
            left: texts.len(),
            right: indicator.rows(),
        });
    }
    if start > end || end > texts.len() {
        return Err(Error::SliceRange {
            start,
            end,
            len: texts.len(),
        });
    }

    let cols = indicator.cols();
    let mut inner_indicator = IndicatorMatrix::zeros(0, cols);
    let mut outer_indicator = IndicatorMatrix::zeros(0, cols);

    for row in start..end {
        inner_indicator.push_row(indicator.row(row));
    }
    for row in (0..start).chain(end..texts.len()) {
        outer_indicator.push_row(indicator.row(row));
    }

    let inner_texts = texts[start..end].to_vec();
    let mut outer_texts = texts[..start].to_vec();
    outer_texts.extend_from_slice(&texts[end..]);

    Ok(SplitSet {
        inner_texts,
        inner_indicator,
        outer_texts,
        outer_indicator,
    })
}

/// Parallel (texts, identifiers) projection for documents to classify.
///
/// No label dependency: documents without categories are included.
#[must_use]
pub fn to_prediction_set(corpus: &Corpus) -> (Vec<String>, Vec<String>) {
    let mut texts = Vec::with_capacity(corpus.len());
    let mut ids = Vec::with_capacity(corpus.len());
    for document in corpus.iter() {
        texts.push(document.body.clone());
        ids.push(document.id.clone());
    }
    (texts, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LabeledDocument;

    fn doc(id: &str, categories: &[&str], body: &str) -> LabeledDocument {
        LabeledDocument {
            id: id.to_string(),
            categories: categories.iter().map(|s| (*s).to_string()).collect(),
            body: body.to_string(),
        }
    }

    fn sample_corpus() -> Corpus {
        vec![
            doc("a.txt", &["News"], "alpha body"),
            doc("b.txt", &["Sports", "News"], "beta body"),
            doc("c.txt", &["Arts"], "gamma body"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_label_index_first_seen_order() {
        let corpus = sample_corpus();
        let index = LabelIndex::build(&corpus);

        // corpus iterates a.txt, b.txt, c.txt
        assert_eq!(index.index_of("News"), Some(0));
        assert_eq!(index.index_of("Sports"), Some(1));
        assert_eq!(index.index_of("Arts"), Some(2));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_label_index_inversion() {
        let corpus = sample_corpus();
        let index = LabelIndex::build(&corpus);

        for name in index.names() {
            let i = index.index_of(name).unwrap();
            assert_eq!(index.name_of(i), Some(name.as_str()));
        }
        // index set is exactly {0..len} with no gaps
        for i in 0..index.len() {
            assert!(index.name_of(i).is_some());
        }
        assert!(index.name_of(index.len()).is_none());
    }

    #[test]
    fn test_label_index_unknown_name() {
        let index = LabelIndex::build(&sample_corpus());
        assert_eq!(index.index_of("Unknown"), None);
    }

    #[test]
    fn test_label_index_save_load() {
        let index = LabelIndex::build(&sample_corpus());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");

        index.save(&path).unwrap();
        let loaded = LabelIndex::load(&path).unwrap();

        assert_eq!(loaded, index);
    }

    #[test]
    fn test_indicator_matrix_get_set() {
        let mut matrix = IndicatorMatrix::zeros(2, 3);
        matrix.set(1, 2, true);

        assert!(matrix.get(1, 2));
        assert!(!matrix.get(0, 2));
        assert_eq!(matrix.row(1), &[false, false, true]);
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn test_indicator_matrix_out_of_range() {
        let matrix = IndicatorMatrix::zeros(2, 3);
        let _ = matrix.get(2, 0);
    }

    #[test]
    fn test_build_rows_parallel_to_texts() {
        let corpus = sample_corpus();
        let index = LabelIndex::build(&corpus);
        let dataset = DatasetBuilder::new().build(&corpus, &index);

        assert_eq!(dataset.texts.len(), 3);
        assert_eq!(dataset.indicator.rows(), 3);
        assert_eq!(dataset.indicator.cols(), 3);

        // a.txt: News only
        assert_eq!(dataset.texts[0], "alpha body");
        assert_eq!(dataset.indicator.row(0), &[true, false, false]);
        // b.txt: Sports + News
        assert_eq!(dataset.texts[1], "beta body");
        assert_eq!(dataset.indicator.row(1), &[true, true, false]);
        // c.txt: Arts only
        assert_eq!(dataset.indicator.row(2), &[false, false, true]);
    }

    #[test]
    fn test_build_randomize_preserves_pairs() {
        let corpus = sample_corpus();
        let index = LabelIndex::build(&corpus);

        let plain = DatasetBuilder::new().build(&corpus, &index);
        let shuffled = DatasetBuilder::new().randomize(true).seed(7).build(&corpus, &index);

        let pair_set = |set: &TrainingSet| {
            let mut pairs: Vec<(String, Vec<bool>)> = set
                .texts
                .iter()
                .enumerate()
                .map(|(i, t)| (t.clone(), set.indicator.row(i).to_vec()))
                .collect();
            pairs.sort();
            pairs
        };

        assert_eq!(pair_set(&plain), pair_set(&shuffled));
    }

    #[test]
    fn test_build_randomize_deterministic_per_seed() {
        let corpus = sample_corpus();
        let index = LabelIndex::build(&corpus);

        let first = DatasetBuilder::new().randomize(true).seed(9).build(&corpus, &index);
        let second = DatasetBuilder::new().randomize(true).seed(9).build(&corpus, &index);

        assert_eq!(first.texts, second.texts);
        assert_eq!(first.indicator, second.indicator);
    }

    #[test]
    fn test_slice_inner_outer_lengths() {
        let texts: Vec<String> = (0..10).map(|i| format!("doc {i}")).collect();
        let mut indicator = IndicatorMatrix::zeros(10, 2);
        for i in 0..10 {
            indicator.set(i, i % 2, true);
        }

        let split = slice(&texts, &indicator, 2, 5).unwrap();

        assert_eq!(split.inner_texts.len(), 3);
        assert_eq!(split.inner_indicator.rows(), 3);
        assert_eq!(split.outer_texts.len(), 7);
        assert_eq!(split.outer_indicator.rows(), 7);

        // inner is [2, 5), outer keeps relative order
        assert_eq!(split.inner_texts[0], "doc 2");
        assert_eq!(split.outer_texts[0], "doc 0");
        assert_eq!(split.outer_texts[2], "doc 5");

        // inner ∪ outer equals the original multiset
        let mut all: Vec<String> = split
            .inner_texts
            .iter()
            .chain(split.outer_texts.iter())
            .cloned()
            .collect();
        all.sort();
        let mut expected = texts.clone();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_slice_rows_follow_texts() {
        let texts: Vec<String> = (0..4).map(|i| format!("doc {i}")).collect();
        let mut indicator = IndicatorMatrix::zeros(4, 4);
        for i in 0..4 {
            indicator.set(i, i, true);
        }

        let split = slice(&texts, &indicator, 1, 3).unwrap();

        assert_eq!(split.inner_texts, vec!["doc 1", "doc 2"]);
        assert!(split.inner_indicator.get(0, 1));
        assert!(split.inner_indicator.get(1, 2));
        assert!(split.outer_indicator.get(0, 0));
        assert!(split.outer_indicator.get(1, 3));
    }

    #[test]
    fn test_slice_start_after_end_is_error() {
        let texts: Vec<String> = (0..4).map(|i| format!("doc {i}")).collect();
        let indicator = IndicatorMatrix::zeros(4, 1);

        let err = slice(&texts, &indicator, 3, 2).unwrap_err();

        assert!(matches!(err, Error::SliceRange { start: 3, end: 2, len: 4 }));
    }

    #[test]
    fn test_slice_end_past_length_is_error() {
        let texts: Vec<String> = (0..4).map(|i| format!("doc {i}")).collect();
        let indicator = IndicatorMatrix::zeros(4, 1);

        let err = slice(&texts, &indicator, 0, 5).unwrap_err();

        assert!(matches!(err, Error::SliceRange { .. }));
    }

    #[test]
    fn test_slice_mismatched_rows_is_error() {
        let texts: Vec<String> = (0..4).map(|i| format!("doc {i}")).collect();
        let indicator = IndicatorMatrix::zeros(3, 1);

        let err = slice(&texts, &indicator, 0, 2).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { left: 4, right: 3 }));
    }

    #[test]
    fn test_slice_full_range() {
        let texts: Vec<String> = (0..4).map(|i| format!("doc {i}")).collect();
        let indicator = IndicatorMatrix::zeros(4, 1);

        let split = slice(&texts, &indicator, 0, 4).unwrap();

        assert_eq!(split.inner_texts.len(), 4);
        assert!(split.outer_texts.is_empty());
        assert_eq!(split.outer_indicator.rows(), 0);
    }

    #[test]
    fn test_to_prediction_set_parallel_lists() {
        let corpus = sample_corpus();
        let (texts, ids) = to_prediction_set(&corpus);

        assert_eq!(texts.len(), 3);
        assert_eq!(ids, vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(texts[1], "beta body");
    }
}
