//! TF-IDF text vectorization
//!
//! Turns raw article bodies into sparse TF-IDF feature rows. Tokens are
//! lowercased alphanumeric runs; features are word n-grams joined with `_`
//! (unigrams through 5-grams by default). IDF uses the smoothed form
//! `ln((1 + N) / (1 + df)) + 1` and every row is L2-normalized.
//!
//! The fitted vocabulary is fixed at `fit` time: `transform` ignores
//! out-of-vocabulary n-grams and never grows the vocabulary.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A sparse feature row: (column, weight) pairs sorted by column.
pub type SparseRow = Vec<(usize, f32)>;

/// TF-IDF vectorizer over word n-grams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
    lowercase: bool,
    n_documents: usize,
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer over unigrams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            ngram_range: (1, 1),
            lowercase: true,
            n_documents: 0,
        }
    }

    /// Set the n-gram range, e.g. `(1, 5)` for unigrams through 5-grams.
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    /// Set whether tokens are lowercased.
    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Whether `fit` has been called.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.n_documents > 0
    }

    /// Number of features in the fitted vocabulary.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Split text into word tokens: maximal alphanumeric runs.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let source = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        source
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// All n-gram terms of a document within the configured range.
    fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let mut terms = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            for window in tokens.windows(n) {
                terms.push(window.join("_"));
            }
        }
        terms
    }

    /// Learn the vocabulary and IDF weights from the documents.
    ///
    /// Replaces any previously fitted state. Vocabulary indices are assigned
    /// over lexicographically sorted terms, so the same documents always
    /// produce the same vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTrainingSet`] if `documents` is empty.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let mut seen = HashSet::new();
            for term in self.terms(document) {
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut terms: Vec<(String, usize)> = doc_freq.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = documents.len() as f32;
        self.vocabulary = HashMap::with_capacity(terms.len());
        self.idf = Vec::with_capacity(terms.len());
        for (column, (term, df)) in terms.into_iter().enumerate() {
            self.vocabulary.insert(term, column);
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f32)).ln() + 1.0);
        }
        self.n_documents = documents.len();

        Ok(())
    }

    /// Transform documents into L2-normalized sparse TF-IDF rows.
    ///
    /// Out-of-vocabulary terms are ignored, never added. A document with no
    /// known terms yields an empty row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnfittedModel`] if `fit` has not run.
    pub fn transform(&self, documents: &[String]) -> Result<Vec<SparseRow>> {
        if !self.is_fitted() {
            return Err(Error::UnfittedModel("vectorizer"));
        }

        let mut rows = Vec::with_capacity(documents.len());
        for document in documents {
            let mut counts: HashMap<usize, f32> = HashMap::new();
            for term in self.terms(document) {
                if let Some(&column) = self.vocabulary.get(&term) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }

            let mut row: SparseRow = counts
                .into_iter()
                .map(|(column, tf)| (column, tf * self.idf[column]))
                .collect();
            row.sort_by_key(|&(column, _)| column);

            let norm = row.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for (_, weight) in &mut row {
                    *weight /= norm;
                }
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// Fit on the documents, then transform them.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseRow>> {
        self.fit(documents)?;
        self.transform(documents)
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&texts(&["hello world", "hello rust"])).unwrap();

        assert_eq!(vectorizer.vocabulary_size(), 3);
        assert!(vectorizer.is_fitted());
    }

    #[test]
    fn test_tokenize_lowercases_and_splits_punctuation() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer
            .fit(&texts(&["The team won, 3-0. THE TEAM!"]))
            .unwrap();

        // "the", "team", "won", "3", "0"
        assert_eq!(vectorizer.vocabulary_size(), 5);
    }

    #[test]
    fn test_ngram_terms() {
        let vectorizer = TfidfVectorizer::new().with_ngram_range(1, 2);
        let terms = vectorizer.terms("a b c");

        assert_eq!(terms, vec!["a", "b", "c", "a_b", "b_c"]);
    }

    #[test]
    fn test_ngram_range_clamps_to_at_least_one() {
        let vectorizer = TfidfVectorizer::new().with_ngram_range(0, 0);
        let terms = vectorizer.terms("a b");

        assert_eq!(terms, vec!["a", "b"]);
    }

    #[test]
    fn test_transform_before_fit_is_error() {
        let vectorizer = TfidfVectorizer::new();
        let err = vectorizer.transform(&texts(&["hello"])).unwrap_err();

        assert!(matches!(err, crate::Error::UnfittedModel("vectorizer")));
    }

    #[test]
    fn test_fit_on_empty_collection_is_error() {
        let mut vectorizer = TfidfVectorizer::new();
        let err = vectorizer.fit(&[]).unwrap_err();

        assert!(matches!(err, crate::Error::EmptyTrainingSet));
    }

    #[test]
    fn test_transform_ignores_out_of_vocabulary() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&texts(&["alpha beta"])).unwrap();

        let rows = vectorizer.transform(&texts(&["alpha gamma delta"])).unwrap();

        // only "alpha" is known
        assert_eq!(rows[0].len(), 1);
        assert_eq!(vectorizer.vocabulary_size(), 2);
    }

    #[test]
    fn test_transform_unknown_document_is_empty_row() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&texts(&["alpha beta"])).unwrap();

        let rows = vectorizer.transform(&texts(&["gamma delta"])).unwrap();

        assert!(rows[0].is_empty());
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let mut vectorizer = TfidfVectorizer::new();
        let rows = vectorizer
            .fit_transform(&texts(&["cat dog bird", "cat cat fish"]))
            .unwrap();

        for row in &rows {
            let norm: f32 = row.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
        }
    }

    #[test]
    fn test_idf_downweights_common_terms() {
        let mut vectorizer = TfidfVectorizer::new();
        let rows = vectorizer
            .fit_transform(&texts(&["shared rare", "shared other", "shared third"]))
            .unwrap();

        // in row 0, "rare" (df=1) must outweigh "shared" (df=3)
        let shared_col = vectorizer.vocabulary["shared"];
        let rare_col = vectorizer.vocabulary["rare"];
        let weight = |row: &SparseRow, col: usize| {
            row.iter().find(|&&(c, _)| c == col).map_or(0.0, |&(_, w)| w)
        };

        assert!(weight(&rows[0], rare_col) > weight(&rows[0], shared_col));
    }

    #[test]
    fn test_vocabulary_is_deterministic() {
        let docs = texts(&["b a", "c a"]);

        let mut first = TfidfVectorizer::new();
        first.fit(&docs).unwrap();
        let mut second = TfidfVectorizer::new();
        second.fit(&docs).unwrap();

        assert_eq!(first.vocabulary, second.vocabulary);
        // sorted terms: a < b < c
        assert_eq!(first.vocabulary["a"], 0);
        assert_eq!(first.vocabulary["b"], 1);
        assert_eq!(first.vocabulary["c"], 2);
    }

    #[test]
    fn test_refit_replaces_vocabulary() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&texts(&["alpha beta gamma"])).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);

        vectorizer.fit(&texts(&["delta"])).unwrap();

        assert_eq!(vectorizer.vocabulary_size(), 1);
        assert!(vectorizer.vocabulary.contains_key("delta"));
        assert!(!vectorizer.vocabulary.contains_key("alpha"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut vectorizer = TfidfVectorizer::new().with_ngram_range(1, 3);
        vectorizer.fit(&texts(&["one two three"])).unwrap();

        let json = serde_json::to_string(&vectorizer).unwrap();
        let loaded: TfidfVectorizer = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.vocabulary, vectorizer.vocabulary);
        let rows = loaded.transform(&texts(&["one two"])).unwrap();
        assert!(!rows[0].is_empty());
    }
}
