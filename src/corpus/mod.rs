//! Training corpus model
//!
//! This module defines the in-memory representation of a labeled training
//! corpus:
//!
//! - [`LabeledDocument`] - one article with its category labels and body
//! - [`Corpus`] - identifier-keyed document collection with deterministic
//!   iteration order
//! - [`StopList`] - placement labels that never count as topical categories
//! - [`LoadReport`] - diagnostics accumulated while loading a corpus tree
//!
//! The on-disk format and the scanner live in [`codec`].

pub mod codec;

pub use codec::DocumentCodec;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Marker line delimiting the metadata block of a training document.
///
/// The marker must appear exactly twice: once to open the block and once to
/// close it. Everything between the markers is metadata; everything outside
/// is article body.
pub const METADATA_MARKER: &str = "---classification-training-metadata---";

/// A single training article: identifier, category labels, body text.
///
/// Immutable once produced by the codec. Duplicate category names may occur
/// in source files; consumers treat the list as a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDocument {
    /// Corpus-relative path or filename, unique within a corpus
    pub id: String,
    /// Category names in source order
    pub categories: Vec<String>,
    /// Article body text, may be empty
    pub body: String,
}

impl LabeledDocument {
    /// Category labels as a set, collapsing duplicates.
    #[must_use]
    pub fn category_set(&self) -> HashSet<&str> {
        self.categories.iter().map(String::as_str).collect()
    }
}

/// A collection of labeled documents keyed by identifier.
///
/// Backed by a `BTreeMap` so iteration is always ordered by identifier,
/// which makes label-index assignment and dataset construction reproducible
/// without caller-side sorting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    documents: BTreeMap<String, LabeledDocument>,
}

impl Corpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, keyed by its identifier.
    ///
    /// Returns the previous document with the same identifier, if any.
    pub fn insert(&mut self, document: LabeledDocument) -> Option<LabeledDocument> {
        self.documents.insert(document.id.clone(), document)
    }

    /// Look up a document by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LabeledDocument> {
        self.documents.get(id)
    }

    /// Number of documents in the corpus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate documents in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &LabeledDocument> {
        self.documents.values()
    }

    /// Iterate document identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

impl FromIterator<LabeledDocument> for Corpus {
    fn from_iter<I: IntoIterator<Item = LabeledDocument>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for document in iter {
            corpus.insert(document);
        }
        corpus
    }
}

/// Labels that mark page placement rather than topic.
///
/// These appear in source metadata blocks but are filtered out during
/// parsing because they carry no editorial meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopList {
    labels: HashSet<String>,
}

impl StopList {
    /// Placement labels used by the original news site.
    const DEFAULT_LABELS: [&'static str; 3] = ["Regular News", "Secondary Story", "Home Page"];

    /// Create a stop list from explicit labels.
    #[must_use]
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// An empty stop list that filters nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            labels: HashSet::new(),
        }
    }

    /// Whether a label is on the stop list.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

impl Default for StopList {
    fn default() -> Self {
        Self::new(&Self::DEFAULT_LABELS)
    }
}

/// Diagnostics accumulated while loading a corpus directory.
///
/// Returned alongside the corpus so callers can always report how many
/// documents were dropped; nothing here lives in process-wide state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Documents retained for training
    pub retained: usize,
    /// Documents dropped because no categories survived stop-list filtering
    pub skipped_no_categories: usize,
    /// Identifiers of documents rejected as malformed
    pub malformed: Vec<String>,
}

impl LoadReport {
    /// Total documents excluded from the corpus.
    #[must_use]
    pub fn total_dropped(&self) -> usize {
        self.skipped_no_categories + self.malformed.len()
    }
}
