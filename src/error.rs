//! Error types for clasificar
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Result type alias for clasificar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during clasificar operations
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus document that violates the metadata format
    #[error("malformed document {id}: {reason}")]
    MalformedDocument {
        /// Corpus-relative document identifier
        id: String,
        /// What the scanner rejected
        reason: String,
    },

    /// Slice bounds that do not fit the dataset
    #[error("slice range [{start}, {end}) out of bounds for length {len}")]
    SliceRange {
        /// Inclusive start of the requested range
        start: usize,
        /// Exclusive end of the requested range
        end: usize,
        /// Number of documents available
        len: usize,
    },

    /// Prediction or transformation requested before training
    #[error("{0} used before fit")]
    UnfittedModel(&'static str),

    /// Parallel collections whose row counts disagree
    #[error("shape mismatch: {left} rows vs {right} rows")]
    ShapeMismatch {
        /// Rows in the first collection
        left: usize,
        /// Rows in the second collection
        right: usize,
    },

    /// Training requested on a dataset with no documents or no categories
    #[error("training set has no documents or no categories")]
    EmptyTrainingSet,

    /// Cross-validation harness misuse
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}
