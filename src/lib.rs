//! Clasificar - Multi-Label News Article Classification
//!
//! Clasificar assigns zero or more editorial categories to free-text news
//! articles, learned from a hand-labeled training corpus stored in a simple
//! on-disk format. It covers the full training loop: corpus ingestion,
//! dataset construction, TF-IDF vectorization with one-vs-rest linear
//! classifiers, and k-fold cross-validation with multi-label metrics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLASIFICAR CORE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Corpus     →   Dataset     →   Pipeline    →   Evaluation  │
//! │  Codec          Builder         (fit/predict)   Harness     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use clasificar::corpus::{Corpus, DocumentCodec, LabeledDocument};
//! use clasificar::data::{DatasetBuilder, LabelIndex};
//! use clasificar::ml::ClassifierPipeline;
//!
//! let codec = DocumentCodec::new();
//! let raw = "---classification-training-metadata---\n\
//!            category: Sports\n\
//!            ---classification-training-metadata---\n\
//!            The home team won the championship game.\n";
//! let doc = codec.parse("2024/03/game.txt", raw).unwrap();
//! assert_eq!(doc.categories, vec!["Sports"]);
//!
//! let mut corpus = Corpus::new();
//! corpus.insert(doc);
//!
//! let index = LabelIndex::build(&corpus);
//! let dataset = DatasetBuilder::new().build(&corpus, &index);
//!
//! let mut pipeline = ClassifierPipeline::new();
//! pipeline.fit(&dataset.texts, &dataset.indicator).unwrap();
//! let scores = pipeline.predict(&dataset.texts).unwrap();
//! assert_eq!(scores.rows(), 1);
//! ```
//!
//! # Modules
//!
//! - [`corpus`] - Training-document format codec and corpus loading
//! - [`data`] - Label index, indicator matrix, dataset builder, slicing
//! - [`ml`] - TF-IDF vectorizer and one-vs-rest classification pipeline
//! - [`eval`] - K-fold cross-validation and multi-label confusion metrics

#![forbid(unsafe_code)]

pub mod corpus;
pub mod data;
pub mod error;
pub mod eval;
pub mod ml;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::corpus::{Corpus, DocumentCodec, LabeledDocument, LoadReport, StopList};
    pub use crate::data::{
        slice, to_prediction_set, DatasetBuilder, IndicatorMatrix, LabelIndex, TrainingSet,
    };
    pub use crate::eval::{EvaluationReport, KFoldEvaluator, MultiLabelConfusion};
    pub use crate::ml::{decode, ClassifierPipeline, PipelineConfig, ScoreMatrix};
    pub use crate::{Error, Result};
}
