//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types for ergonomic usage
//! of the vectorizer library.
//!
//! # Usage
//!
//! ```ignore
//! use conll_vectorizer::prelude::*;
//!
//! let config = VectorizerConfig::load_toml("configs/train.toml")?;
//! let summary = Vectorizer::from_config(config)?.run()?;
//! ```
//!
//! # What's Included
//!
//! ## Pipeline
//! - [`Vectorizer`] - End-to-end run
//! - [`VectorizerConfig`], [`PathConfig`], [`VocabularyConfig`] - Configuration
//! - [`VectorizeSummary`], [`StreamStats`] - Run results
//!
//! ## Core
//! - [`EmbeddingTable`] - Word embedding lookup
//! - [`LabelIndex`] - Label ↔ code mapping
//! - [`SequenceWindower`], [`WindowConfig`], [`FeatureRecord`] - Context windows
//!
//! ## Export
//! - [`RecordWriter`], [`RecordReader`], [`OutputEncoding`] - Feature files
//! - [`Manifest`] - Run manifest
//! - [`NpyExporter`], [`NpyLayout`] - NumPy export

pub use crate::config::{PathConfig, VectorizerConfig, VocabularyConfig};
pub use crate::embedding::EmbeddingTable;
pub use crate::error::{Result, VectorizerError};
pub use crate::export::{
    Manifest, NpyExporter, NpyLayout, OutputEncoding, RecordReader, RecordWriter,
};
pub use crate::labels::LabelIndex;
pub use crate::pipeline::{StreamStats, VectorizeSummary, Vectorizer};
pub use crate::window::{FeatureRecord, SequenceWindower, WindowConfig};
