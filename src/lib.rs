//! CoNLL Vectorizer
//!
//! Windowed word-embedding feature vectors from CoNLL-style tagged corpora.
//!
//! # Overview
//!
//! Each token of a `token POS chunk label` corpus becomes one training
//! record: the integer code of its label and the concatenated embeddings of
//! the `2C+1` tokens centered on it. Windows at the start and end of the
//! corpus are padded with the unknown-token embedding. A JSON manifest
//! records the geometry and the label mapping so that later runs (e.g. on a
//! validation split) number labels identically.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        CoNLL Vectorizer                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  embedding/  - Token → vector lookup with unknown-token default  │
//! │  labels/     - Label ↔ code index, seedable from a manifest      │
//! │  corpus/     - Token/label columns from CoNLL lines              │
//! │  window/     - Streaming 2C+1 context windows with padding       │
//! │  export/     - Text/binary records, manifest, NumPy export       │
//! │  pipeline/   - End-to-end run                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use conll_vectorizer::prelude::*;
//!
//! let config = VectorizerConfig::new(
//!     WindowConfig::new(2, 50),
//!     PathConfig::new("glove.6B.50d.txt", "eng.train.txt", "vectorized.txt", "meta.json"),
//! );
//! let summary = Vectorizer::from_config(config)?.run()?;
//! ```

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod export;
pub mod labels;
pub mod pipeline;
pub mod prelude;
pub mod window;

// Re-exports - Errors
pub use error::{Result, VectorizerError};

// Re-exports - Config
pub use config::{PathConfig, VectorizerConfig, VocabularyConfig};

// Re-exports - Core
pub use corpus::{ColumnLayout, CorpusReader, CorpusToken};
pub use embedding::{EmbeddingTable, EmbeddingVec};
pub use labels::{LabelCode, LabelIndex};
pub use window::{FeatureRecord, SequenceWindower, WindowConfig};

// Re-exports - Export
pub use export::{
    read_records, Manifest, NpyExportResult, NpyExporter, NpyLayout, OutputEncoding,
    RecordReader, RecordWriter,
};

// Re-exports - Pipeline
pub use pipeline::{StreamStats, VectorizeSummary, Vectorizer};
