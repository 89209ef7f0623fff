//! Error types for vectorization runs.
//!
//! Every failure in this crate is fatal to the run that produced it: the
//! inputs are local, deterministic files, so nothing is retried. Variants
//! carry the file, line and field that triggered them so the message alone
//! is enough to locate the bad input.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VectorizerError>;

/// Error type for loading, windowing, encoding and persistence failures.
#[derive(Debug, Error)]
pub enum VectorizerError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "malformed embedding row at {}:{line}: expected {expected} fields (token + dimension), found {found}",
        .path.display()
    )]
    MalformedEmbeddingRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "invalid number at {}:{line}, field {field}: '{value}'",
        .path.display()
    )]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        field: usize,
        value: String,
    },

    #[error("embedding table has no vector for the unknown token '{token}'")]
    MissingDefaultEmbedding { token: String },

    #[error("vector length ({actual}) doesn't match embedding dimension ({expected})")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "malformed corpus line at {}:{line}: need at least {required} fields, found {found}",
        .path.display()
    )]
    MalformedCorpusLine {
        path: PathBuf,
        line: usize,
        required: usize,
        found: usize,
    },

    #[error("window holds {actual} vectors, expected exactly {expected}")]
    WindowSizeMismatch { expected: usize, actual: usize },

    #[error("inconsistent label mapping: {0}")]
    InconsistentLabelMap(String),

    #[error("manifest '{}': {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("record writer is already closed")]
    WriterClosed,

    #[error("truncated record #{record} in '{}'", .path.display())]
    TruncatedRecord { path: PathBuf, record: usize },

    #[error("malformed record at {}:{line}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl VectorizerError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
