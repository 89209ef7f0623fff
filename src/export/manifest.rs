//! Run manifest: feature geometry and the final label mapping.
//!
//! The manifest is written after the feature file is complete. It is the
//! only artifact a later run needs to number labels identically, so an
//! evaluation pass is typically started with the training manifest as its
//! prior manifest.
//!
//! ```json
//! {
//!   "embedding_dim": 50,
//!   "context": 5,
//!   "nlabels": 3,
//!   "feature_dim": 250,
//!   "labels": { "0": "O", "1": "I-ORG", "2": "I-MISC" },
//!   "context_half_width": 2,
//!   "n_records": 203621,
//!   "encoding": "text",
//!   "unknown_token": "unknown",
//!   "export_timestamp": "2026-10-19T08:15:02+00:00"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};
use crate::export::writer::OutputEncoding;
use crate::labels::{LabelCode, LabelIndex};
use crate::window::WindowConfig;

/// Persisted description of a vectorization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Embedding dimension `D`.
    pub embedding_dim: usize,

    /// Window width `2C+1`.
    pub context: usize,

    /// Number of distinct labels.
    pub nlabels: usize,

    /// Values per record, `context × embedding_dim`.
    pub feature_dim: usize,

    /// Label code → label string.
    pub labels: BTreeMap<LabelCode, String>,

    /// Context half-width `C`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_half_width: Option<usize>,

    /// Records in the feature file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_records: Option<usize>,

    /// Encoding of the feature file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<OutputEncoding>,

    /// Token whose embedding served as padding and out-of-vocabulary vector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_token: Option<String>,

    /// Export timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_timestamp: Option<String>,
}

impl Manifest {
    /// Describe a run from its window geometry and final label index.
    pub fn new(window: &WindowConfig, labels: &LabelIndex) -> Self {
        Self {
            embedding_dim: window.embedding_dim,
            context: window.window_width(),
            nlabels: labels.len(),
            feature_dim: window.feature_dim(),
            labels: labels.inverse(),
            context_half_width: Some(window.context),
            n_records: None,
            encoding: None,
            unknown_token: None,
            export_timestamp: None,
        }
    }

    pub fn with_records(mut self, n_records: usize) -> Self {
        self.n_records = Some(n_records);
        self
    }

    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_unknown_token(mut self, token: &str) -> Self {
        self.unknown_token = Some(token.to_string());
        self
    }

    /// Stamp with the current UTC time.
    pub fn stamped(mut self) -> Self {
        self.export_timestamp = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Check the derived fields against each other.
    ///
    /// Returns Ok(()) if valid, Err(msg) otherwise.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.embedding_dim == 0 {
            return Err("embedding_dim must be > 0".to_string());
        }

        if self.context % 2 == 0 {
            return Err(format!("context ({}) must be odd (2C+1)", self.context));
        }

        if let Some(half) = self.context_half_width {
            let width = half.checked_mul(2).and_then(|w| w.checked_add(1));
            if width != Some(self.context) {
                return Err(format!(
                    "context_half_width ({half}) doesn't match context ({})",
                    self.context
                ));
            }
        }

        let expected = self.context.checked_mul(self.embedding_dim).ok_or_else(|| {
            format!(
                "context × embedding_dim ({} × {}) overflows",
                self.context, self.embedding_dim
            )
        })?;
        if self.feature_dim != expected {
            return Err(format!(
                "feature_dim ({}) must equal context × embedding_dim ({} × {})",
                self.feature_dim, self.context, self.embedding_dim
            ));
        }

        if self.nlabels != self.labels.len() {
            return Err(format!(
                "nlabels ({}) doesn't match the {} entries in labels",
                self.nlabels,
                self.labels.len()
            ));
        }

        Ok(())
    }

    /// Window geometry described by this manifest.
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig::new(self.context / 2, self.embedding_dim)
    }

    /// Rebuild the label index this manifest was written from.
    pub fn label_index(&self) -> Result<LabelIndex> {
        LabelIndex::seed(&self.labels)
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| VectorizerError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| VectorizerError::Manifest {
            path: path.to_path_buf(),
            reason: format!("failed to serialize: {e}"),
        })?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| VectorizerError::io(path, e))?;
        Ok(())
    }

    /// Read and validate a manifest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| VectorizerError::io(path, e))?;
        let manifest: Manifest =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| VectorizerError::Manifest {
                path: path.to_path_buf(),
                reason: format!("failed to parse: {e}"),
            })?;

        manifest
            .validate()
            .map_err(|reason| VectorizerError::Manifest {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(manifest)
    }
}
