//! Vectorizer configuration management.
//!
//! This module provides unified configuration for a vectorization run, with
//! serialization support so a training run and its evaluation run can share
//! one reviewed file.
//!
//! # Features
//!
//! - **Unified Configuration**: Window geometry, vocabulary, paths, encoding
//! - **Serialization**: Save/load configurations to TOML or JSON
//! - **Validation**: Ensure configurations are valid before use
//!
//! # Example
//!
//! ```ignore
//! use conll_vectorizer::config::VectorizerConfig;
//!
//! let config = VectorizerConfig::load_toml("configs/conll2003_train.toml")?;
//! let summary = Vectorizer::from_config(config)?.run()?;
//! ```
//!
//! A matching evaluation config points `prior_manifest` at the training
//! manifest:
//!
//! ```toml
//! encoding = "text"
//!
//! [window]
//! context = 2
//! embedding_dim = 50
//!
//! [vocabulary]
//! unknown_token = "unknown"
//! preregistered_labels = ["O"]
//! token_column = 0
//! label_column = 3
//!
//! [paths]
//! embeddings = "data/glove.6B.50d.txt"
//! corpus = "data/eng.testa.txt"
//! output = "data/vectorized_testa.txt"
//! manifest = "data/meta_testa.json"
//! prior_manifest = "data/meta.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::corpus::ColumnLayout;
use crate::export::OutputEncoding;
use crate::window::WindowConfig;

/// Unified vectorizer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VectorizerConfig {
    /// Output encoding of the feature file
    #[serde(default)]
    pub encoding: OutputEncoding,

    /// Window geometry
    pub window: WindowConfig,

    /// Vocabulary and corpus layout
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    /// Input and output locations
    pub paths: PathConfig,
}

/// Vocabulary and corpus column configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VocabularyConfig {
    /// Embedding row used for unknown tokens and padding
    #[serde(default = "default_unknown_token")]
    pub unknown_token: String,

    /// Labels registered before the corpus is read, in order
    ///
    /// On a fresh index the first one gets code 0. Empty disables
    /// pre-registration.
    #[serde(default = "default_preregistered_labels")]
    pub preregistered_labels: Vec<String>,

    /// Corpus column holding the surface token
    #[serde(default)]
    pub token_column: usize,

    /// Corpus column holding the label
    #[serde(default = "default_label_column")]
    pub label_column: usize,
}

fn default_unknown_token() -> String {
    "unknown".to_string()
}

fn default_preregistered_labels() -> Vec<String> {
    vec!["O".to_string()]
}

fn default_label_column() -> usize {
    3
}

/// Input and output paths.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PathConfig {
    /// Embedding table (GloVe text format)
    pub embeddings: PathBuf,

    /// Tagged corpus
    pub corpus: PathBuf,

    /// Feature output file
    pub output: PathBuf,

    /// Manifest written at the end of the run
    pub manifest: PathBuf,

    /// Manifest of an earlier run whose labels seed this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_manifest: Option<PathBuf>,

    /// Directory for NumPy export (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npy_dir: Option<PathBuf>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            unknown_token: default_unknown_token(),
            preregistered_labels: default_preregistered_labels(),
            token_column: 0,
            label_column: default_label_column(),
        }
    }
}

impl PathConfig {
    /// Create a path configuration without a prior manifest.
    pub fn new<P1, P2, P3, P4>(embeddings: P1, corpus: P2, output: P3, manifest: P4) -> Self
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
        P3: AsRef<Path>,
        P4: AsRef<Path>,
    {
        Self {
            embeddings: embeddings.as_ref().to_path_buf(),
            corpus: corpus.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            manifest: manifest.as_ref().to_path_buf(),
            prior_manifest: None,
            npy_dir: None,
        }
    }

    /// Seed labels from an earlier run's manifest.
    pub fn with_prior_manifest<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.prior_manifest = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the NumPy export directory.
    pub fn with_npy_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.npy_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Validate that all required paths are set.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("embeddings", &self.embeddings),
            ("corpus", &self.corpus),
            ("output", &self.output),
            ("manifest", &self.manifest),
        ];
        for (name, path) in required {
            if path.as_os_str().is_empty() {
                return Err(format!("paths.{name} must be set"));
            }
        }

        if self.output == self.manifest {
            return Err(format!(
                "paths.output and paths.manifest must differ ({})",
                self.output.display()
            ));
        }

        if self.output == self.corpus
            || self.output == self.embeddings
            || self.prior_manifest.as_ref() == Some(&self.output)
        {
            return Err(format!(
                "paths.output ({}) would overwrite an input",
                self.output.display()
            ));
        }

        Ok(())
    }
}

impl VocabularyConfig {
    /// Validate vocabulary configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.unknown_token.trim().is_empty() {
            return Err("unknown_token cannot be empty".to_string());
        }

        if self.unknown_token.contains(char::is_whitespace) {
            return Err(format!(
                "unknown_token '{}' cannot contain whitespace",
                self.unknown_token
            ));
        }

        for label in &self.preregistered_labels {
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(format!(
                    "preregistered label '{label}' must be non-empty without whitespace"
                ));
            }
        }

        if self.token_column == self.label_column {
            return Err(format!(
                "token_column and label_column must differ (both {})",
                self.token_column
            ));
        }

        Ok(())
    }

    /// Corpus column layout.
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.token_column, self.label_column)
    }
}

impl VectorizerConfig {
    /// Create a configuration with default vocabulary settings.
    pub fn new(window: WindowConfig, paths: PathConfig) -> Self {
        Self {
            encoding: OutputEncoding::default(),
            window,
            vocabulary: VocabularyConfig::default(),
            paths,
        }
    }

    /// Set the output encoding.
    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set vocabulary configuration.
    pub fn with_vocabulary(mut self, vocabulary: VocabularyConfig) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set the context half-width `C`.
    pub fn with_context(mut self, context: usize) -> Self {
        self.window.context = context;
        self
    }

    /// Validate the configuration.
    ///
    /// Returns Ok(()) if valid, Err(msg) otherwise.
    pub fn validate(&self) -> Result<(), String> {
        self.window.validate()?;
        self.vocabulary.validate()?;
        self.paths.validate()?;
        Ok(())
    }

    /// Save configuration to TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: VectorizerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: VectorizerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
