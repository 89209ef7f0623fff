//! End-to-end vectorization run.
//!
//! Connects the components in dependency order:
//!
//! ```text
//! corpus lines → CorpusReader → (token, label)
//!                                  │        │
//!                     EmbeddingTable.lookup  LabelIndex.get_or_create
//!                                  ↓        ↓
//!                          SequenceWindower.push / drain
//!                                        ↓
//!                              RecordWriter (text | binary)
//!                                        ↓
//!                          Manifest (after the stream ends)
//! ```
//!
//! The embedding table and label index are built once. The corpus is
//! streamed, so memory stays at the table plus one window regardless of
//! corpus size. The manifest is only written after the feature file is
//! complete and closed; a run that fails part-way leaves a feature file
//! without a manifest, which downstream code must treat as invalid.
//!
//! # Example
//!
//! ```ignore
//! use conll_vectorizer::prelude::*;
//!
//! let config = VectorizerConfig::load_toml("configs/train.toml")?;
//! let summary = Vectorizer::from_config(config)?.run()?;
//! println!("{} records, {} labels", summary.stats.records, summary.manifest.nlabels);
//! ```

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::VectorizerConfig;
use crate::corpus::CorpusReader;
use crate::embedding::EmbeddingTable;
use crate::error::{Result, VectorizerError};
use crate::export::{Manifest, NpyExportResult, NpyExporter, RecordWriter};
use crate::labels::LabelIndex;
use crate::window::SequenceWindower;

/// Counters for one pass over a corpus stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Token lines read
    pub tokens: usize,

    /// Records handed to the writer
    pub records: usize,

    /// Blank lines skipped
    pub blank_lines: usize,

    /// Tokens without their own embedding
    pub oov_tokens: usize,
}

impl StreamStats {
    /// Share of tokens that fell back to the unknown-token vector.
    pub fn oov_rate(&self) -> f64 {
        if self.tokens == 0 {
            return 0.0;
        }
        self.oov_tokens as f64 / self.tokens as f64
    }
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct VectorizeSummary {
    /// Stream counters
    pub stats: StreamStats,

    /// Labels taken over from the prior manifest
    pub labels_seeded: usize,

    /// Labels first assigned during this run (pre-registered ones included)
    pub labels_created: usize,

    /// Manifest as written
    pub manifest: Manifest,

    /// NumPy export, when configured
    pub npy: Option<NpyExportResult>,

    /// Wall time of the run, table loading excluded
    pub elapsed: Duration,
}

/// A configured vectorization run.
///
/// Owns the embedding table and the label index for the duration of the
/// run. The label index is only ever extended.
pub struct Vectorizer {
    config: VectorizerConfig,
    embeddings: EmbeddingTable,
    labels: LabelIndex,
    labels_seeded: usize,
}

impl Vectorizer {
    /// Validate `config`, load the embedding table and build the label index.
    ///
    /// When `paths.prior_manifest` is set the index is seeded from it.
    pub fn from_config(config: VectorizerConfig) -> Result<Self> {
        config.validate().map_err(VectorizerError::Config)?;

        let embeddings = EmbeddingTable::load(
            &config.paths.embeddings,
            config.window.embedding_dim,
            &config.vocabulary.unknown_token,
        )?;

        let labels = match &config.paths.prior_manifest {
            Some(path) => seed_labels(path, &config)?,
            None => LabelIndex::new(),
        };

        Self::new(config, embeddings, labels)
    }

    /// Assemble a run from already loaded parts.
    ///
    /// Pre-registered labels are added to `labels` here.
    pub fn new(
        config: VectorizerConfig,
        embeddings: EmbeddingTable,
        mut labels: LabelIndex,
    ) -> Result<Self> {
        config.validate().map_err(VectorizerError::Config)?;
        if embeddings.dim() != config.window.embedding_dim {
            return Err(VectorizerError::DimensionMismatch {
                expected: config.window.embedding_dim,
                actual: embeddings.dim(),
            });
        }

        let labels_seeded = labels.len();
        for label in &config.vocabulary.preregistered_labels {
            labels.get_or_create(label)?;
        }

        Ok(Self {
            config,
            embeddings,
            labels,
            labels_seeded,
        })
    }

    /// Vectorize one corpus stream into `writer`.
    ///
    /// Emits exactly one record per token line, in input order. The writer
    /// is left open.
    pub fn vectorize_stream<R: BufRead, W: Write>(
        &mut self,
        corpus: R,
        source: &Path,
        writer: &mut RecordWriter<W>,
    ) -> Result<StreamStats> {
        let mut reader = CorpusReader::new(corpus, source, self.config.vocabulary.layout());
        let mut windower =
            SequenceWindower::new(self.config.window, self.embeddings.default_vector())?;
        let mut stats = StreamStats::default();

        for token in reader.by_ref() {
            let token = token?;

            let vector = match self.embeddings.get(&token.token) {
                Some(vector) => vector,
                None => {
                    stats.oov_tokens += 1;
                    self.embeddings.default_vector()
                }
            };
            let code = self.labels.get_or_create(&token.label)?;
            stats.tokens += 1;

            if let Some(record) = windower.push(vector, code)? {
                writer.write_record(&record)?;
                stats.records += 1;
            }
        }

        while let Some(record) = windower.drain_next()? {
            writer.write_record(&record)?;
            stats.records += 1;
        }

        stats.blank_lines = reader.blank_lines();
        Ok(stats)
    }

    /// Run the configured corpus end to end.
    ///
    /// Writes the feature file, then the manifest, then (if configured) the
    /// NumPy export.
    pub fn run(&mut self) -> Result<VectorizeSummary> {
        let start = Instant::now();
        let paths = self.config.paths.clone();
        let encoding = self.config.encoding;
        let labels_before = self.labels.len();

        log::info!(
            "Vectorizing {} (context {}, dim {}, {} encoding)",
            paths.corpus.display(),
            self.config.window.context,
            self.config.window.embedding_dim,
            encoding
        );

        let corpus = std::fs::File::open(&paths.corpus)
            .map_err(|e| VectorizerError::io(&paths.corpus, e))?;
        let mut writer = RecordWriter::create(&paths.output, encoding)?;
        let stats = self.vectorize_stream(
            std::io::BufReader::new(corpus),
            &paths.corpus,
            &mut writer,
        )?;
        writer.close()?;

        let manifest = self.manifest(stats.records).stamped();
        manifest.save(&paths.manifest)?;

        let npy = match &paths.npy_dir {
            Some(dir) => Some(NpyExporter::new(dir).export(&paths.output, &manifest, encoding)?),
            None => None,
        };

        let summary = VectorizeSummary {
            stats,
            labels_seeded: self.labels_seeded,
            labels_created: self.labels.len() - self.labels_seeded,
            manifest,
            npy,
            elapsed: start.elapsed(),
        };

        log::info!(
            "Wrote {} records to {} ({} blank lines skipped, {:.2}% out of vocabulary)",
            stats.records,
            paths.output.display(),
            stats.blank_lines,
            stats.oov_rate() * 100.0
        );
        log::info!(
            "Labels: {} total, {} new this run; manifest {}",
            self.labels.len(),
            self.labels.len() - labels_before,
            paths.manifest.display()
        );

        Ok(summary)
    }

    /// Manifest describing the current state, as `run()` writes it minus
    /// the timestamp.
    pub fn manifest(&self, n_records: usize) -> Manifest {
        Manifest::new(&self.config.window, &self.labels)
            .with_records(n_records)
            .with_encoding(self.config.encoding)
            .with_unknown_token(self.embeddings.unknown_token())
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    /// Hand back the label index, e.g. to seed another run in-process.
    pub fn into_labels(self) -> LabelIndex {
        self.labels
    }
}

fn seed_labels(path: &Path, config: &VectorizerConfig) -> Result<LabelIndex> {
    let prior = Manifest::load(path)?;
    if prior.embedding_dim != config.window.embedding_dim
        || prior.context != config.window.window_width()
    {
        log::warn!(
            "Prior manifest {} describes {}×{} windows, this run produces {}×{}",
            path.display(),
            prior.context,
            prior.embedding_dim,
            config.window.window_width(),
            config.window.embedding_dim
        );
    }

    let labels = prior.label_index()?;
    log::info!(
        "Seeded {} labels from {}",
        labels.len(),
        path.display()
    );
    Ok(labels)
}
