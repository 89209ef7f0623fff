//! Pre-trained word embedding lookup.
//!
//! The table is read once from a GloVe-style text file: one token per line,
//! followed by exactly `embedding_dim` floats separated by single spaces.
//!
//! ```text
//! the 0.418 0.24968 -0.41242 ...
//! unknown 0.0 0.0 0.0 ...
//! ```
//!
//! One row must carry the reserved unknown token. Its vector is returned for
//! every token the table does not know and is also used as window padding.
//!
//! # Example
//!
//! ```ignore
//! use conll_vectorizer::embedding::EmbeddingTable;
//!
//! let table = EmbeddingTable::load("glove.6B.50d.txt", 50, "unknown")?;
//! let vector = table.lookup("German");   // looked up as "german"
//! assert_eq!(vector.len(), 50);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::{Result, VectorizerError};

/// Shared embedding vector.
///
/// Windows hold several references to the same vector (padding in
/// particular), so vectors are reference counted rather than cloned.
pub type EmbeddingVec = Arc<Vec<f64>>;

/// Token to vector lookup with a mandatory default vector.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    vectors: AHashMap<String, EmbeddingVec>,
    default_vector: EmbeddingVec,
    unknown_token: String,
    dim: usize,
}

impl EmbeddingTable {
    /// Load an embedding file.
    ///
    /// # Errors
    ///
    /// - [`VectorizerError::Io`] if the file can't be opened or read
    /// - [`VectorizerError::MalformedEmbeddingRow`] if a row has other than `dim + 1` fields
    /// - [`VectorizerError::InvalidNumber`] if a value doesn't parse as a float
    /// - [`VectorizerError::MissingDefaultEmbedding`] if no row carries `unknown_token`
    pub fn load<P: AsRef<Path>>(path: P, dim: usize, unknown_token: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| VectorizerError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path, dim, unknown_token)
    }

    /// Parse an embedding table from any buffered reader.
    ///
    /// `source` only names the input in error messages.
    pub fn from_reader<R: BufRead>(
        reader: R,
        source: impl Into<PathBuf>,
        dim: usize,
        unknown_token: &str,
    ) -> Result<Self> {
        let source = source.into();
        let mut vectors = AHashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| VectorizerError::io(&source, e))?;
            let line_no = idx + 1;
            let row = line.trim_end_matches(['\r', '\n']);

            let (token, vector) = parse_row(row, dim, &source, line_no)?;
            if vectors.insert(token.to_string(), Arc::new(vector)).is_some() {
                log::debug!(
                    "Duplicate embedding for '{}' at {}:{}, keeping the later row",
                    token,
                    source.display(),
                    line_no
                );
            }
        }

        let table = Self::from_map(vectors, dim, unknown_token)?;
        log::info!(
            "Loaded {} embeddings (dim {}) from {}",
            table.len(),
            dim,
            source.display()
        );
        Ok(table)
    }

    /// Build a table from in-memory entries.
    ///
    /// Every vector must have length `dim`.
    pub fn from_entries<I, S>(entries: I, dim: usize, unknown_token: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut vectors = AHashMap::new();
        for (token, vector) in entries {
            if vector.len() != dim {
                return Err(VectorizerError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            vectors.insert(token.into(), Arc::new(vector));
        }
        Self::from_map(vectors, dim, unknown_token)
    }

    fn from_map(
        vectors: AHashMap<String, EmbeddingVec>,
        dim: usize,
        unknown_token: &str,
    ) -> Result<Self> {
        let default_vector = vectors.get(unknown_token).cloned().ok_or_else(|| {
            VectorizerError::MissingDefaultEmbedding {
                token: unknown_token.to_string(),
            }
        })?;

        Ok(Self {
            vectors,
            default_vector,
            unknown_token: unknown_token.to_string(),
            dim,
        })
    }

    /// Look up a surface token.
    ///
    /// The token is trimmed and lowercased first. Unknown tokens resolve to
    /// the default vector.
    pub fn lookup(&self, token: &str) -> EmbeddingVec {
        self.get(token)
            .unwrap_or_else(|| Arc::clone(&self.default_vector))
    }

    /// Look up a surface token, returning `None` when it is out of vocabulary.
    pub fn get(&self, token: &str) -> Option<EmbeddingVec> {
        let key = token.trim().to_lowercase();
        self.vectors.get(&key).cloned()
    }

    /// Whether the (normalized) token has its own vector.
    pub fn contains(&self, token: &str) -> bool {
        self.vectors.contains_key(&token.trim().to_lowercase())
    }

    /// Vector used for unknown tokens and window padding.
    #[inline]
    pub fn default_vector(&self) -> EmbeddingVec {
        Arc::clone(&self.default_vector)
    }

    /// The reserved token whose row is the default vector.
    pub fn unknown_token(&self) -> &str {
        &self.unknown_token
    }

    /// Embedding dimension `D`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows, including the unknown token.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn parse_row<'a>(
    row: &'a str,
    dim: usize,
    source: &Path,
    line: usize,
) -> Result<(&'a str, Vec<f64>)> {
    // Trailing separators are common in exported .vec files and carry no field
    let fields: Vec<&str> = row.trim_end_matches(' ').split(' ').collect();
    if fields.len() != dim + 1 {
        return Err(VectorizerError::MalformedEmbeddingRow {
            path: source.to_path_buf(),
            line,
            expected: dim + 1,
            found: fields.len(),
        });
    }

    let mut vector = Vec::with_capacity(dim);
    for (field, raw) in fields.iter().enumerate().skip(1) {
        let value = raw
            .parse::<f64>()
            .map_err(|_| VectorizerError::InvalidNumber {
                path: source.to_path_buf(),
                line,
                field,
                value: raw.to_string(),
            })?;
        vector.push(value);
    }

    Ok((fields[0], vector))
}
