//! Feature record serialization.
//!
//! # Encodings
//!
//! | Encoding | Record layout |
//! |----------|---------------|
//! | Text     | `label v0 v1 ... vN-1\n`, decimal values separated by single spaces |
//! | Binary   | `label: u32 LE` followed by `N × f32 LE`, no separators |
//!
//! Binary records carry no length prefix. Readers frame them with the
//! `feature_dim` from the manifest: each record is `4 + 4 × feature_dim`
//! bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, VectorizerError};
use crate::labels::LabelCode;
use crate::window::FeatureRecord;

/// Output encoding of feature records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// One whitespace-separated line per record.
    #[default]
    Text,

    /// Fixed-width little-endian records.
    Binary,
}

impl OutputEncoding {
    /// Bytes per binary record; `None` for text.
    pub fn record_size(&self, feature_dim: usize) -> Option<usize> {
        match self {
            OutputEncoding::Text => None,
            OutputEncoding::Binary => Some(4 + 4 * feature_dim),
        }
    }
}

impl std::fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputEncoding::Text => write!(f, "text"),
            OutputEncoding::Binary => write!(f, "binary"),
        }
    }
}

impl std::str::FromStr for OutputEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputEncoding::Text),
            "binary" | "bin" => Ok(OutputEncoding::Binary),
            other => Err(format!("unknown output encoding '{other}'")),
        }
    }
}

/// Writer for feature records in either encoding.
///
/// The inner writer is released on [`close`](Self::close); writing after
/// that fails with [`VectorizerError::WriterClosed`].
pub struct RecordWriter<W: Write = BufWriter<File>> {
    encoding: OutputEncoding,
    inner: Option<W>,
    target: PathBuf,
    records_written: usize,

    /// Reused line buffer for the text encoding.
    line: String,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (truncate) `path` and write records to it.
    pub fn create<P: AsRef<Path>>(path: P, encoding: OutputEncoding) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| VectorizerError::io(path, e))?;
        Ok(Self::new(BufWriter::new(file), path, encoding))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap any writer; `target` names it in error messages.
    pub fn new(inner: W, target: impl Into<PathBuf>, encoding: OutputEncoding) -> Self {
        Self {
            encoding,
            inner: Some(inner),
            target: target.into(),
            records_written: 0,
            line: String::new(),
        }
    }

    /// Write one record.
    pub fn write(&mut self, label: LabelCode, features: &[f64]) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(VectorizerError::WriterClosed)?;

        let written = match self.encoding {
            OutputEncoding::Text => {
                encode_text(&mut self.line, label, features);
                inner.write_all(self.line.as_bytes())
            }
            OutputEncoding::Binary => encode_binary(inner, label, features),
        };
        written.map_err(|e| VectorizerError::io(&self.target, e))?;

        self.records_written += 1;
        Ok(())
    }

    /// Write a windowed record.
    #[inline]
    pub fn write_record(&mut self, record: &FeatureRecord) -> Result<()> {
        self.write(record.label, &record.features)
    }

    /// Flush and release the underlying writer.
    ///
    /// Closing an already closed writer is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut inner) = self.inner.take() {
            inner
                .flush()
                .map_err(|e| VectorizerError::io(&self.target, e))?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer, if still open.
    pub fn into_inner(mut self) -> Result<Option<W>> {
        match self.inner.take() {
            Some(mut inner) => {
                inner
                    .flush()
                    .map_err(|e| VectorizerError::io(&self.target, e))?;
                Ok(Some(inner))
            }
            None => Ok(None),
        }
    }

    pub fn encoding(&self) -> OutputEncoding {
        self.encoding
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

fn encode_text(line: &mut String, label: LabelCode, features: &[f64]) {
    use std::fmt::Write as _;

    line.clear();
    // Writing into a String cannot fail
    let _ = write!(line, "{label}");
    for value in features {
        let _ = write!(line, " {value}");
    }
    line.push('\n');
}

fn encode_binary<W: Write>(out: &mut W, label: LabelCode, features: &[f64]) -> std::io::Result<()> {
    out.write_all(&label.to_le_bytes())?;
    for &value in features {
        out.write_all(&(value as f32).to_le_bytes())?;
    }
    Ok(())
}
