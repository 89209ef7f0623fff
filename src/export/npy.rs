//! NumPy export of a finished feature file.
//!
//! Converts the records of a run into `.npy` arrays for Python training code:
//!
//! - `labels.npy`: `[N]` i64 label codes
//! - `features.npy`: `[N, feature_dim]` f32 (flat) or
//!   `[N, context, embedding_dim]` f32 (temporal, ready for conv/LSTM input)
//!
//! The manifest supplies the framing, so the feature file is decoded with the
//! same `feature_dim` it was written with.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Array3};
use ndarray_npy::WriteNpyExt;

use crate::error::{Result, VectorizerError};
use crate::export::manifest::Manifest;
use crate::export::reader::RecordReader;
use crate::export::writer::OutputEncoding;

/// Shape of the exported feature array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpyLayout {
    /// `[N, feature_dim]`
    #[default]
    Flat,

    /// `[N, context, embedding_dim]`
    Temporal,
}

/// Summary of an export.
#[derive(Debug, Clone)]
pub struct NpyExportResult {
    pub n_records: usize,
    pub features_shape: Vec<usize>,
    pub features_path: PathBuf,
    pub labels_path: PathBuf,
}

/// Exports feature files to NumPy arrays.
pub struct NpyExporter {
    output_dir: PathBuf,
    layout: NpyLayout,
}

impl NpyExporter {
    /// Create new exporter writing into `output_dir`.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            layout: NpyLayout::Flat,
        }
    }

    pub fn with_layout(mut self, layout: NpyLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Decode `features_file` and write `features.npy` and `labels.npy`.
    ///
    /// The encoding comes from the manifest when recorded there, otherwise
    /// from `fallback_encoding`.
    pub fn export<P: AsRef<Path>>(
        &self,
        features_file: P,
        manifest: &Manifest,
        fallback_encoding: OutputEncoding,
    ) -> Result<NpyExportResult> {
        let encoding = manifest.encoding.unwrap_or(fallback_encoding);
        let feature_dim = manifest.feature_dim;

        let mut labels = Vec::with_capacity(manifest.n_records.unwrap_or(0));
        let mut flat = Vec::with_capacity(manifest.n_records.unwrap_or(0) * feature_dim);
        for record in RecordReader::open(&features_file, encoding, feature_dim)? {
            let record = record?;
            labels.push(i64::from(record.label));
            flat.extend(record.features.iter().map(|&v| v as f32));
        }
        let n_records = labels.len();

        if let Some(expected) = manifest.n_records {
            if expected != n_records {
                return Err(VectorizerError::Export(format!(
                    "manifest lists {expected} records, {} holds {n_records}",
                    features_file.as_ref().display()
                )));
            }
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| VectorizerError::io(&self.output_dir, e))?;

        let features_path = self.output_dir.join("features.npy");
        let features_shape = match self.layout {
            NpyLayout::Flat => {
                let array = Array2::from_shape_vec((n_records, feature_dim), flat)
                    .map_err(|e| VectorizerError::Export(format!("Failed to create array: {e}")))?;
                write_npy(&features_path, &array)?;
                array.shape().to_vec()
            }
            NpyLayout::Temporal => {
                let array = Array3::from_shape_vec(
                    (n_records, manifest.context, manifest.embedding_dim),
                    flat,
                )
                .map_err(|e| VectorizerError::Export(format!("Failed to create 3D array: {e}")))?;
                write_npy(&features_path, &array)?;
                array.shape().to_vec()
            }
        };

        let labels_path = self.output_dir.join("labels.npy");
        write_npy(&labels_path, &Array1::from_vec(labels))?;

        log::info!(
            "Exported {} records to {} {:?}",
            n_records,
            features_path.display(),
            features_shape
        );

        Ok(NpyExportResult {
            n_records,
            features_shape,
            features_path,
            labels_path,
        })
    }
}

fn write_npy<T: WriteNpyExt>(path: &Path, array: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| VectorizerError::io(path, e))?;
    array
        .write_npy(file)
        .map_err(|e| VectorizerError::Export(format!("Failed to write {}: {e}", path.display())))
}
