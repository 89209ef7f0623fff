//! Data Export Module
//!
//! Serialize feature records and run metadata for ML training.
//!
//! # Modules
//!
//! - **writer**: Text and binary record encodings behind one [`RecordWriter`]
//! - **reader**: Decoding of both encodings back into records
//! - **manifest**: JSON manifest with feature geometry and label mapping
//! - **npy**: NumPy (.npy) conversion for Python/PyTorch/Keras
//!
//! # Example
//!
//! ```ignore
//! use conll_vectorizer::export::{Manifest, OutputEncoding, RecordWriter};
//!
//! let mut writer = RecordWriter::create("vectorized.txt", OutputEncoding::Text)?;
//! writer.write_record(&record)?;
//! writer.close()?;
//!
//! Manifest::new(&window, &labels)
//!     .with_records(writer.records_written())
//!     .with_encoding(OutputEncoding::Text)
//!     .stamped()
//!     .save("meta.json")?;
//! ```

pub mod manifest;
pub mod npy;
pub mod reader;
pub mod writer;

pub use manifest::Manifest;
pub use npy::{NpyExportResult, NpyExporter, NpyLayout};
pub use reader::{read_records, RecordReader};
pub use writer::{OutputEncoding, RecordWriter};
