//! Context window construction.
//!
//! # Architecture
//!
//! - **SequenceWindower**: Two-phase (fill/drain) streaming window builder
//! - **WindowConfig**: Context half-width and embedding dimension
//! - **FeatureRecord**: Output unit, one per input token
//!
//! # Example
//!
//! ```ignore
//! use conll_vectorizer::window::{SequenceWindower, WindowConfig};
//!
//! let mut windower = SequenceWindower::new(WindowConfig::new(2, 50), table.default_vector())?;
//!
//! for token in corpus {
//!     if let Some(record) = windower.push(table.lookup(&token.token), code)? {
//!         writer.write_record(&record)?;
//!     }
//! }
//! for record in windower.drain()? {
//!     writer.write_record(&record)?;
//! }
//! ```

mod windower;

pub use windower::{FeatureRecord, SequenceWindower, WindowConfig};
