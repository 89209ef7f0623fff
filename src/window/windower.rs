//! Streaming context windows over a token sequence.
//!
//! Every input token yields exactly one [`FeatureRecord`]: its label code and
//! the concatenated embeddings of the `2C+1` tokens centered on it. Positions
//! before the first token and after the last are filled with the padding
//! (unknown-token) vector.
//!
//! # Phases
//!
//! - **Fill**: the vector queue starts with `C` padding vectors. Each pushed
//!   token appends its vector and label. Once the queue holds `2C+1` vectors
//!   the oldest pending label is centered, so a record is emitted and the
//!   window slides by one.
//! - **Drain**: after the last token, the trailing `C` tokens (or fewer for a
//!   short stream) are still pending. Each is emitted after right-padding the
//!   queue back to `2C+1` vectors.
//!
//! ```text
//! C = 1, tokens a b:
//!
//!   init     [pad]
//!   push a   [pad a]          labels [a]
//!   push b   [pad a b]        labels [a b]   -> emit a, slide -> [a b]
//!   drain    [a b pad]        labels [b]     -> emit b, slide -> [b pad]
//! ```
//!
//! # Memory
//!
//! The queues are bounded by `2C+1` vectors regardless of corpus size.
//! Vectors are shared [`EmbeddingVec`]s, so padding costs one pointer per
//! slot.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::embedding::EmbeddingVec;
use crate::error::{Result, VectorizerError};
use crate::labels::LabelCode;

/// One output unit: a label code and its flattened context window.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Label code of the centered token.
    pub label: LabelCode,

    /// Window embeddings, row-major `[2C+1 × D]`.
    pub features: Vec<f64>,
}

impl FeatureRecord {
    pub fn new(label: LabelCode, features: Vec<f64>) -> Self {
        Self { label, features }
    }

    /// Number of feature values (`(2C+1) × D` for windowed records).
    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Embedding of window position `slot`, given the embedding dimension.
    pub fn slot(&self, slot: usize, dim: usize) -> Option<&[f64]> {
        let start = slot.checked_mul(dim)?;
        self.features.get(start..start.checked_add(dim)?)
    }
}

/// Window geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WindowConfig {
    /// Tokens considered on each side of the centered token (`C`).
    pub context: usize,

    /// Embedding dimension (`D`).
    pub embedding_dim: usize,
}

impl WindowConfig {
    pub fn new(context: usize, embedding_dim: usize) -> Self {
        Self {
            context,
            embedding_dim,
        }
    }

    /// Vectors per window, `2C+1`.
    #[inline]
    pub fn window_width(&self) -> usize {
        2 * self.context + 1
    }

    /// Values per record, `(2C+1) × D`.
    #[inline]
    pub fn feature_dim(&self) -> usize {
        self.window_width() * self.embedding_dim
    }

    /// Validate configuration.
    ///
    /// Returns Ok(()) if valid, Err(msg) otherwise.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.embedding_dim == 0 {
            return Err("embedding_dim must be > 0".to_string());
        }

        if self.context.checked_mul(2).and_then(|w| w.checked_add(1)).is_none() {
            return Err(format!("context ({}) is too large", self.context));
        }

        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(2, 50)
    }
}

/// Sliding-window record builder.
///
/// # Thread Safety
///
/// Single-owner state; records come out in push order and must be consumed
/// in that order.
#[derive(Debug)]
pub struct SequenceWindower {
    config: WindowConfig,

    /// Padding vector for both stream boundaries.
    padding: EmbeddingVec,

    /// Window vectors, oldest at the front.
    vectors: VecDeque<EmbeddingVec>,

    /// Labels of pushed tokens not yet emitted, oldest at the front.
    labels: VecDeque<LabelCode>,

    total_pushed: u64,
    total_emitted: u64,
}

impl SequenceWindower {
    /// Create a windower and left-pad it with `C` copies of `padding`.
    ///
    /// # Errors
    ///
    /// - [`VectorizerError::Config`] if the configuration is invalid
    /// - [`VectorizerError::DimensionMismatch`] if `padding` isn't `D` long
    pub fn new(config: WindowConfig, padding: EmbeddingVec) -> Result<Self> {
        config.validate().map_err(VectorizerError::Config)?;
        if padding.len() != config.embedding_dim {
            return Err(VectorizerError::DimensionMismatch {
                expected: config.embedding_dim,
                actual: padding.len(),
            });
        }

        let width = config.window_width();
        let mut windower = Self {
            config,
            padding,
            vectors: VecDeque::with_capacity(width),
            labels: VecDeque::with_capacity(width),
            total_pushed: 0,
            total_emitted: 0,
        };
        windower.pad(config.context);
        Ok(windower)
    }

    /// Feed one token.
    ///
    /// Returns the record of the token that just became centered, if any.
    /// The first `C` pushes return `None` because their right context is
    /// still arriving.
    ///
    /// # Errors
    ///
    /// [`VectorizerError::DimensionMismatch`] if `vector` isn't `D` long.
    pub fn push(&mut self, vector: EmbeddingVec, label: LabelCode) -> Result<Option<FeatureRecord>> {
        if vector.len() != self.config.embedding_dim {
            return Err(VectorizerError::DimensionMismatch {
                expected: self.config.embedding_dim,
                actual: vector.len(),
            });
        }

        self.vectors.push_back(vector);
        self.labels.push_back(label);
        self.total_pushed += 1;

        if self.vectors.len() == self.config.window_width() {
            return self.emit().map(Some);
        }
        Ok(None)
    }

    /// Emit the next pending record of the drain phase.
    ///
    /// Call after the last [`push`](Self::push) until it returns `None`.
    pub fn drain_next(&mut self) -> Result<Option<FeatureRecord>> {
        if self.labels.is_empty() {
            return Ok(None);
        }

        let missing = self
            .config
            .window_width()
            .saturating_sub(self.vectors.len());
        self.pad(missing);

        self.emit().map(Some)
    }

    /// Emit all pending records, right-padding each window.
    ///
    /// At most `C` records are pending after the stream ends (fewer if the
    /// stream was shorter than `C`).
    pub fn drain(&mut self) -> Result<Vec<FeatureRecord>> {
        let mut records = Vec::with_capacity(self.labels.len());
        while let Some(record) = self.drain_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Pop the front label with the current window, then slide.
    fn emit(&mut self) -> Result<FeatureRecord> {
        let width = self.config.window_width();
        if self.vectors.len() != width {
            return Err(VectorizerError::WindowSizeMismatch {
                expected: width,
                actual: self.vectors.len(),
            });
        }

        let label = self
            .labels
            .pop_front()
            .ok_or(VectorizerError::WindowSizeMismatch {
                expected: width,
                actual: self.vectors.len(),
            })?;

        let mut features = Vec::with_capacity(self.config.feature_dim());
        for vector in &self.vectors {
            features.extend_from_slice(vector);
        }

        self.vectors.pop_front();
        self.total_emitted += 1;

        Ok(FeatureRecord { label, features })
    }

    fn pad(&mut self, count: usize) {
        for _ in 0..count {
            self.vectors.push_back(Arc::clone(&self.padding));
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Vectors currently buffered.
    #[inline]
    pub fn buffered_vectors(&self) -> usize {
        self.vectors.len()
    }

    /// Tokens pushed but not yet emitted.
    #[inline]
    pub fn pending(&self) -> usize {
        self.labels.len()
    }

    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(value: f64, dim: usize) -> EmbeddingVec {
        Arc::new(vec![value; dim])
    }

    /// Push tokens valued 1..=n (label i-1), then drain.
    fn run(context: usize, dim: usize, n: usize) -> Vec<FeatureRecord> {
        let mut windower =
            SequenceWindower::new(WindowConfig::new(context, dim), vec_of(0.0, dim)).unwrap();
        let mut records = Vec::new();
        for i in 1..=n {
            if let Some(record) = windower.push(vec_of(i as f64, dim), (i - 1) as u32).unwrap() {
                records.push(record);
            }
        }
        records.extend(windower.drain().unwrap());
        records
    }

    #[test]
    fn test_window_config_dimensions() {
        let config = WindowConfig::new(2, 50);
        assert_eq!(config.window_width(), 5);
        assert_eq!(config.feature_dim(), 250);
        assert!(config.validate().is_ok());

        assert_eq!(WindowConfig::new(0, 3).feature_dim(), 3);
        assert!(WindowConfig::new(1, 0).validate().is_err());
    }

    #[test]
    fn test_two_token_scenario() {
        // unknown=[0,0], a=[1,1], b=[2,2], C=1
        let mut windower =
            SequenceWindower::new(WindowConfig::new(1, 2), Arc::new(vec![0.0, 0.0])).unwrap();
        let x = 7;
        let y = 9;

        assert!(windower.push(Arc::new(vec![1.0, 1.0]), x).unwrap().is_none());
        let first = windower.push(Arc::new(vec![2.0, 2.0]), y).unwrap().unwrap();
        assert_eq!(first, FeatureRecord::new(x, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]));

        let rest = windower.drain().unwrap();
        assert_eq!(rest, vec![FeatureRecord::new(y, vec![1.0, 1.0, 2.0, 2.0, 0.0, 0.0])]);
    }

    #[test]
    fn test_one_record_per_token_in_order() {
        for context in 0..4 {
            for n in 0..10 {
                let records = run(context, 3, n);
                assert_eq!(records.len(), n, "context={context} n={n}");
                for (i, record) in records.iter().enumerate() {
                    assert_eq!(record.label, i as u32);
                    assert_eq!(record.len(), (2 * context + 1) * 3);
                }
            }
        }
    }

    #[test]
    fn test_zero_context_is_identity() {
        let records = run(0, 4, 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.features, vec![(i + 1) as f64; 4]);
        }
    }

    #[test]
    fn test_window_contents_with_padding() {
        // C=2, tokens 1..=3: every window has exactly the neighbours that exist
        let records = run(2, 1, 3);
        assert_eq!(records[0].features, vec![0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(records[1].features, vec![0.0, 1.0, 2.0, 3.0, 0.0]);
        assert_eq!(records[2].features, vec![1.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_stream_shorter_than_context() {
        let records = run(3, 1, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].features, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_center_slot_is_own_embedding() {
        let context = 2;
        let records = run(context, 2, 8);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.slot(context, 2).unwrap(), &[(i + 1) as f64; 2]);
        }
        assert!(records[0].slot(5, 2).is_none());
    }

    #[test]
    fn test_buffer_stays_bounded() {
        let context = 2;
        let mut windower =
            SequenceWindower::new(WindowConfig::new(context, 1), vec_of(0.0, 1)).unwrap();
        assert_eq!(windower.buffered_vectors(), context);

        for i in 0..100 {
            windower.push(vec_of(i as f64, 1), 0).unwrap();
            assert!(windower.buffered_vectors() <= 2 * context + 1);
            assert!(windower.pending() <= windower.buffered_vectors());
        }
        assert_eq!(windower.pending(), context);

        windower.drain().unwrap();
        assert_eq!(windower.pending(), 0);
        assert_eq!(windower.total_pushed(), 100);
        assert_eq!(windower.total_emitted(), 100);
    }

    #[test]
    fn test_drain_on_empty_stream() {
        let mut windower =
            SequenceWindower::new(WindowConfig::new(2, 3), vec_of(0.0, 3)).unwrap();
        assert!(windower.drain().unwrap().is_empty());
        assert!(windower.drain_next().unwrap().is_none());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut windower =
            SequenceWindower::new(WindowConfig::new(1, 3), vec_of(0.0, 3)).unwrap();
        let err = windower.push(vec_of(1.0, 2), 0).unwrap_err();
        assert!(matches!(
            err,
            VectorizerError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));

        assert!(SequenceWindower::new(WindowConfig::new(1, 3), vec_of(0.0, 4)).is_err());
    }
}
