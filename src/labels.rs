//! Label string to dense integer code mapping.
//!
//! Codes are handed out in first-seen order starting at 0. An index can be
//! seeded from the `labels` table of a previous run's manifest so that an
//! evaluation pass numbers labels exactly like the training pass did; labels
//! the earlier run never saw are appended after the highest seeded code.
//!
//! # Example
//!
//! ```
//! use conll_vectorizer::labels::LabelIndex;
//!
//! # fn main() -> conll_vectorizer::Result<()> {
//! let mut index = LabelIndex::new();
//! assert_eq!(index.get_or_create("O")?, 0);
//! assert_eq!(index.get_or_create("I-PER")?, 1);
//! assert_eq!(index.get_or_create("O")?, 0);
//! assert_eq!(index.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::error::{Result, VectorizerError};

/// Integer code of a label.
pub type LabelCode = u32;

/// Bijective label ↔ code mapping that only ever grows.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    codes: AHashMap<String, LabelCode>,
    labels: BTreeMap<LabelCode, String>,
    next_code: LabelCode,
}

impl LabelIndex {
    /// Create an empty index. The first label gets code 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an index from a persisted code → label mapping.
    ///
    /// Seeded pairs are kept verbatim; new labels continue after the highest
    /// seeded code even if the seeded codes have gaps.
    ///
    /// # Errors
    ///
    /// [`VectorizerError::InconsistentLabelMap`] if two codes map to the same
    /// label, since the mapping could then not be inverted.
    pub fn seed(prior: &BTreeMap<LabelCode, String>) -> Result<Self> {
        let mut codes = AHashMap::with_capacity(prior.len());
        for (&code, label) in prior {
            if let Some(existing) = codes.insert(label.clone(), code) {
                return Err(VectorizerError::InconsistentLabelMap(format!(
                    "label '{label}' is mapped to both {existing} and {code}"
                )));
            }
        }

        let next_code = match prior.keys().next_back() {
            Some(&max) => max.checked_add(1).ok_or_else(|| {
                VectorizerError::InconsistentLabelMap(format!("label code {max} leaves no room"))
            })?,
            None => 0,
        };

        Ok(Self {
            codes,
            labels: prior.clone(),
            next_code,
        })
    }

    /// Return the code for `label`, assigning the next unused code if needed.
    ///
    /// This is the only mutating operation; looking up a known label
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// [`VectorizerError::InconsistentLabelMap`] if the code space is
    /// exhausted. The index is left unchanged in that case.
    pub fn get_or_create(&mut self, label: &str) -> Result<LabelCode> {
        if let Some(&code) = self.codes.get(label) {
            return Ok(code);
        }

        let code = self.next_code;
        self.next_code = code.checked_add(1).ok_or_else(|| {
            VectorizerError::InconsistentLabelMap(format!(
                "no label code left for '{label}' after {code}"
            ))
        })?;
        self.codes.insert(label.to_string(), code);
        self.labels.insert(code, label.to_string());
        log::debug!("Assigned label code {} to '{}'", code, label);
        Ok(code)
    }

    /// Code of a known label.
    pub fn get(&self, label: &str) -> Option<LabelCode> {
        self.codes.get(label).copied()
    }

    /// Label string of a known code.
    pub fn label(&self, code: LabelCode) -> Option<&str> {
        self.labels.get(&code).map(String::as_str)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Code the next new label would receive.
    pub fn next_code(&self) -> LabelCode {
        self.next_code
    }

    /// Code → label mapping, as persisted in the manifest.
    pub fn inverse(&self) -> BTreeMap<LabelCode, String> {
        self.labels.clone()
    }

    /// Iterate `(code, label)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (LabelCode, &str)> {
        self.labels.iter().map(|(&code, label)| (code, label.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(LabelCode, &str)]) -> BTreeMap<LabelCode, String> {
        pairs
            .iter()
            .map(|&(code, label)| (code, label.to_string()))
            .collect()
    }

    #[test]
    fn test_first_seen_order() {
        let mut index = LabelIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.get_or_create("I-ORG").unwrap(), 0);
        assert_eq!(index.get_or_create("O").unwrap(), 1);
        assert_eq!(index.get_or_create("I-ORG").unwrap(), 0);
        assert_eq!(index.get_or_create("I-LOC").unwrap(), 2);
        assert_eq!(index.len(), 3);
        assert_eq!(index.label(1), Some("O"));
        assert_eq!(index.get("I-LOC"), Some(2));
        assert_eq!(index.get("B-MISC"), None);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let labels = ["O", "I-PER", "O", "I-LOC", "I-PER", "B-MISC"];
        let run = || {
            let mut index = LabelIndex::new();
            for label in labels {
                index.get_or_create(label).unwrap();
            }
            index.inverse()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_seeded_codes_are_preserved() {
        let prior = mapping(&[(0, "O"), (1, "I-PER"), (2, "I-LOC")]);
        let mut index = LabelIndex::seed(&prior).unwrap();

        assert_eq!(index.get_or_create("I-LOC").unwrap(), 2);
        assert_eq!(index.get_or_create("O").unwrap(), 0);
        assert_eq!(index.inverse(), prior);
    }

    #[test]
    fn test_seeded_index_extends_with_next_code() {
        let prior = mapping(&[(0, "O"), (1, "I-PER")]);
        let mut index = LabelIndex::seed(&prior).unwrap();

        assert_eq!(index.get_or_create("I-MISC").unwrap(), 2);
        assert_eq!(index.get_or_create("I-PER").unwrap(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_seed_with_gaps_continues_after_max() {
        let prior = mapping(&[(0, "O"), (5, "I-PER")]);
        let mut index = LabelIndex::seed(&prior).unwrap();
        assert_eq!(index.next_code(), 6);
        assert_eq!(index.get_or_create("I-LOC").unwrap(), 6);
    }

    #[test]
    fn test_seed_rejects_duplicate_labels() {
        let prior = mapping(&[(0, "O"), (1, "O")]);
        assert!(matches!(
            LabelIndex::seed(&prior),
            Err(VectorizerError::InconsistentLabelMap(_))
        ));
    }

    #[test]
    fn test_exhausted_code_space_is_an_error() {
        let prior = mapping(&[(0, "O"), (LabelCode::MAX - 1, "I-PER")]);
        let mut index = LabelIndex::seed(&prior).unwrap();

        assert!(matches!(
            index.get_or_create("I-LOC"),
            Err(VectorizerError::InconsistentLabelMap(_))
        ));
        assert!(matches!(
            index.get_or_create("I-MISC"),
            Err(VectorizerError::InconsistentLabelMap(_))
        ));

        // Nothing was reassigned
        assert_eq!(index.label(0), Some("O"));
        assert_eq!(index.get("I-LOC"), None);
        assert_eq!(index.get("I-PER").unwrap(), LabelCode::MAX - 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_seed_starts_at_zero() {
        let mut index = LabelIndex::seed(&BTreeMap::new()).unwrap();
        assert_eq!(index.get_or_create("O").unwrap(), 0);
    }
}
