//! Procedural datasets
//!
//! A procedural dataset generates question/answer entries on demand from a
//! seed. Entry `idx` is always produced from an RNG seeded with
//! `seed + idx`, so a dataset can be indexed randomly, iterated repeatedly and
//! reconstructed elsewhere from its config alone.

mod params;
mod registry;

pub use params::{DatasetConfig, from_params, resolve_seed};
pub use registry::{
    CurriculumFactory, DatasetFactory, DatasetRegistry, DatasetSpec, create_dataset, global,
    has_dataset,
};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single generated item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Prompt shown to the model
    pub question: String,

    /// Oracle answer
    pub answer: String,

    /// Generation details; always holds `source_dataset` and `source_index`
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Entry {
    /// Create an entry tagged with its source dataset and index
    pub fn new(
        dataset: &str,
        index: usize,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        let mut metadata = Map::new();
        metadata.insert("source_dataset".to_string(), Value::from(dataset));
        metadata.insert("source_index".to_string(), Value::from(index));
        Self {
            question: question.into(),
            answer: answer.into(),
            metadata,
        }
    }

    /// Attach a metadata value
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Name of the dataset that produced this entry
    pub fn source_dataset(&self) -> Option<&str> {
        self.metadata.get("source_dataset").and_then(Value::as_str)
    }

    /// Index of this entry within its dataset
    pub fn source_index(&self) -> Option<usize> {
        self.metadata
            .get("source_index")
            .and_then(Value::as_u64)
            .map(|i| i as usize)
    }
}

/// A deterministic, indexable generator of entries
pub trait ProceduralDataset: Send + Sync {
    /// Registry name of the dataset
    fn name(&self) -> &str;

    /// Number of entries
    fn len(&self) -> usize;

    /// Base seed; entry `idx` uses `seed + idx`
    fn seed(&self) -> u64;

    /// Generate the entry at `idx`
    fn get(&self, idx: usize) -> Entry;

    /// Resolved configuration, as written to result files
    fn config_json(&self) -> Value;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Score a model answer against an entry, in `[0.0, 1.0]`.
    ///
    /// An exact match scores 1.0. When the oracle answer is contained in a
    /// longer answer the score is `len(oracle) / len(answer)`.
    fn score_answer(&self, answer: Option<&str>, entry: &Entry) -> f64 {
        default_score(answer, &entry.answer)
    }

    /// Collect every entry
    fn entries(&self) -> Vec<Entry> {
        (0..self.len()).map(|idx| self.get(idx)).collect()
    }
}

impl dyn ProceduralDataset + '_ {
    /// Iterate over all entries in index order
    pub fn iter(&self) -> DatasetIter<'_> {
        DatasetIter {
            dataset: self,
            index: 0,
        }
    }
}

impl<'a, 'd> IntoIterator for &'a (dyn ProceduralDataset + 'd) {
    type Item = Entry;
    type IntoIter = DatasetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a dataset's entries
pub struct DatasetIter<'a> {
    dataset: &'a dyn ProceduralDataset,
    index: usize,
}

impl Iterator for DatasetIter<'_> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if self.index >= self.dataset.len() {
            return None;
        }
        let entry = self.dataset.get(self.index);
        self.index += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DatasetIter<'_> {}

/// RNG for a single entry
pub fn item_rng(seed: u64, idx: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(idx as u64))
}

/// Score shared by datasets with a single oracle answer
pub fn default_score(answer: Option<&str>, oracle: &str) -> f64 {
    let Some(answer) = answer else {
        return 0.0;
    };
    if answer.is_empty() {
        return 0.0;
    }
    if answer == oracle {
        1.0
    } else if answer.contains(oracle) {
        oracle.chars().count() as f64 / answer.chars().count() as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_score() {
        assert_eq!(default_score(Some("42"), "42"), 1.0);
        assert_eq!(default_score(Some("41"), "42"), 0.0);
        assert_eq!(default_score(Some(""), "42"), 0.0);
        assert_eq!(default_score(None, "42"), 0.0);
        assert_eq!(default_score(Some("x=42"), "42"), 0.5);
    }

    #[test]
    fn test_entry_source_fields() {
        let entry = Entry::new("chain_sum", 7, "1 + 1 =", "2").with_metadata("num_terms", 2);
        assert_eq!(entry.source_dataset(), Some("chain_sum"));
        assert_eq!(entry.source_index(), Some(7));
        assert_eq!(entry.metadata["num_terms"], 2);
    }

    #[test]
    fn test_item_rng_is_deterministic() {
        use rand::Rng;
        let a: u64 = item_rng(42, 3).r#gen();
        let b: u64 = item_rng(42, 3).r#gen();
        let c: u64 = item_rng(42, 4).r#gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
