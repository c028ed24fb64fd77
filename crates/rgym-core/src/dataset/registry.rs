//! Dataset registry
//!
//! Maps dataset names (the `dataset:` keys of an evaluation config) to
//! factories that build a dataset from a params object.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::ProceduralDataset;
use crate::arithmetic::chain_sum;
use crate::coaching::Curriculum;
use crate::error::{GymError, GymResult};
use crate::logic::multi_step_reasoning;

/// Builds a dataset from its params object
pub type DatasetFactory = fn(&Map<String, Value>) -> GymResult<Box<dyn ProceduralDataset>>;

/// Builds a fresh curriculum at level 0
pub type CurriculumFactory = fn() -> Curriculum;

/// Registration record for one dataset
#[derive(Clone)]
pub struct DatasetSpec {
    /// Registry key
    pub name: &'static str,

    /// Category the dataset belongs to (e.g. "arithmetic", "logic")
    pub category: &'static str,

    /// One-line description
    pub description: &'static str,

    /// Dataset constructor
    pub factory: DatasetFactory,

    /// Curriculum constructor, if the dataset has one
    pub curriculum: Option<CurriculumFactory>,
}

impl std::fmt::Debug for DatasetSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetSpec")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("has_curriculum", &self.curriculum.is_some())
            .finish()
    }
}

/// Registry of known datasets
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    specs: BTreeMap<String, DatasetSpec>,
}

impl DatasetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in dataset
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in [chain_sum::spec(), multi_step_reasoning::spec()] {
            // Built-in names are distinct
            let _ = registry.register(spec);
        }
        registry
    }

    /// Register a dataset; names must be unique
    pub fn register(&mut self, spec: DatasetSpec) -> GymResult<()> {
        if self.specs.contains_key(spec.name) {
            return Err(GymError::dataset(spec.name, "dataset is already registered"));
        }
        tracing::trace!(dataset = spec.name, "registered dataset");
        self.specs.insert(spec.name.to_string(), spec);
        Ok(())
    }

    /// Look up a dataset spec
    pub fn get(&self, name: &str) -> Option<&DatasetSpec> {
        self.specs.get(name)
    }

    /// Whether a dataset name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }

    /// Registered specs in name order
    pub fn specs(&self) -> impl Iterator<Item = &DatasetSpec> {
        self.specs.values()
    }

    /// Build a dataset from params
    pub fn create(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> GymResult<Box<dyn ProceduralDataset>> {
        let spec = self.get(name).ok_or_else(|| {
            GymError::not_found_resource(format!("unknown dataset '{}'", name), "dataset")
        })?;
        (spec.factory)(params)
    }

    /// Build a fresh curriculum for a dataset
    pub fn curriculum(&self, name: &str) -> GymResult<Curriculum> {
        let spec = self.get(name).ok_or_else(|| {
            GymError::not_found_resource(format!("unknown dataset '{}'", name), "dataset")
        })?;
        let factory = spec
            .curriculum
            .ok_or_else(|| GymError::dataset(name, "dataset has no curriculum"))?;
        Ok(factory())
    }
}

static GLOBAL_REGISTRY: Lazy<DatasetRegistry> = Lazy::new(DatasetRegistry::builtin);

/// Process-wide registry of built-in datasets
pub fn global() -> &'static DatasetRegistry {
    &GLOBAL_REGISTRY
}

/// Build a built-in dataset by name
pub fn create_dataset(
    name: &str,
    params: &Map<String, Value>,
) -> GymResult<Box<dyn ProceduralDataset>> {
    global().create(name, params)
}

/// Whether a built-in dataset exists
pub fn has_dataset(name: &str) -> bool {
    global().contains(name)
}
