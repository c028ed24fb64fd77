//! Dataset configuration plumbing
//!
//! Dataset params arrive as a free-form JSON object (from a YAML config, a
//! curriculum or the CLI). Each dataset owns a typed config that is
//! deserialized from that object with unknown keys rejected.

use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{GymError, GymResult};

/// Typed configuration of a procedural dataset
pub trait DatasetConfig: DeserializeOwned + Serialize + Default + Clone + Send + Sync {
    /// Number of entries to generate
    fn size(&self) -> usize;

    /// Base seed, if fixed
    fn seed(&self) -> Option<u64>;

    /// Check parameter invariants; the message names the offending field
    fn validate(&self) -> Result<(), String>;
}

/// Build and validate a dataset config from a params object
pub fn from_params<C: DatasetConfig>(dataset: &str, params: &Map<String, Value>) -> GymResult<C> {
    let config: C = serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| GymError::invalid_params(dataset, e.to_string()))?;
    config
        .validate()
        .map_err(|message| GymError::invalid_params(dataset, message))?;
    Ok(config)
}

/// Use the configured seed or draw a fresh one
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen_range(0..=u32::MAX as u64);
            tracing::debug!(seed, "no seed configured, drew a random seed");
            seed
        }
    }
}
