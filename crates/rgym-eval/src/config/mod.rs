//! Evaluation configuration
//!
//! An evaluation config names a model, sampling parameters and an ordered
//! list of dataset categories. Files are YAML (or JSON) documents.

mod loader;
mod schema;
mod validation;

pub use loader::{ConfigLoader, load_config};
pub use schema::{CategoryConfig, DatasetConfig, EvalConfig};
pub use validation::{ConfigValidator, ValidationIssue};
