//! rgym core library
//!
//! Procedural reasoning datasets and the pieces around them: the dataset
//! trait and registry, difficulty curricula, SAT/CNF helpers used by logic
//! puzzles, and answer extraction for scoring model completions.

pub mod arithmetic;
pub mod coaching;
pub mod dataset;
pub mod error;
pub mod logic;
pub mod sat;
pub mod utils;

// Re-export commonly used types
pub use coaching::{AttributeDefinition, Curriculum};
pub use dataset::{DatasetRegistry, DatasetSpec, Entry, ProceduralDataset, create_dataset};
pub use error::{GymError, GymResult};
pub use utils::{extract_answer, system_prompt};
