//! Logic tasks for training reasoning capabilities

pub mod multi_step_reasoning;

pub use multi_step_reasoning::{MultiStepReasoningConfig, MultiStepReasoningDataset};
