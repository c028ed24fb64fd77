//! Evaluation runner
//!
//! Drives a model over every dataset in an eval config and writes results.

mod executor;

pub use executor::{EvalExecutor, EvalProgress, EvalRun, ProgressCallback};
