//! rgym evaluation harness
//!
//! Runs a model over the procedural datasets named in a YAML evaluation
//! config and records how well it answers.
//!
//! # Features
//!
//! - **Config schema**: categories of datasets with per-dataset `size`,
//!   `seed` and `params` overrides, validated against the dataset registry
//! - **Model client**: any OpenAI-compatible chat completions endpoint
//! - **Runner**: bounded concurrency per dataset, repeated completions per
//!   entry, JSON results on disk
//! - **Reports**: table, JSON and Markdown output plus run-to-run regression
//!   detection
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rgym_eval::{EvalExecutor, OpenAiClient, load_config};
//!
//! let config = load_config("configs/example.yaml")?;
//! let client = OpenAiClient::from_env(&config.base_url)?;
//! let executor = EvalExecutor::new(config, Arc::new(client));
//! let run = executor.run_all().await?;
//! ```

pub mod client;
pub mod config;
pub mod metrics;
pub mod report;
pub mod runner;

// Re-exports for convenience
pub use client::{ChatMessage, Completion, CompletionRequest, ModelClient, OpenAiClient};
pub use config::{
    CategoryConfig, ConfigLoader, ConfigValidator, DatasetConfig, EvalConfig, load_config,
};
pub use metrics::{DatasetResult, EntryResult, EvalSummary, MetricsAggregator};
pub use runner::{EvalExecutor, EvalProgress, EvalRun};
