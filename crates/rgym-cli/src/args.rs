//! CLI argument definitions using clap
//!
//! - rgym eval run|report|compare     # run and inspect evaluations
//! - rgym config validate|show        # check eval configs
//! - rgym datasets list|generate      # browse the dataset registry

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment fallback for `--base-url`
pub const BASE_URL_ENV: &str = "RGYM_BASE_URL";

#[derive(Parser)]
#[command(name = "rgym")]
#[command(about = "Procedural reasoning datasets and a config-driven evaluation harness")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run evaluations and inspect their results
    Eval {
        #[command(subcommand)]
        action: EvalAction,
    },

    /// Validate and display eval configs
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List and sample registered datasets
    Datasets {
        #[command(subcommand)]
        action: DatasetsAction,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum EvalAction {
    /// Evaluate a model against every dataset in a config
    Run {
        /// Eval config file (YAML or JSON)
        config: PathBuf,

        /// Override `output_dir` from the config
        #[arg(long, short)]
        output_dir: Option<PathBuf>,

        /// Override `base_url` from the config
        #[arg(long, env = BASE_URL_ENV)]
        base_url: Option<String>,

        /// API key for the completion server
        #[arg(long, env = "RGYM_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Only run these categories (repeatable)
        #[arg(long = "category", short = 'c')]
        categories: Vec<String>,

        /// Override `max_concurrent` from the config
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Override `eval_repeats` from the config
        #[arg(long)]
        repeats: Option<u32>,

        /// Report format printed after the run (table, json, markdown)
        #[arg(long, short, default_value = "table")]
        format: String,
    },

    /// Print the report for a finished run
    Report {
        /// Run directory or summary.json
        input: PathBuf,

        /// Report format (table, json, markdown)
        #[arg(long, short, default_value = "table")]
        format: String,
    },

    /// Compare two runs and flag regressions
    Compare {
        /// Baseline run directory or summary.json
        baseline: PathBuf,

        /// Current run directory or summary.json
        current: PathBuf,

        /// Score drop that counts as a regression
        #[arg(long)]
        threshold: Option<f64>,

        /// Exit with an error when regressions are found
        #[arg(long)]
        fail_on_regression: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Validate a config file, or every config under a directory
    Validate {
        path: PathBuf,
    },

    /// Print a config with all defaults filled in
    Show {
        path: PathBuf,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum DatasetsAction {
    /// List registered datasets
    List {
        /// Only list datasets in this category
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Generate entries from a dataset
    Generate {
        /// Registered dataset name
        name: String,

        /// Number of entries
        #[arg(long, short, default_value_t = 5)]
        size: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Extra dataset parameter as key=value (repeatable)
        #[arg(long = "param", short = 'p')]
        params: Vec<String>,

        /// Curriculum level applied to every attribute
        #[arg(long)]
        level: Option<usize>,

        /// Output format (json, yaml)
        #[arg(long, short, default_value = "json")]
        format: String,
    },
}
