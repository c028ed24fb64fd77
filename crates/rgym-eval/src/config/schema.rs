//! Evaluation config schema

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root of an evaluation config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    /// Model identifier sent to the inference server
    pub model_path: String,

    /// OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Completion budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Id of a built-in system prompt
    #[serde(default = "default_developer_prompt")]
    pub developer_prompt: String,

    /// Role of the prompt message ("system" or "developer")
    #[serde(default = "default_developer_role")]
    pub developer_role: String,

    /// Literal prompt text; overrides `developer_prompt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Root directory for run output
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Include entry metadata in results
    #[serde(default = "default_true")]
    pub save_metadata: bool,

    /// Write one result file per dataset with every entry
    #[serde(default)]
    pub save_full_results: bool,

    /// Completions requested per entry
    #[serde(default = "default_eval_repeats")]
    pub eval_repeats: u32,

    /// In-flight requests per dataset
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Size used when a dataset entry has none
    #[serde(default = "default_size")]
    pub default_size: usize,

    /// Seed used when a dataset entry has none
    #[serde(default = "default_seed")]
    pub default_seed: Option<u64>,

    pub categories: Vec<CategoryConfig>,
}

/// A named group of datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    #[serde(alias = "name")]
    pub category: String,

    pub datasets: Vec<DatasetConfig>,
}

/// One dataset to evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Registry name
    pub dataset: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Dataset-specific overrides
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

fn default_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_p() -> f64 {
    1.0
}

fn default_temperature() -> f64 {
    0.6
}

fn default_developer_prompt() -> String {
    rgym_core::utils::DEFAULT_PROMPT_ID.to_string()
}

fn default_developer_role() -> String {
    "system".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

fn default_eval_repeats() -> u32 {
    1
}

fn default_max_concurrent() -> usize {
    10
}

fn default_size() -> usize {
    50
}

fn default_seed() -> Option<u64> {
    Some(42)
}

impl EvalConfig {
    /// Create a config for a model with no categories
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            temperature: default_temperature(),
            developer_prompt: default_developer_prompt(),
            developer_role: default_developer_role(),
            system_prompt: None,
            output_dir: default_output_dir(),
            save_metadata: default_true(),
            save_full_results: false,
            eval_repeats: default_eval_repeats(),
            max_concurrent: default_max_concurrent(),
            default_size: default_size(),
            default_seed: default_seed(),
            categories: Vec::new(),
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse YAML eval config")
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON eval config")
    }

    /// Serialize back to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize eval config")
    }

    /// Set the inference endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set completions per entry
    pub fn with_eval_repeats(mut self, repeats: u32) -> Self {
        self.eval_repeats = repeats;
        self
    }

    /// Set request concurrency
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Set a literal system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Write per-dataset result files
    pub fn with_full_results(mut self, enabled: bool) -> Self {
        self.save_full_results = enabled;
        self
    }

    /// Append a category
    pub fn with_category(mut self, category: CategoryConfig) -> Self {
        self.categories.push(category);
        self
    }

    /// Prompt text sent ahead of each question, if any
    pub fn resolved_system_prompt(&self) -> Option<String> {
        match &self.system_prompt {
            Some(prompt) => Some(prompt.clone()),
            None => rgym_core::system_prompt(&self.developer_prompt).map(str::to_string),
        }
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// Params for a dataset with `size`/`seed` defaults merged in
    pub fn dataset_params(&self, category: &str, dataset: &str) -> Option<Map<String, Value>> {
        self.category(category)?
            .datasets
            .iter()
            .find(|d| d.dataset == dataset)
            .map(|d| d.resolved_params(self.default_size, self.default_seed))
    }

    /// Number of dataset entries across all categories
    pub fn dataset_count(&self) -> usize {
        self.categories.iter().map(|c| c.datasets.len()).sum()
    }

    /// Number of entries the config asks for
    pub fn total_entries(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.datasets)
            .map(|d| d.resolved_size(self.default_size))
            .sum()
    }
}

impl CategoryConfig {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            datasets: Vec::new(),
        }
    }

    pub fn with_dataset(mut self, dataset: DatasetConfig) -> Self {
        self.datasets.push(dataset);
        self
    }
}

impl DatasetConfig {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            size: None,
            seed: None,
            params: Map::new(),
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Entry count after the same precedence as [`Self::resolved_params`]
    pub fn resolved_size(&self, default_size: usize) -> usize {
        self.resolved_params(default_size, None)
            .get("size")
            .and_then(Value::as_u64)
            .map_or(default_size, |size| size as usize)
    }

    /// Params handed to the dataset factory.
    ///
    /// `size` and `seed` fields win over keys of the same name in `params`;
    /// the defaults only fill in what neither sets.
    pub fn resolved_params(&self, default_size: usize, default_seed: Option<u64>) -> Map<String, Value> {
        let mut params = self.params.clone();
        if let Some(size) = self.size {
            params.insert("size".to_string(), Value::from(size));
        } else {
            params
                .entry("size")
                .or_insert_with(|| Value::from(default_size));
        }
        if let Some(seed) = self.seed {
            params.insert("seed".to_string(), Value::from(seed));
        } else if let Some(seed) = default_seed {
            params.entry("seed").or_insert_with(|| Value::from(seed));
        }
        params
    }
}
