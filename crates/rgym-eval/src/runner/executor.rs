//! Evaluation executor
//!
//! Datasets are evaluated one after another. Within a dataset, entries are
//! answered concurrently (bounded by `max_concurrent`) and each entry is
//! asked `eval_repeats` times.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use rgym_core::dataset::{DatasetRegistry, Entry, ProceduralDataset};
use rgym_core::utils::extract_answer;

use crate::client::{ChatMessage, CompletionRequest, ModelClient};
use crate::config::{CategoryConfig, ConfigValidator, DatasetConfig, EvalConfig};
use crate::metrics::{DatasetResult, EntryResult, EvalSummary, MetricsAggregator, result_stem};
use crate::report::SUMMARY_FILE;

/// Tag the answer is expected in
const ANSWER_TAG: &str = "answer";

/// Callback for progress updates during evaluation
pub type ProgressCallback = Box<dyn Fn(EvalProgress) + Send + Sync>;

/// Progress update during evaluation
#[derive(Debug, Clone)]
pub struct EvalProgress {
    pub category: String,
    pub dataset: String,
    /// Position of the dataset in the run (0-based)
    pub dataset_index: usize,
    pub dataset_total: usize,
    /// Entries finished in the current dataset
    pub completed: usize,
    /// Entries in the current dataset
    pub total: usize,
}

/// Output of a finished run
#[derive(Debug, Clone)]
pub struct EvalRun {
    pub summary: EvalSummary,
    pub results: Vec<DatasetResult>,
    /// `output_dir/{model}_{timestamp}`
    pub output_dir: PathBuf,
}

/// Executor for running an eval config against a model
pub struct EvalExecutor {
    config: EvalConfig,
    client: Arc<dyn ModelClient>,
    registry: DatasetRegistry,
    category_filter: Vec<String>,
    progress_callback: Option<ProgressCallback>,
}

impl EvalExecutor {
    /// Create an executor over the built-in datasets
    pub fn new(config: EvalConfig, client: Arc<dyn ModelClient>) -> Self {
        Self {
            config,
            client,
            registry: rgym_core::dataset::global().clone(),
            category_filter: Vec::new(),
            progress_callback: None,
        }
    }

    /// Use a custom dataset registry
    pub fn with_registry(mut self, registry: DatasetRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Only run the named categories (empty = all)
    pub fn with_category_filter(mut self, categories: Vec<String>) -> Self {
        self.category_filter = categories;
        self
    }

    /// Set progress callback
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run directory for a run started at `timestamp`
    pub fn run_dir(&self, timestamp: DateTime<Utc>) -> PathBuf {
        let model: String = self
            .config
            .model_path
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.config
            .output_dir
            .join(format!("{}_{}", model, timestamp.format("%Y%m%d_%H%M%S")))
    }

    fn selected_categories(&self) -> Vec<&CategoryConfig> {
        self.config
            .categories
            .iter()
            .filter(|c| self.category_filter.is_empty() || self.category_filter.contains(&c.category))
            .collect()
    }

    /// Run every selected dataset, then write `summary.json`
    pub async fn run_all(&self) -> Result<EvalRun> {
        ConfigValidator::validate(&self.config, &self.registry).context("Invalid eval config")?;

        let categories = self.selected_categories();
        if categories.is_empty() {
            bail!("No categories match the filter {:?}", self.category_filter);
        }
        let work: Vec<(&str, &DatasetConfig)> = categories
            .iter()
            .flat_map(|c| {
                let name = c.category.as_str();
                c.datasets.iter().map(move |d| (name, d))
            })
            .collect();

        let timestamp = Utc::now();
        let start_time = Instant::now();
        let output_dir = self.run_dir(timestamp);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

        tracing::info!(
            model = %self.config.model_path,
            datasets = work.len(),
            output_dir = %output_dir.display(),
            "starting evaluation"
        );

        let mut results = Vec::with_capacity(work.len());
        let mut file_names: HashMap<(&str, &str), usize> = HashMap::new();
        for (index, (category, entry)) in work.iter().enumerate() {
            let result = self
                .evaluate_dataset(category, entry, index, work.len())
                .await?;
            if self.config.save_full_results {
                // A dataset listed twice in a category gets `name_2.json`, ...
                let seen = file_names.entry((*category, entry.dataset.as_str())).or_insert(0);
                *seen += 1;
                let file_name = format!("{}.json", result_stem(&entry.dataset, *seen));
                self.save_dataset_result(&output_dir, &file_name, &result)
                    .await?;
            }
            results.push(result);
        }

        let aggregator = MetricsAggregator::new(&self.config.model_path, self.config.eval_repeats);
        let summary = aggregator.aggregate(&results, start_time.elapsed().as_secs_f64(), timestamp);

        let summary_path = output_dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(&summary)?;
        tokio::fs::write(&summary_path, json)
            .await
            .with_context(|| format!("Failed to write summary {:?}", summary_path))?;

        tracing::info!(
            average_mean_score = summary.average_mean_score,
            duration_secs = summary.duration_secs,
            "Saved evaluation summary to {:?}",
            summary_path
        );

        Ok(EvalRun {
            summary,
            results,
            output_dir,
        })
    }

    /// Evaluate a single dataset entry of the config without writing files
    pub async fn run_dataset(&self, category: &str, entry: &DatasetConfig) -> Result<DatasetResult> {
        self.evaluate_dataset(category, entry, 0, 1).await
    }

    async fn evaluate_dataset(
        &self,
        category: &str,
        entry: &DatasetConfig,
        dataset_index: usize,
        dataset_total: usize,
    ) -> Result<DatasetResult> {
        let params = entry.resolved_params(self.config.default_size, self.config.default_seed);
        let dataset = self
            .registry
            .create(&entry.dataset, &params)
            .with_context(|| format!("Failed to create dataset '{}'", entry.dataset))?;
        let system_prompt = self.config.resolved_system_prompt();
        let total = dataset.len();

        tracing::info!(
            category,
            dataset = %entry.dataset,
            size = total,
            seed = dataset.seed(),
            "evaluating dataset"
        );

        let prompt = system_prompt.as_deref();
        let mut completed = 0;
        let mut results: Vec<EntryResult> = stream::iter(dataset.iter().enumerate())
            .map(|(index, item)| self.evaluate_entry(dataset.as_ref(), index, item, prompt))
            .buffer_unordered(self.config.max_concurrent.max(1))
            .inspect(|_| {
                completed += 1;
                self.emit_progress(EvalProgress {
                    category: category.to_string(),
                    dataset: entry.dataset.clone(),
                    dataset_index,
                    dataset_total,
                    completed,
                    total,
                });
            })
            .collect()
            .await;
        results.sort_by_key(|r| r.index);

        let result = DatasetResult::new(
            &entry.dataset,
            category,
            dataset.config_json(),
            system_prompt,
            results,
        );

        tracing::info!(
            dataset = %result.dataset,
            average_best_score = result.average_best_score,
            average_mean_score = result.average_mean_score,
            errors = result.error_count(),
            "dataset complete"
        );

        Ok(result)
    }

    async fn evaluate_entry(
        &self,
        dataset: &dyn ProceduralDataset,
        index: usize,
        entry: Entry,
        system_prompt: Option<&str>,
    ) -> EntryResult {
        let request = self.build_request(&entry.question, system_prompt);
        let mut result = EntryResult::new(index, &entry.question, &entry.answer);
        if self.config.save_metadata {
            result.metadata = Some(entry.metadata.clone());
        }

        for repeat in 0..self.config.eval_repeats {
            match self.client.complete(&request).await {
                Ok(completion) => {
                    let answer = extract_answer(&completion.content, ANSWER_TAG, true);
                    let score = dataset.score_answer(answer.as_deref(), &entry);
                    tracing::debug!(dataset = dataset.name(), index, repeat, score, "scored completion");
                    result.record(score, answer, Some(completion.content));
                }
                Err(e) => {
                    tracing::warn!(
                        dataset = dataset.name(),
                        index,
                        repeat,
                        client = self.client.name(),
                        error = %e,
                        "completion failed, scoring 0"
                    );
                    result.record_error(e.to_string());
                }
            }
        }

        result
    }

    fn build_request(&self, question: &str, system_prompt: Option<&str>) -> CompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = system_prompt {
            messages.push(ChatMessage::new(&self.config.developer_role, prompt));
        }
        messages.push(ChatMessage::user(question));

        CompletionRequest {
            model: self.config.model_path.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        }
    }

    /// Write `{category}/{file_name}` under the run directory
    async fn save_dataset_result(
        &self,
        output_dir: &Path,
        file_name: &str,
        result: &DatasetResult,
    ) -> Result<()> {
        let dir = output_dir.join(&result.category);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(file_name);
        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write dataset results {:?}", path))?;

        tracing::debug!("Saved dataset results to {:?}", path);
        Ok(())
    }

    fn emit_progress(&self, progress: EvalProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Completion;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rgym_core::error::{GymError, GymResult};

    /// Answers every question with the same text
    struct FixedClient(&'static str);

    #[async_trait]
    impl ModelClient for FixedClient {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: &CompletionRequest) -> GymResult<Completion> {
            Ok(Completion::new(self.0))
        }
    }

    struct FailingClient;

    #[async_trait]
    impl ModelClient for FailingClient {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: &CompletionRequest) -> GymResult<Completion> {
            Err(GymError::model_with_status("bad request", 400, false))
        }
    }

    fn config() -> EvalConfig {
        EvalConfig::new("org/model:v1").with_output_dir("out")
    }

    #[test]
    fn test_run_dir_sanitizes_model() {
        let executor = EvalExecutor::new(config(), Arc::new(FixedClient("")));
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            executor.run_dir(timestamp),
            PathBuf::from("out/org_model_v1_20250102_030405")
        );
    }

    #[test]
    fn test_build_request() {
        let mut config = config();
        config.developer_role = "developer".to_string();
        let executor = EvalExecutor::new(config, Arc::new(FixedClient("")));

        let request = executor.build_request("1 + 1 =", Some("think first"));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "developer");
        assert_eq!(request.question(), Some("1 + 1 ="));
        assert_eq!(request.max_tokens, 1024);

        let request = executor.build_request("1 + 1 =", None);
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_run_dataset_scores_fixed_answer() {
        let executor = EvalExecutor::new(
            config().with_eval_repeats(2),
            Arc::new(FixedClient("<think>hmm</think><answer>not a number</answer>")),
        );
        let entry = DatasetConfig::new("chain_sum").with_size(4).with_seed(3);
        let result = executor.run_dataset("arithmetic", &entry).await.unwrap();

        assert_eq!(result.total_examples, 4);
        assert_eq!(result.average_best_score, 0.0);
        let indices: Vec<usize> = result.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        for entry in &result.results {
            assert_eq!(entry.scores.len(), 2);
            assert_eq!(entry.best_model_answer.as_deref(), Some("not a number"));
            assert!(entry.metadata.is_some());
        }
        assert_eq!(result.config["seed"], 3);
    }

    #[tokio::test]
    async fn test_failed_completions_score_zero() {
        let executor = EvalExecutor::new(config(), Arc::new(FailingClient));
        let entry = DatasetConfig::new("chain_sum").with_size(3);
        let result = executor.run_dataset("arithmetic", &entry).await.unwrap();

        assert_eq!(result.error_count(), 3);
        assert!(result.results.iter().all(|r| r.best_score == 0.0));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = EvalConfig::new("m")
            .with_output_dir(dir.path())
            .with_category(CategoryConfig::new("x").with_dataset(DatasetConfig::new("sudoku")));
        let executor = EvalExecutor::new(config, Arc::new(FixedClient("")));
        assert!(executor.run_all().await.is_err());
    }
}
