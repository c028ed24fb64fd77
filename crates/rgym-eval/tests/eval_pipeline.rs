//! End-to-end tests for the evaluation runner
//!
//! A mock model answers from a precomputed question -> answer table, so the
//! pipeline from config to `summary.json` runs without a server.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rgym_core::dataset::create_dataset;
use rgym_core::error::{GymError, GymResult};
use rgym_eval::client::{Completion, CompletionRequest, ModelClient};
use rgym_eval::config::EvalConfig;
use rgym_eval::metrics::DatasetResult;
use rgym_eval::report::{ReportFormat, generate_report, load_summary};
use rgym_eval::runner::{EvalExecutor, EvalProgress};
use tempfile::TempDir;

/// Answers every known question correctly
struct OracleClient {
    answers: HashMap<String, String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl OracleClient {
    fn for_config(config: &EvalConfig) -> Self {
        let mut answers = HashMap::new();
        for category in &config.categories {
            for entry in &category.datasets {
                let params = entry.resolved_params(config.default_size, config.default_seed);
                let dataset = create_dataset(&entry.dataset, &params).unwrap();
                for item in dataset.iter() {
                    answers.insert(item.question, item.answer);
                }
            }
        }
        Self {
            answers,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModelClient for OracleClient {
    fn name(&self) -> &str {
        "oracle"
    }

    async fn complete(&self, request: &CompletionRequest) -> GymResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let question = request.question().unwrap_or_default();
        let answer = self
            .answers
            .get(question)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Completion::new(format!(
            "<think>working it out</think>\n<answer>{}</answer>",
            answer
        )))
    }
}

/// Fails the first request for each question, then defers to the oracle
struct FlakyClient {
    oracle: OracleClient,
    seen: Mutex<HashSet<String>>,
}

#[async_trait]
impl ModelClient for FlakyClient {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn complete(&self, request: &CompletionRequest) -> GymResult<Completion> {
        let question = request.question().unwrap_or_default().to_string();
        let first = self.seen.lock().unwrap().insert(question);
        if first {
            return Err(GymError::model_with_status("service unavailable", 503, true));
        }
        self.oracle.complete(request).await
    }
}

fn config(output_dir: &std::path::Path) -> EvalConfig {
    let yaml = format!(
        r#"
model_path: test/oracle
output_dir: {}
save_full_results: true
max_concurrent: 3
default_size: 6
categories:
  - category: arithmetic
    datasets:
      - dataset: chain_sum
        size: 8
        seed: 5
        params:
          max_terms: 3
      - dataset: chain_sum
        seed: 6
  - category: logic
    datasets:
      - dataset: multi_step_reasoning
        size: 4
"#,
        output_dir.display()
    );
    EvalConfig::from_yaml_str(&yaml).unwrap()
}

#[tokio::test]
async fn test_oracle_scores_perfectly() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let client = Arc::new(OracleClient::for_config(&config));
    let executor = EvalExecutor::new(config, client.clone());

    let run = executor.run_all().await.unwrap();
    let summary = &run.summary;

    assert_eq!(summary.model, "test/oracle");
    assert_eq!(summary.total_datasets, 3);
    assert_eq!(summary.total_examples, 8 + 6 + 4);
    assert_eq!(summary.average_best_score, 1.0);
    assert_eq!(summary.average_mean_score, 1.0);
    assert_eq!(summary.categories.len(), 2);
    assert_eq!(client.calls.load(Ordering::SeqCst), 18);
    assert!(client.max_in_flight.load(Ordering::SeqCst) <= 3);

    for result in &run.results {
        let indices: Vec<usize> = result.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..result.total_examples).collect::<Vec<_>>());
        assert!(result.system_prompt.as_deref().unwrap().contains("<answer>"));
    }
}

#[tokio::test]
async fn test_output_files() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let client = Arc::new(OracleClient::for_config(&config));
    let executor = EvalExecutor::new(config, client);

    let run = executor.run_all().await.unwrap();
    assert!(run.output_dir.starts_with(dir.path()));
    let dir_name = run.output_dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(dir_name.starts_with("test_oracle_"));

    let summary = load_summary(&run.output_dir).unwrap();
    assert_eq!(summary.total_examples, run.summary.total_examples);
    assert_eq!(summary.dataset_scores, run.summary.dataset_scores);

    let first = run.output_dir.join("arithmetic/chain_sum.json");
    let second = run.output_dir.join("arithmetic/chain_sum_2.json");
    let logic = run.output_dir.join("logic/multi_step_reasoning.json");
    for path in [&first, &second, &logic] {
        assert!(path.is_file(), "missing {:?}", path);
    }
    for score in &summary.dataset_scores {
        let path = run.output_dir.join(format!("{}.json", score.label()));
        assert!(path.is_file(), "no result file for {}", score.label());
    }
    assert_eq!(summary.dataset_scores[1].occurrence, 2);

    let saved: DatasetResult =
        serde_json::from_str(&std::fs::read_to_string(&second).unwrap()).unwrap();
    assert_eq!(saved.total_examples, 6);
    assert_eq!(saved.config["seed"], 6);
    assert_eq!(saved.results[0].metadata.as_ref().unwrap()["source_dataset"], "chain_sum");

    let report = generate_report(&summary, ReportFormat::Markdown).unwrap();
    assert!(report.contains("| multi_step_reasoning | logic | 4 | 0 | 100.0% | 100.0% |"));
}

#[tokio::test]
async fn test_summary_only_without_full_results() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path());
    config.save_full_results = false;
    config.save_metadata = false;
    let client = Arc::new(OracleClient::for_config(&config));
    let executor = EvalExecutor::new(config, client);

    let run = executor.run_all().await.unwrap();
    let entries: Vec<_> = std::fs::read_dir(&run.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["summary.json"]);
    assert!(run.results[0].results[0].metadata.is_none());
}

#[tokio::test]
async fn test_repeats_with_failures() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path()).with_eval_repeats(2);
    let client = Arc::new(FlakyClient {
        oracle: OracleClient::for_config(&config),
        seen: Mutex::new(HashSet::new()),
    });
    let executor = EvalExecutor::new(config, client);

    let run = executor.run_all().await.unwrap();
    assert_eq!(run.summary.average_best_score, 1.0);
    assert_eq!(run.summary.average_mean_score, 0.5);
    for result in &run.results {
        assert_eq!(result.error_count(), result.total_examples);
        for entry in &result.results {
            assert_eq!(entry.scores, vec![0.0, 1.0]);
            assert!(entry.error.as_deref().unwrap().contains("service unavailable"));
        }
    }
    assert!(run.summary.dataset_scores.iter().all(|d| d.errors == d.total_examples));
}

#[tokio::test]
async fn test_category_filter_and_progress() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let client = Arc::new(OracleClient::for_config(&config));
    let mut executor =
        EvalExecutor::new(config, client).with_category_filter(vec!["logic".to_string()]);

    let updates: Arc<Mutex<Vec<EvalProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    executor.set_progress_callback(Box::new(move |progress| {
        sink.lock().unwrap().push(progress);
    }));

    let run = executor.run_all().await.unwrap();
    assert_eq!(run.summary.total_datasets, 1);
    assert_eq!(run.summary.categories[0].category, "logic");

    let updates = updates.lock().unwrap();
    assert_eq!(updates.len(), 4);
    assert_eq!(updates.last().unwrap().completed, 4);
    assert!(updates.iter().all(|p| p.dataset == "multi_step_reasoning" && p.total == 4));
}

#[tokio::test]
async fn test_unmatched_category_filter_fails() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let client = Arc::new(OracleClient::for_config(&config));
    let executor =
        EvalExecutor::new(config, client).with_category_filter(vec!["geometry".to_string()]);
    assert!(executor.run_all().await.is_err());
}
