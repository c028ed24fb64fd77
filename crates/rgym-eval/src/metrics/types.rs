//! Result types written to disk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one dataset entry across all repeats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryResult {
    /// Entry index within the dataset
    pub index: usize,

    pub question: String,

    pub expected_answer: String,

    /// Extracted answer of the best-scoring repeat
    pub best_model_answer: Option<String>,

    /// Raw completion of the best-scoring repeat
    pub best_full_model_response: Option<String>,

    pub best_score: f64,

    pub mean_score: f64,

    /// Score of every repeat, in request order
    pub scores: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Last completion error, if any repeat failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryResult {
    pub fn new(index: usize, question: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            index,
            question: question.into(),
            expected_answer: expected_answer.into(),
            best_model_answer: None,
            best_full_model_response: None,
            best_score: 0.0,
            mean_score: 0.0,
            scores: Vec::new(),
            metadata: None,
            error: None,
        }
    }

    /// Record a scored repeat; the first repeat with the highest score is kept
    pub fn record(&mut self, score: f64, answer: Option<String>, response: Option<String>) {
        if self.scores.is_empty() || score > self.best_score {
            self.best_score = score;
            self.best_model_answer = answer;
            self.best_full_model_response = response;
        }
        self.scores.push(score);
        self.mean_score = mean(&self.scores);
    }

    /// Record a failed repeat as a zero score
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.record(0.0, None, None);
    }

    /// Whether the best repeat was fully correct
    pub fn is_correct(&self) -> bool {
        self.best_score >= 1.0
    }
}

/// Everything produced for one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResult {
    pub dataset: String,

    pub category: String,

    pub average_best_score: f64,

    pub average_mean_score: f64,

    pub total_examples: usize,

    /// Resolved dataset config, including the seed actually used
    pub config: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    pub results: Vec<EntryResult>,
}

impl DatasetResult {
    pub fn new(
        dataset: impl Into<String>,
        category: impl Into<String>,
        config: Value,
        system_prompt: Option<String>,
        results: Vec<EntryResult>,
    ) -> Self {
        let best: Vec<f64> = results.iter().map(|r| r.best_score).collect();
        let means: Vec<f64> = results.iter().map(|r| r.mean_score).collect();
        Self {
            dataset: dataset.into(),
            category: category.into(),
            average_best_score: mean(&best),
            average_mean_score: mean(&means),
            total_examples: results.len(),
            config,
            system_prompt,
            results,
        }
    }

    /// Entries with at least one failed completion
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct()).count()
    }
}

/// Per-dataset line of a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetScore {
    pub dataset: String,
    pub category: String,
    /// 1 for the first listing of `dataset` in `category`, 2 for the next, ...
    #[serde(default = "first_occurrence")]
    pub occurrence: usize,
    pub best_score: f64,
    pub mean_score: f64,
    pub total_examples: usize,
    #[serde(default)]
    pub errors: usize,
}

fn first_occurrence() -> usize {
    1
}

impl DatasetScore {
    /// `category/dataset`, suffixed `_N` for repeated listings. This is also
    /// the result file path relative to the run directory, minus `.json`.
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.category,
            result_stem(&self.dataset, self.occurrence)
        )
    }

    /// Whether both scores come from the same config listing
    pub fn same_listing(&self, other: &DatasetScore) -> bool {
        self.category == other.category
            && self.dataset == other.dataset
            && self.occurrence == other.occurrence
    }
}

/// File stem for the `occurrence`-th listing of a dataset in a category
pub fn result_stem(dataset: &str, occurrence: usize) -> String {
    if occurrence <= 1 {
        dataset.to_string()
    } else {
        format!("{}_{}", dataset, occurrence)
    }
}

/// Per-category averages over datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub datasets: usize,
    pub total_examples: usize,
    pub average_best_score: f64,
    pub average_mean_score: f64,
}

/// Summary of an evaluation run (`summary.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub model: String,

    pub timestamp: DateTime<Utc>,

    /// rgym version that produced the run
    pub version: String,

    pub eval_repeats: u32,

    pub total_datasets: usize,

    pub total_examples: usize,

    /// In config order
    pub dataset_scores: Vec<DatasetScore>,

    /// In config order
    pub categories: Vec<CategorySummary>,

    pub average_best_score: f64,

    pub average_mean_score: f64,

    pub duration_secs: f64,
}

impl EvalSummary {
    /// Score of the first listing of `dataset` in any category
    pub fn dataset_score(&self, dataset: &str) -> Option<&DatasetScore> {
        self.dataset_scores.iter().find(|d| d.dataset == dataset)
    }

    /// Score for the same config listing as `other`
    pub fn matching_score(&self, other: &DatasetScore) -> Option<&DatasetScore> {
        self.dataset_scores.iter().find(|d| d.same_listing(other))
    }

    pub fn category(&self, category: &str) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Arithmetic mean; 0.0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_result_keeps_best_repeat() {
        let mut entry = EntryResult::new(0, "1 + 1 =", "2");
        entry.record(0.0, Some("3".to_string()), Some("<answer>3</answer>".to_string()));
        entry.record(1.0, Some("2".to_string()), Some("<answer>2</answer>".to_string()));
        entry.record(1.0, Some("2 ".to_string()), None);

        assert_eq!(entry.best_score, 1.0);
        assert_eq!(entry.best_model_answer.as_deref(), Some("2"));
        assert_eq!(entry.best_full_model_response.as_deref(), Some("<answer>2</answer>"));
        assert_eq!(entry.scores, vec![0.0, 1.0, 1.0]);
        assert!((entry.mean_score - 2.0 / 3.0).abs() < 1e-9);
        assert!(entry.is_correct());
    }

    #[test]
    fn test_entry_result_error() {
        let mut entry = EntryResult::new(0, "q", "a");
        entry.record_error("connection refused");
        assert_eq!(entry.scores, vec![0.0]);
        assert_eq!(entry.error.as_deref(), Some("connection refused"));
        assert!(entry.best_model_answer.is_none());
    }

    #[test]
    fn test_labels_follow_result_files() {
        let mut score = DatasetScore {
            dataset: "chain_sum".to_string(),
            category: "arithmetic".to_string(),
            occurrence: 1,
            best_score: 1.0,
            mean_score: 1.0,
            total_examples: 1,
            errors: 0,
        };
        assert_eq!(score.label(), "arithmetic/chain_sum");
        score.occurrence = 2;
        assert_eq!(score.label(), "arithmetic/chain_sum_2");
        assert_eq!(result_stem("chain_sum", 3), "chain_sum_3");

        let legacy: DatasetScore = serde_json::from_str(
            r#"{"dataset":"d","category":"c","best_score":0.5,"mean_score":0.5,"total_examples":2}"#,
        )
        .unwrap();
        assert_eq!(legacy.occurrence, 1);
    }

    #[test]
    fn test_dataset_result_averages() {
        let mut a = EntryResult::new(0, "q0", "a");
        a.record(1.0, None, None);
        a.record(0.0, None, None);
        let mut b = EntryResult::new(1, "q1", "b");
        b.record(0.0, None, None);
        b.record(0.0, None, None);

        let result = DatasetResult::new("chain_sum", "arithmetic", Value::Null, None, vec![a, b]);
        assert_eq!(result.total_examples, 2);
        assert_eq!(result.average_best_score, 0.5);
        assert_eq!(result.average_mean_score, 0.25);
        assert_eq!(result.correct_count(), 1);

        let empty = DatasetResult::new("chain_sum", "arithmetic", Value::Null, None, Vec::new());
        assert_eq!(empty.average_best_score, 0.0);
    }
}
