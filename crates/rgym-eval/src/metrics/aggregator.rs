//! Aggregates dataset results into a run summary

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::types::{CategorySummary, DatasetResult, DatasetScore, EvalSummary, mean};

/// Aggregator for computing a summary from dataset results
pub struct MetricsAggregator {
    model: String,
    eval_repeats: u32,
    version: String,
}

impl MetricsAggregator {
    pub fn new(model: impl Into<String>, eval_repeats: u32) -> Self {
        Self {
            model: model.into(),
            eval_repeats,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build the summary. Category and overall scores are unweighted means
    /// over datasets, so a large dataset does not drown out a small one.
    pub fn aggregate(
        &self,
        results: &[DatasetResult],
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    ) -> EvalSummary {
        let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
        let dataset_scores: Vec<DatasetScore> = results
            .iter()
            .map(|r| {
                let occurrence = seen
                    .entry((r.category.as_str(), r.dataset.as_str()))
                    .or_insert(0);
                *occurrence += 1;
                DatasetScore {
                    dataset: r.dataset.clone(),
                    category: r.category.clone(),
                    occurrence: *occurrence,
                    best_score: r.average_best_score,
                    mean_score: r.average_mean_score,
                    total_examples: r.total_examples,
                    errors: r.error_count(),
                }
            })
            .collect();

        let best: Vec<f64> = dataset_scores.iter().map(|d| d.best_score).collect();
        let means: Vec<f64> = dataset_scores.iter().map(|d| d.mean_score).collect();

        EvalSummary {
            model: self.model.clone(),
            timestamp,
            version: self.version.clone(),
            eval_repeats: self.eval_repeats,
            total_datasets: dataset_scores.len(),
            total_examples: dataset_scores.iter().map(|d| d.total_examples).sum(),
            categories: Self::category_summaries(&dataset_scores),
            average_best_score: mean(&best),
            average_mean_score: mean(&means),
            dataset_scores,
            duration_secs,
        }
    }

    fn category_summaries(scores: &[DatasetScore]) -> Vec<CategorySummary> {
        let mut order: Vec<&str> = Vec::new();
        for score in scores {
            if !order.contains(&score.category.as_str()) {
                order.push(&score.category);
            }
        }

        order
            .into_iter()
            .map(|category| {
                let members: Vec<&DatasetScore> =
                    scores.iter().filter(|s| s.category == category).collect();
                let best: Vec<f64> = members.iter().map(|s| s.best_score).collect();
                let means: Vec<f64> = members.iter().map(|s| s.mean_score).collect();
                CategorySummary {
                    category: category.to_string(),
                    datasets: members.len(),
                    total_examples: members.iter().map(|s| s.total_examples).sum(),
                    average_best_score: mean(&best),
                    average_mean_score: mean(&means),
                }
            })
            .collect()
    }
}
