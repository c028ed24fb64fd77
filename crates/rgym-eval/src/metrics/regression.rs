//! Regression detection between evaluation runs
//!
//! Compares a current summary against a baseline, dataset by dataset.

use serde::{Deserialize, Serialize};

use super::EvalSummary;

/// A detected regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub regression_type: RegressionType,

    /// Dataset label (`category/dataset`, `_N` for repeated listings), or
    /// `None` for the overall score
    pub dataset: Option<String>,

    pub description: String,

    pub baseline_score: f64,

    pub current_score: f64,

    /// Severity (0.0 - 1.0)
    pub severity: f64,
}

/// Type of regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionType {
    /// A dataset's mean score dropped
    DatasetScoreDecrease,
    /// The overall mean score dropped
    OverallScoreDecrease,
    /// A dataset in the baseline is absent from the current run
    MissingDataset,
}

/// Regression detector configuration
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    /// Largest tolerated drop in a dataset's mean score (e.g. 0.05 = 5 points)
    pub dataset_threshold: f64,

    /// Largest tolerated drop in the overall mean score
    pub overall_threshold: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            dataset_threshold: 0.05,
            overall_threshold: 0.02,
        }
    }
}

/// Detector for finding regressions between evaluation runs
pub struct RegressionDetector {
    config: RegressionConfig,
}

impl RegressionDetector {
    pub fn new(config: RegressionConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RegressionConfig::default())
    }

    /// Same threshold for datasets and the overall score
    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(RegressionConfig {
            dataset_threshold: threshold,
            overall_threshold: threshold,
        })
    }

    /// Compare current results against baseline
    pub fn detect(&self, baseline: &EvalSummary, current: &EvalSummary) -> Vec<Regression> {
        let mut regressions = Vec::new();

        let drop = baseline.average_mean_score - current.average_mean_score;
        if drop > self.config.overall_threshold {
            regressions.push(Regression {
                regression_type: RegressionType::OverallScoreDecrease,
                dataset: None,
                description: format!(
                    "Overall mean score decreased from {:.1}% to {:.1}%",
                    baseline.average_mean_score * 100.0,
                    current.average_mean_score * 100.0
                ),
                baseline_score: baseline.average_mean_score,
                current_score: current.average_mean_score,
                severity: severity(baseline.average_mean_score, drop),
            });
        }

        for base in &baseline.dataset_scores {
            let label = base.label();
            match current.matching_score(base) {
                Some(cur) => {
                    let drop = base.mean_score - cur.mean_score;
                    if drop > self.config.dataset_threshold {
                        regressions.push(Regression {
                            regression_type: RegressionType::DatasetScoreDecrease,
                            description: format!(
                                "{} mean score decreased from {:.1}% to {:.1}%",
                                label,
                                base.mean_score * 100.0,
                                cur.mean_score * 100.0
                            ),
                            dataset: Some(label),
                            baseline_score: base.mean_score,
                            current_score: cur.mean_score,
                            severity: severity(base.mean_score, drop),
                        });
                    }
                }
                None => regressions.push(Regression {
                    regression_type: RegressionType::MissingDataset,
                    description: format!("{} is missing from the current run", label),
                    dataset: Some(label),
                    baseline_score: base.mean_score,
                    current_score: 0.0,
                    severity: 1.0,
                }),
            }
        }

        regressions
    }

    /// Human-readable list of regressions
    pub fn summarize(regressions: &[Regression]) -> String {
        if regressions.is_empty() {
            return "No regressions detected.".to_string();
        }

        let mut output = format!("Detected {} regression(s):\n", regressions.len());
        for reg in regressions {
            let level = if reg.severity >= 0.5 {
                "HIGH"
            } else if reg.severity >= 0.2 {
                "MEDIUM"
            } else {
                "LOW"
            };
            output.push_str(&format!("  [{}] {}\n", level, reg.description));
        }
        output
    }
}

fn severity(baseline: f64, drop: f64) -> f64 {
    (drop / baseline.max(0.01)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DatasetScore;
    use chrono::Utc;

    fn summary(scores: &[(&str, f64)]) -> EvalSummary {
        let mut dataset_scores: Vec<DatasetScore> = Vec::new();
        for &(name, score) in scores {
            let occurrence = dataset_scores.iter().filter(|d| d.dataset == name).count() + 1;
            dataset_scores.push(DatasetScore {
                dataset: name.to_string(),
                category: "c".to_string(),
                occurrence,
                best_score: score,
                mean_score: score,
                total_examples: 10,
                errors: 0,
            });
        }
        let overall = scores.iter().map(|s| s.1).sum::<f64>() / scores.len().max(1) as f64;
        EvalSummary {
            model: "m".to_string(),
            timestamp: Utc::now(),
            version: "0.0.0".to_string(),
            eval_repeats: 1,
            total_datasets: scores.len(),
            total_examples: scores.len() * 10,
            dataset_scores,
            categories: Vec::new(),
            average_best_score: overall,
            average_mean_score: overall,
            duration_secs: 1.0,
        }
    }

    #[test]
    fn test_no_regression() {
        let baseline = summary(&[("chain_sum", 0.8), ("multi_step_reasoning", 0.5)]);
        let current = summary(&[("chain_sum", 0.78), ("multi_step_reasoning", 0.6)]);
        let regressions = RegressionDetector::with_defaults().detect(&baseline, &current);
        assert!(regressions.is_empty());
        assert_eq!(RegressionDetector::summarize(&regressions), "No regressions detected.");
    }

    #[test]
    fn test_dataset_and_overall_regression() {
        let baseline = summary(&[("chain_sum", 0.8), ("multi_step_reasoning", 0.5)]);
        let current = summary(&[("chain_sum", 0.4), ("multi_step_reasoning", 0.5)]);
        let regressions = RegressionDetector::with_defaults().detect(&baseline, &current);

        let types: Vec<RegressionType> = regressions.iter().map(|r| r.regression_type).collect();
        assert_eq!(
            types,
            vec![
                RegressionType::OverallScoreDecrease,
                RegressionType::DatasetScoreDecrease
            ]
        );
        assert_eq!(regressions[1].dataset.as_deref(), Some("c/chain_sum"));
        assert!((regressions[1].severity - 0.5).abs() < 1e-9);
        assert!(RegressionDetector::summarize(&regressions).contains("[HIGH]"));
    }

    #[test]
    fn test_missing_dataset() {
        let baseline = summary(&[("chain_sum", 0.8), ("multi_step_reasoning", 0.5)]);
        let current = summary(&[("chain_sum", 0.8), ("multi_step_reasoning", 0.5)]);
        let mut current = current;
        current.dataset_scores.pop();

        let regressions = RegressionDetector::with_threshold(0.1).detect(&baseline, &current);
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].regression_type, RegressionType::MissingDataset);
    }

    #[test]
    fn test_repeated_listings_compare_in_order() {
        let baseline = summary(&[("chain_sum", 0.5), ("chain_sum", 0.9)]);
        let current = summary(&[("chain_sum", 0.9), ("chain_sum", 0.1)]);
        let regressions = RegressionDetector::with_threshold(0.5).detect(&baseline, &current);

        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].regression_type, RegressionType::DatasetScoreDecrease);
        assert_eq!(regressions[0].dataset.as_deref(), Some("c/chain_sum_2"));
        assert_eq!(regressions[0].baseline_score, 0.9);
        assert_eq!(regressions[0].current_score, 0.1);
    }

    #[test]
    fn test_missing_repeated_listing() {
        let baseline = summary(&[("chain_sum", 0.5), ("chain_sum", 0.5)]);
        let current = summary(&[("chain_sum", 0.5)]);
        let regressions = RegressionDetector::with_threshold(0.1).detect(&baseline, &current);

        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].regression_type, RegressionType::MissingDataset);
        assert_eq!(regressions[0].dataset.as_deref(), Some("c/chain_sum_2"));
    }
}
