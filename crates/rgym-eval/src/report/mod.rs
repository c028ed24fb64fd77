//! Report generation for evaluation results
//!
//! Generates reports in various formats (table, JSON, Markdown).

mod json;
mod markdown;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::metrics::{EvalSummary, Regression, RegressionDetector};

/// File name of the run summary inside a run directory
pub const SUMMARY_FILE: &str = "summary.json";

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(format!(
                "unknown report format '{}' (expected table, json or markdown)",
                other
            )),
        }
    }
}

/// Generate a report in the specified format
pub fn generate_report(summary: &EvalSummary, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(summary),
        ReportFormat::Markdown => MarkdownReporter::generate(summary),
        ReportFormat::Table => Ok(generate_table(summary)),
    }
}

/// Load a summary from a `summary.json` file or a run directory holding one
pub fn load_summary(path: impl AsRef<Path>) -> Result<EvalSummary> {
    let path = path.as_ref();
    let file = if path.is_dir() {
        path.join(SUMMARY_FILE)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read summary: {:?}", file))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse summary: {:?}", file))
}

/// Generate a simple table report for terminal output
fn generate_table(summary: &EvalSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= rgym Evaluation Results "));
    output.push_str(&format!(
        "Model: {} | Repeats: {} | rgym: {}\n",
        summary.model, summary.eval_repeats, summary.version
    ));
    output.push_str(&format!(
        "Timestamp: {}\n",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!("Datasets: {}\n", summary.total_datasets));
    output.push_str(&format!("Examples: {}\n", summary.total_examples));
    output.push_str(&format!(
        "Best Score: {:.1}%\n",
        summary.average_best_score * 100.0
    ));
    output.push_str(&format!(
        "Mean Score: {:.1}%\n",
        summary.average_mean_score * 100.0
    ));
    output.push_str(&format!("Total Time: {:.1}s\n\n", summary.duration_secs));

    output.push_str("BY CATEGORY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<24} {:>8} {:>10} {:>12} {:>12}\n",
        "Category", "Datasets", "Examples", "Best", "Mean"
    ));
    output.push_str(&format!("{:-<70}\n", ""));
    for category in &summary.categories {
        output.push_str(&format!(
            "{:<24} {:>8} {:>10} {:>11.1}% {:>11.1}%\n",
            truncate(&category.category, 24),
            category.datasets,
            category.total_examples,
            category.average_best_score * 100.0,
            category.average_mean_score * 100.0
        ));
    }
    output.push_str(&format!("{:-<70}\n\n", ""));

    output.push_str("DATASETS\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>8} {:>8} {:>10} {:>10}\n",
        "Dataset", "Examples", "Errors", "Best", "Mean"
    ));
    output.push_str(&format!("{:-<70}\n", ""));
    for score in &summary.dataset_scores {
        output.push_str(&format!(
            "{:<30} {:>8} {:>8} {:>9.1}% {:>9.1}%\n",
            truncate(&score.label(), 30),
            score.total_examples,
            score.errors,
            score.best_score * 100.0,
            score.mean_score * 100.0
        ));
    }
    output.push_str(&format!("{:=<70}\n", ""));

    output
}

/// Side-by-side comparison of two runs followed by detected regressions
pub fn generate_comparison(
    baseline: &EvalSummary,
    current: &EvalSummary,
    regressions: &[Regression],
) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Comparison: {} ({}) vs {} ({})\n\n",
        baseline.model,
        baseline.timestamp.format("%Y-%m-%d %H:%M"),
        current.model,
        current.timestamp.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "{:<30} {:>12} {:>12} {:>12}\n",
        "Dataset", "Baseline", "Current", "Change"
    ));
    output.push_str(&format!("{:-<70}\n", ""));

    for base in &baseline.dataset_scores {
        match current.matching_score(base) {
            Some(cur) => output.push_str(&format!(
                "{:<30} {:>11.1}% {:>11.1}% {:>+11.1}%\n",
                truncate(&base.label(), 30),
                base.mean_score * 100.0,
                cur.mean_score * 100.0,
                (cur.mean_score - base.mean_score) * 100.0
            )),
            None => output.push_str(&format!(
                "{:<30} {:>11.1}% {:>12} {:>12}\n",
                truncate(&base.label(), 30),
                base.mean_score * 100.0,
                "-",
                "-"
            )),
        }
    }
    for cur in &current.dataset_scores {
        if baseline.matching_score(cur).is_none() {
            output.push_str(&format!(
                "{:<30} {:>12} {:>11.1}% {:>12}\n",
                truncate(&cur.label(), 30),
                "-",
                cur.mean_score * 100.0,
                "new"
            ));
        }
    }

    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>11.1}% {:>11.1}% {:>+11.1}%\n\n",
        "Overall",
        baseline.average_mean_score * 100.0,
        current.average_mean_score * 100.0,
        (current.average_mean_score - baseline.average_mean_score) * 100.0
    ));
    output.push_str(&RegressionDetector::summarize(regressions));
    output
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let head: String = name.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
