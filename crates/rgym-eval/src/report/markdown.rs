//! Markdown report generation

use anyhow::Result;

use crate::metrics::{EvalSummary, result_stem};

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(summary: &EvalSummary) -> Result<String> {
        let mut md = String::new();

        md.push_str("# rgym Evaluation Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Model**: {}\n", summary.model));
        md.push_str(&format!("- **rgym Version**: {}\n", summary.version));
        md.push_str(&format!("- **Eval Repeats**: {}\n", summary.eval_repeats));
        md.push_str(&format!(
            "- **Timestamp**: {}\n",
            summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!(
            "- **Total Execution Time**: {:.1}s\n\n",
            summary.duration_secs
        ));

        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!("| Datasets | {} |\n", summary.total_datasets));
        md.push_str(&format!("| Examples | {} |\n", summary.total_examples));
        md.push_str(&format!(
            "| Best Score | {:.1}% |\n",
            summary.average_best_score * 100.0
        ));
        md.push_str(&format!(
            "| Mean Score | {:.1}% |\n\n",
            summary.average_mean_score * 100.0
        ));

        md.push_str("## Results by Category\n\n");
        md.push_str("| Category | Datasets | Examples | Best | Mean |\n");
        md.push_str("|----------|----------|----------|------|------|\n");
        for category in &summary.categories {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% | {:.1}% |\n",
                category.category,
                category.datasets,
                category.total_examples,
                category.average_best_score * 100.0,
                category.average_mean_score * 100.0
            ));
        }
        md.push('\n');

        md.push_str("## Dataset Results\n\n");
        md.push_str("| Dataset | Category | Examples | Errors | Best | Mean |\n");
        md.push_str("|---------|----------|----------|--------|------|------|\n");
        for score in &summary.dataset_scores {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:.1}% | {:.1}% |\n",
                result_stem(&score.dataset, score.occurrence),
                score.category,
                score.total_examples,
                score.errors,
                score.best_score * 100.0,
                score.mean_score * 100.0
            ));
        }
        md.push('\n');

        let with_errors: Vec<_> = summary
            .dataset_scores
            .iter()
            .filter(|s| s.errors > 0)
            .collect();
        if !with_errors.is_empty() {
            md.push_str("## Completion Errors\n\n");
            for score in with_errors {
                md.push_str(&format!(
                    "- **{}**: {} of {} entries had failed completions\n",
                    score.dataset, score.errors, score.total_examples
                ));
            }
            md.push('\n');
        }

        Ok(md)
    }
}
