//! Evaluation commands: run a config, print reports, compare runs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use rgym_eval::client::{OpenAiClient, OpenAiClientConfig};
use rgym_eval::config::{EvalConfig, load_config};
use rgym_eval::metrics::RegressionDetector;
use rgym_eval::report::{ReportFormat, generate_comparison, generate_report, load_summary};
use rgym_eval::runner::{EvalExecutor, EvalProgress};

use crate::console::CliConsole;

/// Command-line overrides for `eval run`
#[derive(Debug, Default)]
pub struct RunOptions {
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub categories: Vec<String>,
    pub max_concurrent: Option<usize>,
    pub repeats: Option<u32>,
    pub format: String,
    pub verbose: bool,
}

impl RunOptions {
    /// Layer the overrides onto a loaded config
    pub fn apply(&self, mut config: EvalConfig) -> EvalConfig {
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(n) = self.max_concurrent {
            config = config.with_max_concurrent(n);
        }
        if let Some(n) = self.repeats {
            config = config.with_eval_repeats(n);
        }
        config
    }
}

fn parse_format(format: &str) -> Result<ReportFormat> {
    format.parse::<ReportFormat>().map_err(|e| anyhow!(e))
}

/// Run every dataset in a config against the configured model
pub async fn run(config_path: &Path, options: RunOptions) -> Result<()> {
    let console = CliConsole::new(options.verbose);
    let report_format = parse_format(&options.format)?;

    let config = options.apply(load_config(config_path)?);
    console.info(&format!(
        "Loaded {} with {} datasets ({} entries)",
        config_path.display(),
        config.dataset_count(),
        config.total_entries()
    ));

    let client = match &options.api_key {
        Some(key) => OpenAiClient::new(OpenAiClientConfig::new(&config.base_url).with_api_key(key)),
        None => OpenAiClient::from_env(&config.base_url),
    }
    .context("Failed to create model client")?;

    let model = config.model_path.clone();
    let base_url = config.base_url.clone();
    let mut executor =
        EvalExecutor::new(config, Arc::new(client)).with_category_filter(options.categories);

    let bar = console.dataset_progress(0);
    let progress = bar.clone();
    executor.set_progress_callback(Box::new(move |p: EvalProgress| {
        progress.set_message(format!(
            "[{}/{}] {}/{}",
            p.dataset_index + 1,
            p.dataset_total,
            p.category,
            p.dataset
        ));
        progress.set_length(p.total as u64);
        progress.set_position(p.completed as u64);
    }));

    console.print_header(&format!("Evaluating {} via {}", model, base_url));
    let outcome = executor.run_all().await;
    bar.finish_and_clear();
    let run = outcome?;

    println!("{}", generate_report(&run.summary, report_format)?);
    console.success(&format!("Results saved to {}", run.output_dir.display()));

    let failed: usize = run.summary.dataset_scores.iter().map(|d| d.errors).sum();
    if failed > 0 {
        console.warn(&format!(
            "{} entries had failed completions (scored 0)",
            failed
        ));
    }

    Ok(())
}

/// Print the report for a finished run
pub fn report(input: &Path, format: &str) -> Result<()> {
    let summary = load_summary(input)?;
    let report = generate_report(&summary, parse_format(format)?)?;
    println!("{}", report);
    Ok(())
}

/// Compare two runs and print any regressions
pub fn compare(
    baseline: &Path,
    current: &Path,
    threshold: Option<f64>,
    fail_on_regression: bool,
) -> Result<()> {
    let detector = match threshold {
        Some(t) if t.is_nan() || t < 0.0 => bail!("threshold must be >= 0, got {}", t),
        Some(t) => RegressionDetector::with_threshold(t),
        None => RegressionDetector::with_defaults(),
    };

    let baseline_summary = load_summary(baseline)?;
    let current_summary = load_summary(current)?;
    let regressions = detector.detect(&baseline_summary, &current_summary);

    println!(
        "{}",
        generate_comparison(&baseline_summary, &current_summary, &regressions)
    );

    if fail_on_regression && !regressions.is_empty() {
        bail!("{} regression(s) detected", regressions.len());
    }
    Ok(())
}
