//! Command routing logic for CLI

use anyhow::Result;

use crate::args::{Cli, Commands, ConfigAction, DatasetsAction, EvalAction};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Eval { action } => route_eval(action, cli.verbose).await,
        Commands::Config { action } => route_config(action),
        Commands::Datasets { action } => route_datasets(action),
    }
}

async fn route_eval(action: EvalAction, verbose: bool) -> Result<()> {
    match action {
        EvalAction::Run {
            config,
            output_dir,
            base_url,
            api_key,
            categories,
            max_concurrent,
            repeats,
            format,
        } => {
            let options = commands::eval::RunOptions {
                output_dir,
                base_url,
                api_key,
                categories,
                max_concurrent,
                repeats,
                format,
                verbose,
            };
            commands::eval::run(&config, options).await
        }
        EvalAction::Report { input, format } => commands::eval::report(&input, &format),
        EvalAction::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
        } => commands::eval::compare(&baseline, &current, threshold, fail_on_regression),
    }
}

fn route_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Validate { path } => commands::config::validate(&path),
        ConfigAction::Show { path, json } => commands::config::show(&path, json),
    }
}

fn route_datasets(action: DatasetsAction) -> Result<()> {
    match action {
        DatasetsAction::List { category } => commands::datasets::list(category.as_deref()),
        DatasetsAction::Generate {
            name,
            size,
            seed,
            params,
            level,
            format,
        } => {
            let request = commands::datasets::GenerateRequest {
                name,
                size,
                seed,
                params,
                level,
                format,
            };
            commands::datasets::generate(&request)
        }
    }
}
