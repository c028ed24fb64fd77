//! rgym command-line interface
//!
//! ```bash
//! rgym datasets list
//! rgym datasets generate chain_sum --size 3 --seed 42
//! rgym config validate crates/rgym-eval/configs
//! rgym eval run crates/rgym-eval/configs/example.yaml --base-url http://localhost:8000/v1
//! rgym eval report results/my-model_20250101_120000
//! rgym eval compare results/baseline results/current
//! ```
//!
//! Set `RUST_LOG` to control log output, or pass `--verbose` for debug logs.

mod args;
mod commands;
mod console;
mod router;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    router::route(cli).await
}
