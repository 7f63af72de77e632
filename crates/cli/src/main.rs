//! # fusion-predict
//!
//! Runs a sensor-fusion predictor from a configuration file.
//!
//! `run` replays recorded datapoints or drives the mock motion source and
//! prints one JSON prediction per line on stdout. `validate` and `info`
//! inspect a configuration without building an engine. Logs go to stderr.

mod cli;
mod commands;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    observability::init_with_config(logging_config(&cli))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fusion-predict starting");

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };
    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

/// `--quiet` pins the level at warn; otherwise RUST_LOG wins over `-v`.
fn logging_config(cli: &Cli) -> ObservabilityConfig {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: level.to_string(),
        respect_env: !cli.quiet,
    }
}
