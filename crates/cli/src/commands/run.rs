//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{InputSource, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        channels = blueprint.predictor.channels.len(),
        policy = ?blueprint.predictor.window_policy(),
        labels = ?blueprint.predictor.labels,
        gap_fill = ?blueprint.predictor.gap_fill,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    if args.predict_every == 0 {
        anyhow::bail!("--predict-every must be at least 1");
    }
    if args.input.is_none() && !(args.mock_frequency.is_finite() && args.mock_frequency > 0.0) {
        anyhow::bail!(
            "--mock-frequency must be a finite rate above 0 Hz, got {}",
            args.mock_frequency
        );
    }

    let input = match &args.input {
        Some(path) => InputSource::Replay(path.clone()),
        None => InputSource::Mock {
            activity: args.mock_activity,
            frequency_hz: args.mock_frequency,
            duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        },
    };

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        input,
        predict_every: args.predict_every,
        max_predictions: (args.max_predictions > 0).then_some(args.max_predictions),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        buffer_size: args.buffer_size,
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    })?;

    info!(
        features = pipeline.predictor().feature_layout().len(),
        "Starting pipeline..."
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stats = pipeline
        .run(&mut out, shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        predictions = stats.predictions.total_predictions,
        skipped = stats.predictions_skipped,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never resolves; the run then ends by
/// input exhaustion or timeout instead.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
