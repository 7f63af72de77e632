//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ingestion::Activity;
use std::path::PathBuf;

/// fusion-predict - windowed multi-channel sensor classification
#[derive(Parser, Debug)]
#[command(
    name = "fusion-predict",
    author,
    version,
    about = "Multi-channel sensor fusion predictor",
    long_about = "Buffers timestamped scalar channels, merges them on a shared time axis,\n\
                  extracts per-channel statistics over a trailing window and classifies\n\
                  the result with a linear model from the configuration file."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FUSION_PREDICT_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FUSION_PREDICT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed datapoints into a predictor and print predictions
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display channels, window policy, labels and feature layout
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "FUSION_PREDICT_CONFIG"
    )]
    pub config: PathBuf,

    /// Replay a JSON-lines datapoint file instead of the mock source
    #[arg(short, long, env = "FUSION_PREDICT_INPUT")]
    pub input: Option<PathBuf>,

    /// Movement pattern of the mock motion source
    #[arg(long, default_value = "walking", conflicts_with = "input")]
    pub mock_activity: Activity,

    /// Mock event frequency in Hz
    #[arg(long, default_value = "50", conflicts_with = "input")]
    pub mock_frequency: f64,

    /// Mock source duration in seconds (0 = until stopped)
    #[arg(long, default_value = "10", conflicts_with = "input")]
    pub duration: u64,

    /// Predict after every N accepted datapoints
    #[arg(long, default_value = "50", env = "FUSION_PREDICT_EVERY")]
    pub predict_every: u64,

    /// Stop after this many predictions (0 = unlimited)
    #[arg(long, default_value = "0", env = "FUSION_PREDICT_MAX_PREDICTIONS")]
    pub max_predictions: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "FUSION_PREDICT_TIMEOUT")]
    pub timeout: u64,

    /// Channel buffer size between the mock source and the predictor
    #[arg(long, default_value = "256", env = "FUSION_PREDICT_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FUSION_PREDICT_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every `channelIndex__featureName` identifier
    #[arg(long)]
    pub features: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
