//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GapFill, PredictorBlueprint, WindowMode};
use inference::StatsEngine;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    channel_count: usize,
    window: String,
    label_count: usize,
    feature_count: usize,
    scaled: bool,
    has_model: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(summarize(&blueprint)),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

fn summarize(blueprint: &PredictorBlueprint) -> ConfigSummary {
    let predictor = &blueprint.predictor;
    let policy = predictor.window_policy();
    ConfigSummary {
        version: format!("{:?}", blueprint.version),
        channel_count: predictor.channels.len(),
        window: match policy.mode {
            WindowMode::Count => format!("last {} frames", policy.size),
            WindowMode::Duration => format!("trailing {} ms", policy.size),
        },
        label_count: predictor.labels.len(),
        feature_count: predictor.feature_count(),
        scaled: predictor.scaler.is_some(),
        has_model: blueprint.model.is_some(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &PredictorBlueprint) -> Vec<String> {
    let predictor = &blueprint.predictor;
    let mut warnings = Vec::new();

    if blueprint.model.is_none() {
        warnings.push("No [model] section - `run` cannot score predictions".to_string());
    }

    for name in &predictor.features.names {
        if !StatsEngine::supports(name) {
            warnings.push(format!(
                "Feature '{}' is not provided by the built-in statistics engine",
                name
            ));
        }
    }

    for channel in &predictor.channels {
        if channel.parse::<ingestion::ChannelKind>().is_err() {
            warnings.push(format!(
                "Channel '{}' is not a device sensor field - only replay input can feed it",
                channel
            ));
        }
    }

    if predictor.gap_fill == GapFill::Interpolate && predictor.channels.len() == 1 {
        warnings.push(
            "gap_fill = \"interpolate\" has no effect with a single channel".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Channels: {}", summary.channel_count);
            println!("  Window: {}", summary.window);
            println!("  Labels: {}", summary.label_count);
            println!("  Features: {}", summary.feature_count);
            println!("  Scaler: {}", if summary.scaled { "yes" } else { "no" });
            println!("  Model: {}", if summary.has_model { "yes" } else { "no" });
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
