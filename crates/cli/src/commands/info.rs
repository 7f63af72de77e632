//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{feature_layout, FeatureParams, PredictorBlueprint, WindowMode};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    channels: Vec<ChannelInfo>,
    window: WindowInfo,
    labels: Vec<String>,
    gap_fill: String,
    prune_factor: usize,
    feature_names: Vec<String>,
    #[serde(skip_serializing_if = "FeatureParams::is_empty")]
    feature_params: FeatureParams,
    feature_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    feature_layout: Vec<String>,
    scaled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ModelInfo>,
}

#[derive(Serialize)]
struct ChannelInfo {
    index: usize,
    name: String,
    /// Whether the mock/device router can feed this channel
    device_field: bool,
}

#[derive(Serialize)]
struct WindowInfo {
    mode: &'static str,
    size: u64,
}

#[derive(Serialize)]
struct ModelInfo {
    outputs: usize,
    inputs: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &PredictorBlueprint, args: &InfoArgs) -> ConfigInfo {
    let predictor = &blueprint.predictor;
    let policy = predictor.window_policy();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        channels: predictor
            .channels
            .iter()
            .enumerate()
            .map(|(index, name)| ChannelInfo {
                index,
                name: name.to_string(),
                device_field: ingestion::ChannelKind::from_name(name).is_some(),
            })
            .collect(),
        window: WindowInfo {
            mode: match policy.mode {
                WindowMode::Count => "count",
                WindowMode::Duration => "duration",
            },
            size: policy.size,
        },
        labels: predictor.labels.clone(),
        gap_fill: format!("{:?}", predictor.gap_fill).to_lowercase(),
        prune_factor: predictor.store.prune_factor,
        feature_names: predictor.features.names.clone(),
        feature_params: predictor.features.params.clone(),
        feature_count: predictor.feature_count(),
        feature_layout: if args.features {
            feature_layout(predictor.channels.len(), &predictor.features.names)
        } else {
            Vec::new()
        },
        scaled: predictor.scaler.is_some(),
        model: blueprint.model.as_ref().map(|m| ModelInfo {
            outputs: m.weights.len(),
            inputs: m.weights.first().map_or(0, Vec::len),
        }),
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Predictor Configuration ===\n");
    println!("Version: {}", info.version);

    println!("\nChannels ({}):", info.channels.len());
    for channel in &info.channels {
        let source = if channel.device_field { "device" } else { "replay only" };
        println!("  [{}] {} ({})", channel.index, channel.name, source);
    }

    let unit = if info.window.mode == "count" { "frames" } else { "ms" };
    println!("\nWindow: {} {} {}", info.window.mode, info.window.size, unit);
    println!("Gap fill: {}", info.gap_fill);
    println!("Prune factor: {}", info.prune_factor);

    println!("\nLabels: {}", info.labels.join(", "));

    println!(
        "\nFeatures ({} per channel, {} total): {}",
        info.feature_names.len(),
        info.feature_count,
        info.feature_names.join(", ")
    );
    if !info.feature_params.is_empty() {
        println!("Parameters:");
        for (name, value) in &info.feature_params {
            println!("  {} = {}", name, value);
        }
    }
    if !info.feature_layout.is_empty() {
        println!("\nFeature layout:");
        for (position, id) in info.feature_layout.iter().enumerate() {
            println!("  {:>4}  {}", position, id);
        }
    }

    println!("\nScaler: {}", if info.scaled { "yes" } else { "no" });
    match &info.model {
        Some(model) => println!(
            "Model: linear, {} outputs x {} inputs",
            model.outputs, model.inputs
        ),
        None => println!("Model: none"),
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, PredictorConfig};
    use std::path::PathBuf;

    fn blueprint() -> PredictorBlueprint {
        let mut predictor = PredictorConfig::new(
            vec!["rotationRate.alpha".into(), "heart_rate".into()],
            25,
            vec!["a".into(), "b".into()],
        );
        predictor.features.names = vec!["max".into(), "min".into()];
        PredictorBlueprint {
            version: ConfigVersion::V1,
            predictor,
            model: None,
        }
    }

    fn args(features: bool) -> InfoArgs {
        InfoArgs {
            config: PathBuf::from("config.toml"),
            json: true,
            features,
        }
    }

    #[test]
    fn test_feature_layout_only_on_request() {
        let info = build_config_info(&blueprint(), &args(false));
        assert!(info.feature_layout.is_empty());
        assert_eq!(info.feature_count, 4);

        let info = build_config_info(&blueprint(), &args(true));
        assert_eq!(
            info.feature_layout,
            vec!["0__max", "0__min", "1__max", "1__min"]
        );
    }

    #[test]
    fn test_channel_sources() {
        let info = build_config_info(&blueprint(), &args(false));
        assert!(info.channels[0].device_field);
        assert!(!info.channels[1].device_field);
        assert_eq!(info.window.mode, "count");
        assert_eq!(info.gap_fill, "skip");
    }
}
