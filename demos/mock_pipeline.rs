//! Mock Pipeline Example
//!
//! Feeds synthetic device motion through the event router into predictors
//! and prints what they classify. Runs without any device attached.
//!
//! Run with: cargo run --bin mock_pipeline [config.toml]

use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{LinearModelConfig, PredictorBlueprint, PredictorConfig};
use inference::{EngineHandle, LinearScorer, Predictor, StatsEngineFactory};
use ingestion::{Activity, EventRouter, MockMotionConfig, MockMotionSource};
use observability::{LogFormat, ObservabilityConfig, PredictionAggregator};

const FREQUENCY_HZ: f64 = 50.0;
const TICKS_PER_ACTIVITY: u64 = 150;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        ..Default::default()
    })?;

    tracing::info!("Starting Mock Pipeline Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading predictor config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        create_demo_blueprint()
    };
    let model = blueprint
        .model
        .clone()
        .ok_or("configuration has no [model] section")?;

    // ==== Stage 2: One engine shared by every predictor ====
    let engine = EngineHandle::shared(StatsEngineFactory);
    let router = EventRouter::new(&blueprint.predictor.channels)?;
    let mut aggregator = PredictionAggregator::new();

    // ==== Stage 3: Run each activity through a fresh predictor ====
    for activity in [Activity::Still, Activity::Walking, Activity::Shaking] {
        let predictor = Predictor::new(
            blueprint.predictor.clone(),
            Arc::clone(&engine),
            LinearScorer::from_config(&model)?,
        )?;

        let source = MockMotionSource::new(MockMotionConfig {
            name: format!("mock_{activity}"),
            frequency_hz: FREQUENCY_HZ,
            activity,
            max_ticks: Some(TICKS_PER_ACTIVITY),
        })?;
        let mut rx = source.start(64);

        let mut events = 0u64;
        let run = async {
            while let Some(event) = rx.recv().await {
                router.route(&event, &predictor)?;
                events += 1;

                // one attempt per 10 ticks
                if events % 20 != 0 {
                    continue;
                }
                match predictor.predict_report().await {
                    Ok(report) => {
                        aggregator.record(
                            &report.prediction,
                            report.latency_ms,
                            report.window_frames,
                        );
                        tracing::info!(
                            %activity,
                            predicted = %report.prediction.label,
                            scores = ?report.prediction.scores,
                            frames = report.window_frames,
                            "Prediction"
                        );
                    }
                    Err(e) => {
                        aggregator.record_failure(&e);
                        tracing::debug!(%activity, error = %e, "Prediction skipped");
                    }
                }
            }
            Ok::<_, contracts::ContractError>(())
        };

        match tokio::time::timeout(Duration::from_secs(30), run).await {
            Ok(result) => result?,
            Err(_) => {
                source.stop();
                tracing::warn!(%activity, "Activity run timed out");
            }
        }

        let stats = predictor.store_stats();
        tracing::info!(
            %activity,
            events,
            buffered = stats.total_samples(),
            "Activity finished"
        );
    }

    println!("{}", aggregator.summary());
    Ok(())
}

/// Three acceleration channels, default features, and a linear model that
/// separates activities by the spread of vertical acceleration.
fn create_demo_blueprint() -> PredictorBlueprint {
    let predictor = PredictorConfig::new(
        vec![
            "acceleration.x".into(),
            "acceleration.y".into(),
            "acceleration.z".into(),
        ],
        50,
        vec!["still".into(), "walking".into(), "shaking".into()],
    );

    let per_channel = predictor.features.names.len();
    let std_dev = predictor
        .features
        .names
        .iter()
        .position(|n| n == "std_dev")
        .unwrap_or(0);
    let z_std_dev = 2 * per_channel + std_dev;

    // still: 1 - s, walking: 0.4 + 0.3 s, shaking: -1.6 + 0.6 s
    let slopes = [-1.0, 0.3, 0.6];
    let weights = slopes
        .iter()
        .map(|&slope| {
            let mut row = vec![0.0; predictor.feature_count()];
            row[z_std_dev] = slope;
            row
        })
        .collect();

    PredictorBlueprint {
        version: contracts::ConfigVersion::V1,
        predictor,
        model: Some(LinearModelConfig {
            weights,
            bias: vec![1.0, 0.4, -1.6],
        }),
    }
}
