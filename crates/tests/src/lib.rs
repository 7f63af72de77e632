//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - configuration file to working predictor
//! - mock motion source through the event router into a predictor
//! - replayed datapoints with duration windows, interpolation and scaling
//! - one engine shared by concurrent predictors

#[cfg(test)]
mod contract_tests {
    use contracts::{feature_layout, PredictorConfig};
    use inference::{EngineHandle, FnScorer, Predictor, StatsEngineFactory};

    #[test]
    fn test_predictor_layout_matches_config() {
        let config = PredictorConfig::new(
            vec!["a".into(), "b".into(), "c".into()],
            8,
            vec!["only".into()],
        );
        let expected = feature_layout(3, &config.features.names);
        assert_eq!(expected.len(), config.feature_count());

        let predictor = Predictor::new(
            config,
            EngineHandle::shared(StatsEngineFactory),
            FnScorer::new(|_: &[f64]| vec![0.0]),
        )
        .unwrap();
        assert_eq!(predictor.feature_layout(), expected);
        assert!(expected[0].starts_with("0__"));
        assert!(expected.last().unwrap().starts_with("2__"));
    }

    #[test]
    fn test_default_layout_matches_engine() {
        for name in contracts::default_feature_names() {
            assert!(
                inference::StatsEngine::supports(&name),
                "default feature '{}' has no built-in implementation",
                name
            );
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, EngineFactory, PredictorConfig};
    use inference::{
        EngineHandle, FnScorer, LinearScorer, Predictor, StatsEngine, StatsEngineFactory,
    };
    use ingestion::{Activity, ChannelKind, EventRouter, MockMotionConfig, MockMotionSource};
    use observability::PredictionAggregator;

    const REPLAY_CONFIG: &str = r#"
[predictor]
channels = ["a", "b"]
window_size = -100
labels = ["first", "second"]
gap_fill = "interpolate"

[predictor.scaler]
center = [1.0, 0.0, 0.0, 0.0]
scale = [2.0, 1.0, 1.0, 1.0]

[predictor.features]
names = ["mean", "max"]

[model]
weights = [[1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.1, 0.0]]
bias = [0.0, 0.0]
"#;

    const REPLAY_SESSION: &str = r#"
# a and b never share a timestamp
{"channel":"a","value":1,"timestamp":0}
{"channel":"b","value":10,"timestamp":50}
{"channel":"a","value":3,"timestamp":100}
{"channel":"a","value":5,"timestamp":150}
{"channel":"b","value":20,"timestamp":200}
"#;

    /// End-to-end test: config file -> replay records -> Predictor
    ///
    /// The 100 ms window ending at 200 holds frames 100, 150 and 200.
    /// Interpolation fills a = [3, 5, 5] and b = [20, 20, 20].
    #[tokio::test]
    async fn test_e2e_replay_pipeline() {
        let blueprint = ConfigLoader::load_from_str(REPLAY_CONFIG, ConfigFormat::Toml).unwrap();
        let scorer = LinearScorer::from_config(blueprint.model.as_ref().unwrap()).unwrap();
        let predictor = Predictor::new(
            blueprint.predictor.clone(),
            EngineHandle::shared(StatsEngineFactory),
            scorer,
        )
        .unwrap();

        let records = ingestion::parse_records(REPLAY_SESSION.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);
        for record in &records {
            predictor
                .add_datapoint(&record.channel, record.value, record.timestamp)
                .unwrap();
        }

        let report = predictor.predict_report().await.unwrap();
        assert_eq!(report.window_frames, 3);

        let features = report.features.values();
        // (mean(3,5,5) - 1) / 2, max a, mean b, max b
        assert!((features[0] - (13.0 / 3.0 - 1.0) / 2.0).abs() < 1e-9);
        assert_eq!(&features[1..], &[5.0, 20.0, 20.0]);

        assert_eq!(report.prediction.label, "second");
        assert!((report.prediction.scores[1] - 2.0).abs() < 1e-9);
        assert_eq!(
            report.features.names(),
            &["0__mean", "0__max", "1__mean", "1__max"]
        );
    }

    /// End-to-end test: MockMotionSource -> EventRouter -> Predictor
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let channels: Vec<contracts::ChannelId> =
            ChannelKind::ALL.iter().map(|k| k.name().into()).collect();
        let mut config = PredictorConfig::new(
            channels.clone(),
            10,
            vec!["calm".into(), "moving".into()],
        );
        config.features.names = vec!["std_dev".into(), "abs_max".into()];

        // moving when acceleration.z leaves the noise floor
        let z = channels
            .iter()
            .position(|c| c.as_str() == "acceleration.z")
            .unwrap();
        let scorer = FnScorer::new(move |f: &[f64]| vec![0.5, f[z * 2 + 1]]);
        let predictor =
            Predictor::new(config, EngineHandle::shared(StatsEngineFactory), scorer).unwrap();
        let router = EventRouter::new(&channels).unwrap();

        let source = MockMotionSource::new(MockMotionConfig {
            frequency_hz: 200.0,
            activity: Activity::Shaking,
            max_ticks: Some(40),
            ..Default::default()
        })
        .unwrap();
        let mut rx = source.start(32);

        let mut aggregator = PredictionAggregator::new();
        let pipeline = async {
            while let Some(event) = rx.recv().await {
                router.route(&event, &predictor).unwrap();
                match predictor.predict_report().await {
                    Ok(report) => aggregator.record(
                        &report.prediction,
                        report.latency_ms,
                        report.window_frames,
                    ),
                    Err(e) => aggregator.record_failure(&e),
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), pipeline)
            .await
            .expect("Pipeline timed out");

        let metrics = router.metrics().snapshot();
        assert_eq!(metrics.events_routed, 80);
        assert_eq!(metrics.datapoints_recorded, 40 * 12);
        assert_eq!(metrics.fields_skipped, 0);

        let stats = predictor.store_stats();
        assert!(stats.channels.iter().all(|c| c.depth == 40));

        // 40 orientation + 40 motion events; each pair shares a timestamp
        let summary = aggregator.summary();
        assert_eq!(summary.total_predictions + summary.total_failures, 80);
        assert!(summary.failure_counts.get("insufficient_data").is_some());
        assert_eq!(summary.label_counts.get("moving"), Some(&summary.total_predictions));
    }

    struct CountingStats {
        builds: Arc<AtomicUsize>,
    }

    impl EngineFactory for CountingStats {
        type Engine = StatsEngine;

        async fn build(&self) -> Result<StatsEngine, ContractError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(StatsEngine)
        }
    }

    /// Two predictors share one engine; ingestion runs on a blocking thread
    /// while predictions are in flight.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shared_engine_concurrent_predictors() {
        let builds = Arc::new(AtomicUsize::new(0));
        let engine = EngineHandle::shared(CountingStats {
            builds: builds.clone(),
        });

        let mut config =
            PredictorConfig::new(vec!["x".into()], 5, vec!["neg".into(), "pos".into()]);
        config.features.names = vec!["mean".into()];
        let sign = |f: &[f64]| vec![-f[0], f[0]];

        let positive =
            Arc::new(Predictor::new(config.clone(), engine.clone(), FnScorer::new(sign)).unwrap());
        let negative = Predictor::new(config, engine.clone(), FnScorer::new(sign)).unwrap();

        for t in 0..5 {
            positive.add_datapoint("x", 1.0 + t as f64, Some(t * 10)).unwrap();
            negative.add_datapoint("x", -1.0 - t as f64, Some(t * 10)).unwrap();
        }

        let writer = {
            let positive = positive.clone();
            tokio::task::spawn_blocking(move || {
                for t in 5..500 {
                    positive.add_datapoint("x", 1.0, Some(t * 10)).unwrap();
                }
            })
        };
        let (p, n) = tokio::join!(positive.predict(), negative.predict());
        writer.await.unwrap();

        assert_eq!(p.unwrap().label, "pos");
        assert_eq!(n.unwrap().label, "neg");
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(engine.is_initialized());
        assert_eq!(positive.store_stats().last_add_time, Some(4990));
    }

    #[tokio::test]
    async fn test_count_window_underflow() {
        let mut config = PredictorConfig::new(vec!["x".into(), "y".into()], 5, vec!["only".into()]);
        config.features.names = vec!["sum".into()];
        let predictor = Predictor::new(
            config,
            EngineHandle::shared(StatsEngineFactory),
            FnScorer::new(|_: &[f64]| vec![1.0]),
        )
        .unwrap();

        predictor.add_datapoint("x", 1.0, Some(1)).unwrap();
        predictor.add_datapoint("y", 1.0, Some(1)).unwrap();
        predictor.add_datapoint("x", 1.0, Some(2)).unwrap();

        let err = predictor.predict().await.unwrap_err();
        assert!(matches!(
            err,
            ContractError::InsufficientData {
                required: 5,
                available: 2
            }
        ));
        assert!(err.to_string().starts_with("Not enough samples"));
    }

    #[test]
    fn test_config_round_trip_builds_same_predictor() {
        let blueprint = ConfigLoader::load_from_str(REPLAY_CONFIG, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&blueprint).unwrap();
        let reloaded = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(
            reloaded.predictor.window_policy(),
            blueprint.predictor.window_policy()
        );
        assert_eq!(reloaded.predictor.scaler, blueprint.predictor.scaler);
        assert_eq!(reloaded.model, blueprint.model);
        assert_eq!(reloaded.predictor.features.params, blueprint.predictor.features.params);
    }
}
