//! Pipeline orchestrator - feeds one predictor and emits predictions.
//!
//! Input is either a JSON-lines replay file or the mock motion source. Every
//! `predict_every` accepted datapoints a prediction is attempted and written
//! to the output as one JSON line.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, PredictorBlueprint};
use inference::{EngineHandle, LinearScorer, Predictor, StatsEngineFactory};
use ingestion::{Activity, EventRouter, MockMotionConfig, MockMotionSource};
use tracing::{debug, info, warn};

use super::PipelineStats;

/// Predictor type driven by the command-line runner
pub type CliPredictor = Predictor<StatsEngineFactory, LinearScorer>;

/// Where datapoints come from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// JSON-lines `{"channel", "value", "timestamp"?}` records
    Replay(PathBuf),

    /// Synthetic device events
    Mock {
        activity: Activity,
        frequency_hz: f64,
        /// None = until stopped
        duration: Option<Duration>,
    },
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub blueprint: PredictorBlueprint,

    pub input: InputSource,

    /// Accepted datapoints between prediction attempts
    pub predict_every: u64,

    /// Maximum number of predictions (None = unlimited)
    pub max_predictions: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Mock source channel capacity
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    predictor: CliPredictor,
}

impl Pipeline {
    /// Build the predictor described by the blueprint.
    ///
    /// # Errors
    /// Missing `[model]` section or a predictor/model that fails construction
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let model = ConfigLoader::require_model(&config.blueprint)
            .context("`run` needs a scoring model")?;
        let scorer = LinearScorer::from_config(model).context("Invalid linear model")?;
        let predictor = Predictor::new(
            config.blueprint.predictor.clone(),
            EngineHandle::shared(StatsEngineFactory),
            scorer,
        )
        .context("Failed to build predictor")?;

        Ok(Self { config, predictor })
    }

    pub fn predictor(&self) -> &CliPredictor {
        &self.predictor
    }

    /// Run until the input ends, the prediction limit is hit, the timeout
    /// expires or `shutdown` resolves.
    pub async fn run<W, S>(&self, out: &mut W, shutdown: S) -> Result<PipelineStats>
    where
        W: Write,
        S: Future<Output = ()>,
    {
        let started = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let timeout = self.config.timeout;
        let deadline = async move {
            match timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };

        let mut stats = PipelineStats::default();
        let outcome = tokio::select! {
            result = self.feed(&mut stats, out) => result,
            _ = deadline => {
                warn!(timeout_secs = ?timeout.map(|t| t.as_secs()), "Pipeline timed out");
                Ok(())
            }
            _ = shutdown => {
                warn!("Received shutdown signal, stopping pipeline...");
                Ok(())
            }
        };
        outcome?;

        stats.duration = started.elapsed();
        stats.store = Some(self.predictor.store_stats());

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            predictions = stats.predictions.total_predictions,
            datapoints = stats.datapoints_accepted,
            "Pipeline finished"
        );
        Ok(stats)
    }

    async fn feed<W: Write>(&self, stats: &mut PipelineStats, out: &mut W) -> Result<()> {
        let mut pending = 0u64;

        match &self.config.input {
            InputSource::Replay(path) => {
                let records = ingestion::read_records(path)
                    .with_context(|| format!("Failed to read replay file {}", path.display()))?;
                info!(path = %path.display(), records = records.len(), "Replaying datapoints");

                for record in records {
                    match self
                        .predictor
                        .add_datapoint(&record.channel, record.value, record.timestamp)
                    {
                        Ok(()) => {
                            stats.datapoints_accepted += 1;
                            pending += 1;
                        }
                        Err(e) => {
                            stats.datapoints_rejected += 1;
                            debug!(channel = %record.channel, error = %e, "datapoint rejected");
                        }
                    }
                    if pending >= self.config.predict_every {
                        pending = 0;
                        if self.predict_once(stats, out).await? == Flow::Stop {
                            return Ok(());
                        }
                    }
                }
            }
            InputSource::Mock {
                activity,
                frequency_hz,
                duration,
            } => {
                let router = EventRouter::new(&self.config.blueprint.predictor.channels)
                    .context("Failed to bind channels to sensor fields")?;
                let source = MockMotionSource::new(MockMotionConfig {
                    activity: *activity,
                    frequency_hz: *frequency_hz,
                    max_ticks: duration.map(|d| (d.as_secs_f64() * frequency_hz).ceil() as u64),
                    ..Default::default()
                })
                .context("Failed to start mock motion source")?;
                info!(%activity, frequency_hz, ?duration, "Running mock motion source");

                let mut rx = source.start(self.config.buffer_size);
                while let Some(event) = rx.recv().await {
                    stats.events_received += 1;
                    match router.route(&event, &self.predictor) {
                        Ok(recorded) => {
                            stats.datapoints_accepted += recorded as u64;
                            pending += recorded as u64;
                        }
                        Err(e) => {
                            stats.datapoints_rejected += 1;
                            warn!(kind = event.kind(), error = %e, "event partially rejected");
                        }
                    }
                    if pending >= self.config.predict_every {
                        pending = 0;
                        if self.predict_once(stats, out).await? == Flow::Stop {
                            source.stop();
                            return Ok(());
                        }
                    }
                }
            }
        }

        // trailing datapoints since the last attempt
        if pending > 0 {
            self.predict_once(stats, out).await?;
        }
        Ok(())
    }

    async fn predict_once<W: Write>(&self, stats: &mut PipelineStats, out: &mut W) -> Result<Flow> {
        match self.predictor.predict_report().await {
            Ok(report) => {
                stats.predictions.record(
                    &report.prediction,
                    report.latency_ms,
                    report.window_frames,
                );
                serde_json::to_writer(&mut *out, &report.prediction)
                    .context("Failed to write prediction")?;
                writeln!(out).context("Failed to write prediction")?;
                info!(
                    label = %report.prediction.label,
                    frames = report.window_frames,
                    latency_ms = format!("{:.3}", report.latency_ms),
                    "Prediction"
                );
            }
            Err(e @ ContractError::InsufficientData { .. }) => {
                stats.predictions.record_failure(&e);
                stats.predictions_skipped += 1;
                debug!(error = %e, "prediction skipped");
                return Ok(Flow::Continue);
            }
            Err(e) => {
                stats.predictions.record_failure(&e);
                return Err(e).context("Prediction failed");
            }
        }

        match self.config.max_predictions {
            Some(max) if stats.predictions.total_predictions >= max => {
                info!(predictions = max, "Reached max predictions limit");
                Ok(Flow::Stop)
            }
            _ => Ok(Flow::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, LinearModelConfig, PredictorConfig};

    /// One channel, count window of 3, mean only; "high" wins above 5.
    fn blueprint() -> PredictorBlueprint {
        let mut predictor =
            PredictorConfig::new(vec!["level".into()], 3, vec!["low".into(), "high".into()]);
        predictor.features.names = vec!["mean".into()];
        PredictorBlueprint {
            version: ConfigVersion::V1,
            predictor,
            model: Some(LinearModelConfig {
                weights: vec![vec![0.0], vec![1.0]],
                bias: vec![5.0, 0.0],
            }),
        }
    }

    fn config(input: InputSource) -> PipelineConfig {
        PipelineConfig {
            blueprint: blueprint(),
            input,
            predict_every: 1,
            max_predictions: None,
            timeout: None,
            buffer_size: 16,
            metrics_port: None,
        }
    }

    fn replay_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    fn predictions(output: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_requires_model() {
        let mut cfg = config(InputSource::Replay(PathBuf::from("unused.jsonl")));
        cfg.blueprint.model = None;
        let err = Pipeline::new(cfg).err().unwrap();
        assert!(format!("{err:#}").contains("[model]"));
    }

    #[tokio::test]
    async fn test_replay_emits_json_lines() {
        let file = replay_file(&[
            r#"{"channel":"level","value":1,"timestamp":10}"#,
            r#"{"channel":"level","value":2,"timestamp":20}"#,
            r#"{"channel":"unknown","value":2,"timestamp":25}"#,
            r#"{"channel":"level","value":3,"timestamp":30}"#,
            r#"{"channel":"level","value":30,"timestamp":40}"#,
        ]);
        let pipeline = Pipeline::new(config(InputSource::Replay(file.path().into()))).unwrap();

        let mut out = Vec::new();
        let stats = pipeline
            .run(&mut out, std::future::pending::<()>())
            .await
            .unwrap();

        // the first two attempts lack three frames
        assert_eq!(stats.predictions_skipped, 2);
        assert_eq!(stats.datapoints_accepted, 4);
        assert_eq!(stats.datapoints_rejected, 1);

        let lines = predictions(&out);
        assert_eq!(lines.len(), 2);
        // mean(1,2,3) = 2 < 5, mean(2,3,30) = 11.67 > 5
        assert_eq!(lines[0]["prediction"], "low");
        assert_eq!(lines[1]["prediction"], "high");
        assert_eq!(lines[1]["result"].as_array().unwrap().len(), 2);
        assert_eq!(stats.store.unwrap().total_samples(), 4);
    }

    #[tokio::test]
    async fn test_max_predictions_stops_early() {
        let file = replay_file(&[
            r#"{"channel":"level","value":1,"timestamp":10}"#,
            r#"{"channel":"level","value":1,"timestamp":20}"#,
            r#"{"channel":"level","value":1,"timestamp":30}"#,
            r#"{"channel":"level","value":1,"timestamp":40}"#,
            r#"{"channel":"level","value":1,"timestamp":50}"#,
        ]);
        let mut cfg = config(InputSource::Replay(file.path().into()));
        cfg.max_predictions = Some(1);
        let pipeline = Pipeline::new(cfg).unwrap();

        let mut out = Vec::new();
        let stats = pipeline
            .run(&mut out, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(predictions(&out).len(), 1);
        assert_eq!(stats.datapoints_accepted, 3);
    }

    #[tokio::test]
    async fn test_trailing_datapoints_predicted() {
        let file = replay_file(&[
            r#"{"channel":"level","value":7,"timestamp":10}"#,
            r#"{"channel":"level","value":8,"timestamp":20}"#,
            r#"{"channel":"level","value":9,"timestamp":30}"#,
        ]);
        let mut cfg = config(InputSource::Replay(file.path().into()));
        cfg.predict_every = 100;
        let pipeline = Pipeline::new(cfg).unwrap();

        let mut out = Vec::new();
        pipeline
            .run(&mut out, std::future::pending::<()>())
            .await
            .unwrap();
        let lines = predictions(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["prediction"], "high");
    }

    #[tokio::test]
    async fn test_shutdown_stops_mock_source() {
        let mut cfg = config(InputSource::Mock {
            activity: Activity::Still,
            frequency_hz: 100.0,
            duration: None,
        });
        cfg.blueprint.predictor.channels = vec!["acceleration.z".into()];
        let pipeline = Pipeline::new(cfg).unwrap();

        let mut out = Vec::new();
        let stats = pipeline
            .run(&mut out, tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();
        assert!(stats.events_received > 0);
        assert!(stats.datapoints_accepted > 0);
    }

    #[tokio::test]
    async fn test_zero_mock_frequency_fails() {
        let mut cfg = config(InputSource::Mock {
            activity: Activity::Walking,
            frequency_hz: 0.0,
            duration: Some(Duration::from_secs(1)),
        });
        cfg.blueprint.predictor.channels = vec!["acceleration.z".into()];
        let pipeline = Pipeline::new(cfg).unwrap();

        let mut out = Vec::new();
        let err = pipeline
            .run(&mut out, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to start mock motion source"));
        assert!(format!("{err:#}").contains("above 0 Hz"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_replay_file() {
        let cfg = config(InputSource::Replay(PathBuf::from("/nonexistent/session.jsonl")));
        let pipeline = Pipeline::new(cfg).unwrap();
        let mut out = Vec::new();
        let err = pipeline
            .run(&mut out, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read replay file"));
    }
}
