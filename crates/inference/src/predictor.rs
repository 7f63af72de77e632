//! Predictor - ingestion and on-demand prediction over one sample store.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use contracts::{
    feature_layout, ContractError, DatapointSink, EngineFactory, ExtractionEngine, FeatureVector,
    GapFill, Prediction, PredictorConfig, ScoringFunction, Timestamp, Window,
};
use serde::Serialize;
use sync_engine::{interpolate_window, select_window, SampleStore, StoreStats};
use tracing::{debug, instrument};

use crate::classifier::classify;
use crate::extract::FeatureExtractor;
use crate::scaler::{scale_optional, Scaler};
use crate::EngineHandle;

/// One prediction together with what produced it.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub prediction: Prediction,
    /// Feature vector after scaling
    pub features: FeatureVector,
    pub window_frames: usize,
    pub latency_ms: f64,
}

/// Owns the sample store; predicts from a snapshot of it.
///
/// `add_datapoint` never suspends. `predict` reads the store once under a
/// shared lock, releases it, and only then awaits the engine and the scorer,
/// so ingestion may interleave with any number of in-flight predictions.
pub struct Predictor<F: EngineFactory, S> {
    config: PredictorConfig,
    store: RwLock<SampleStore>,
    extractor: FeatureExtractor<F>,
    scaler: Option<Scaler>,
    scorer: S,
}

impl<F, S> Predictor<F, S>
where
    F: EngineFactory + Sync,
    F::Engine: ExtractionEngine + Sync,
    S: ScoringFunction + Sync,
{
    /// # Errors
    /// `InvalidInput` for a zero window size, an empty label or feature list,
    /// an invalid channel set, or scaler arrays that do not match the
    /// feature layout
    pub fn new(
        config: PredictorConfig,
        engine: Arc<EngineHandle<F>>,
        scorer: S,
    ) -> Result<Self, ContractError> {
        if config.window_size == 0 {
            return Err(ContractError::invalid_input("window_size must be non-zero"));
        }
        if config.labels.is_empty() {
            return Err(ContractError::invalid_input("at least one label is required"));
        }
        if config.features.names.is_empty() {
            return Err(ContractError::invalid_input("at least one feature name is required"));
        }

        let store = SampleStore::from_config(&config)?;
        let scaler = config.scaler.as_ref().map(Scaler::from_params).transpose()?;
        if let Some(scaler) = &scaler {
            if scaler.len() != config.feature_count() {
                return Err(ContractError::invalid_input(format!(
                    "scaler has {} entries, feature vector has {}",
                    scaler.len(),
                    config.feature_count()
                )));
            }
        }
        let extractor = FeatureExtractor::new(
            engine,
            config.features.names.clone(),
            config.features.params.clone(),
        );

        debug!(
            channels = config.channels.len(),
            policy = ?config.window_policy(),
            labels = config.labels.len(),
            scaled = scaler.is_some(),
            "predictor created"
        );

        Ok(Self {
            config,
            store: RwLock::new(store),
            extractor,
            scaler,
            scorer,
        })
    }

    /// Record one sample; `None` timestamp means wall clock.
    ///
    /// # Errors
    /// `InvalidInput` for an unknown channel or a NaN value
    #[instrument(name = "predictor_add_datapoint", level = "trace", skip(self))]
    pub fn add_datapoint(
        &self,
        channel: &str,
        value: f64,
        timestamp: Option<Timestamp>,
    ) -> Result<(), ContractError> {
        self.write_store().add_sample(channel, value, timestamp)?;
        Ok(())
    }

    /// Merge, window, extract, scale and classify.
    ///
    /// # Errors
    /// `InsufficientData` on count-mode underflow (or an all-missing channel
    /// when interpolating); engine and scorer errors pass through unchanged
    pub async fn predict(&self) -> Result<Prediction, ContractError> {
        self.predict_report().await.map(|report| report.prediction)
    }

    /// [`predict`](Self::predict) with the scaled features and timings.
    #[instrument(
        name = "predictor_predict",
        skip(self),
        fields(channels = self.config.channels.len())
    )]
    pub async fn predict_report(&self) -> Result<PredictionReport, ContractError> {
        let started = Instant::now();
        match self.run(started).await {
            Ok(report) => {
                observability::record_prediction(&report.prediction.label, report.latency_ms);
                debug!(
                    label = %report.prediction.label,
                    frames = report.window_frames,
                    latency_ms = report.latency_ms,
                    "prediction complete"
                );
                Ok(report)
            }
            Err(e) => {
                observability::record_prediction_failure(&e);
                debug!(error = %e, "prediction failed");
                Err(e)
            }
        }
    }

    async fn run(&self, started: Instant) -> Result<PredictionReport, ContractError> {
        let window = self.snapshot_window()?;
        let window_frames = window.len();
        let columns = self.channel_columns(&window)?;

        let features = self.extractor.extract(&columns).await?;
        let features = scale_optional(self.scaler.as_ref(), features)?;
        let prediction = classify(&features, &self.scorer, &self.config.labels).await?;

        Ok(PredictionReport {
            prediction,
            features,
            window_frames,
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Current trailing window, taken under one read of the store.
    pub fn snapshot_window(&self) -> Result<Window, ContractError> {
        let store = self.read_store();
        select_window(store.merged(), store.policy(), store.last_add_time())
    }

    fn channel_columns(&self, window: &Window) -> Result<Vec<Vec<f64>>, ContractError> {
        let channel_count = self.config.channels.len();
        match self.config.gap_fill {
            GapFill::Skip => Ok((0..channel_count).map(|c| window.channel_values(c)).collect()),
            GapFill::Interpolate => interpolate_window(window, channel_count),
        }
    }
}

impl<F: EngineFactory, S> Predictor<F, S> {
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn labels(&self) -> &[String] {
        &self.config.labels
    }

    /// `channelIndex__featureName` identifiers in vector order
    pub fn feature_layout(&self) -> Vec<String> {
        feature_layout(self.config.channels.len(), &self.config.features.names)
    }

    pub fn store_stats(&self) -> StoreStats {
        self.read_store().stats()
    }

    fn read_store(&self) -> RwLockReadGuard<'_, SampleStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, SampleStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F, S> DatapointSink for Predictor<F, S>
where
    F: EngineFactory + Sync,
    F::Engine: ExtractionEngine + Sync,
    S: ScoringFunction + Sync,
{
    fn add_datapoint(
        &self,
        channel: &str,
        value: f64,
        timestamp: Option<Timestamp>,
    ) -> Result<(), ContractError> {
        Predictor::add_datapoint(self, channel, value, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FnScorer, StatsEngineFactory};
    use contracts::{FeatureParams, ScalerParams, WindowingMode};
    use std::collections::HashMap;

    /// Engine echoing the last value of the series under every name, plus
    /// a key nobody asked for.
    struct EchoEngine;

    impl ExtractionEngine for EchoEngine {
        async fn extract_features(
            &self,
            feature_names: &[String],
            series: &[f64],
            _params: &FeatureParams,
        ) -> Result<HashMap<String, f64>, ContractError> {
            let last = series.last().copied().unwrap_or(f64::NAN);
            let mut out: HashMap<String, f64> = feature_names
                .iter()
                .enumerate()
                .rev()
                .map(|(i, n)| (n.clone(), last * 10.0 + i as f64))
                .collect();
            out.insert("unrequested".into(), -1.0);
            Ok(out)
        }
    }

    struct EchoFactory;

    impl EngineFactory for EchoFactory {
        type Engine = EchoEngine;

        async fn build(&self) -> Result<EchoEngine, ContractError> {
            Ok(EchoEngine)
        }
    }

    fn config(window_size: i64) -> PredictorConfig {
        let mut config = PredictorConfig::new(
            vec!["a".into(), "b".into()],
            window_size,
            vec!["low".into(), "high".into()],
        );
        config.features.names = vec!["mean".into(), "max".into()];
        config
    }

    fn identity() -> FnScorer<impl Fn(&[f64]) -> Vec<f64> + Send + Sync> {
        FnScorer::new(|x: &[f64]| vec![x[0], x[1]])
    }

    #[tokio::test]
    async fn test_count_window_underflow() {
        let predictor =
            Predictor::new(config(3), EngineHandle::shared(StatsEngineFactory), identity()).unwrap();
        predictor.add_datapoint("a", 1.0, Some(1)).unwrap();
        predictor.add_datapoint("b", 2.0, Some(2)).unwrap();

        let err = predictor.predict().await.unwrap_err();
        assert!(matches!(
            err,
            ContractError::InsufficientData {
                required: 3,
                available: 2
            }
        ));
        assert!(err.to_string().starts_with("Not enough samples"));
    }

    #[tokio::test]
    async fn test_feature_layout_and_scaling() {
        let mut cfg = config(2);
        cfg.scaler = Some(ScalerParams {
            center: vec![0.0, 0.0, 0.0, 0.0],
            scale: vec![1.0, 2.0, 1.0, 1.0],
        });
        let predictor = Predictor::new(cfg, EngineHandle::shared(EchoFactory), identity()).unwrap();
        for (t, a, b) in [(1, 1.0, 3.0), (2, 2.0, 4.0)] {
            predictor.add_datapoint("a", a, Some(t)).unwrap();
            predictor.add_datapoint("b", b, Some(t)).unwrap();
        }

        let report = predictor.predict_report().await.unwrap();
        assert_eq!(
            report.features.names(),
            &["0__mean", "0__max", "1__mean", "1__max"]
        );
        // a: last 2.0 -> mean 20, max 21 / 2; b: last 4.0 -> 40, 41
        assert_eq!(report.features.values(), &[20.0, 10.5, 40.0, 41.0]);
        assert_eq!(report.prediction.label, "low");
        assert_eq!(report.window_frames, 2);
        assert_eq!(predictor.feature_layout(), report.features.names());
    }

    #[tokio::test]
    async fn test_predict_does_not_consume_samples() {
        let predictor =
            Predictor::new(config(2), EngineHandle::shared(StatsEngineFactory), identity()).unwrap();
        for t in 0..4 {
            predictor.add_datapoint("a", t as f64, Some(t)).unwrap();
            predictor.add_datapoint("b", -(t as f64), Some(t)).unwrap();
        }
        let before = predictor.store_stats().total_samples();
        let first = predictor.predict().await.unwrap();
        let second = predictor.predict().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(predictor.store_stats().total_samples(), before);
        // mean and max of a over [2, 3]
        assert_eq!(first.label, "high");
        assert_eq!(first.scores, vec![2.5, 3.0]);
    }

    #[tokio::test]
    async fn test_duration_window_may_be_short() {
        let mut cfg = config(-100);
        cfg.windowing_mode = Some(WindowingMode::Time);
        let predictor =
            Predictor::new(cfg, EngineHandle::shared(StatsEngineFactory), identity()).unwrap();
        predictor.add_datapoint("a", 5.0, Some(1_000)).unwrap();
        predictor.add_datapoint("b", 7.0, Some(1_050)).unwrap();
        predictor.add_datapoint("a", 9.0, Some(1_200)).unwrap();

        let report = predictor.predict_report().await.unwrap();
        assert_eq!(report.window_frames, 1);
        // only a@1200 is inside the window; b's features are NaN
        assert_eq!(report.prediction.label, "low");
        assert_eq!(report.prediction.scores[0], 9.0);
    }

    #[tokio::test]
    async fn test_interpolated_gap_fill() {
        let mut cfg = config(3);
        cfg.gap_fill = GapFill::Interpolate;
        let predictor =
            Predictor::new(cfg, EngineHandle::shared(StatsEngineFactory), identity()).unwrap();
        predictor.add_datapoint("a", 0.0, Some(1)).unwrap();
        predictor.add_datapoint("b", 1.0, Some(2)).unwrap();
        predictor.add_datapoint("a", 6.0, Some(3)).unwrap();

        let report = predictor.predict_report().await.unwrap();
        // a = [0, 3, 6], b = [1, 1, 1]
        assert_eq!(report.features.get("0__mean"), Some(3.0));
        assert_eq!(report.features.get("1__mean"), Some(1.0));

        predictor.add_datapoint("a", 1.0, Some(4)).unwrap();
        // window [2, 3, 4]: fine, b still has one value
        assert!(predictor.predict().await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_inputs() {
        let predictor =
            Predictor::new(config(2), EngineHandle::shared(StatsEngineFactory), identity()).unwrap();
        assert!(predictor.add_datapoint("c", 1.0, None).is_err());
        assert!(predictor.add_datapoint("a", f64::NAN, None).is_err());
        assert_eq!(predictor.store_stats().total_samples(), 0);

        let sink: &dyn DatapointSink = &predictor;
        sink.add_datapoint("b", 1.0, Some(5)).unwrap();
        assert_eq!(predictor.store_stats().last_add_time, Some(5));
    }

    #[test]
    fn test_rejects_inconsistent_config() {
        let engine = EngineHandle::shared(StatsEngineFactory);
        assert!(Predictor::new(config(0), engine.clone(), identity()).is_err());

        let mut cfg = config(2);
        cfg.scaler = Some(ScalerParams {
            center: vec![0.0],
            scale: vec![1.0],
        });
        assert!(Predictor::new(cfg, engine.clone(), identity()).is_err());

        let mut cfg = config(2);
        cfg.channels.push("a".into());
        assert!(Predictor::new(cfg, engine, identity()).is_err());
    }

    #[tokio::test]
    async fn test_concurrent_predictions_share_engine() {
        let engine = EngineHandle::shared(StatsEngineFactory);
        let predictor = Predictor::new(config(1), engine.clone(), identity()).unwrap();
        predictor.add_datapoint("a", 1.0, Some(1)).unwrap();
        predictor.add_datapoint("b", 0.0, Some(1)).unwrap();

        let (x, y) = tokio::join!(predictor.predict(), predictor.predict());
        assert_eq!(x.unwrap(), y.unwrap());
        assert!(engine.is_initialized());
    }
}
