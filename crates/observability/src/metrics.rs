//! Predictor metric collection.
//!
//! Thin wrappers over the `metrics` facade plus an in-memory aggregator used
//! for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::{ContractError, Prediction};
use metrics::{counter, gauge, histogram};

/// Record one accepted datapoint.
pub fn record_datapoint_ingested(channel: &str) {
    counter!(
        "fusion_datapoints_ingested_total",
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// Record one datapoint rejected at ingestion.
pub fn record_datapoint_rejected(reason: &'static str) {
    counter!("fusion_datapoints_rejected_total", "reason" => reason).increment(1);
}

/// Record a sample older than the retained horizon at insert time.
pub fn record_stale_sample(channel: &str) {
    counter!(
        "fusion_stale_samples_total",
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// Record samples removed from one channel buffer by pruning.
pub fn record_samples_pruned(channel: &str, removed: usize) {
    if removed == 0 {
        return;
    }
    counter!(
        "fusion_samples_pruned_total",
        "channel" => channel.to_string()
    )
    .increment(removed as u64);
}

/// Record the depth of one channel buffer.
pub fn record_buffer_depth(channel: &str, depth: usize) {
    gauge!(
        "fusion_buffer_depth",
        "channel" => channel.to_string()
    )
    .set(depth as f64);
}

/// Record one construction of the extraction engine.
pub fn record_engine_initialized(elapsed_ms: f64) {
    counter!("fusion_engine_initializations_total").increment(1);
    histogram!("fusion_engine_init_ms").record(elapsed_ms);
}

/// Record a successful prediction.
pub fn record_prediction(label: &str, latency_ms: f64) {
    counter!(
        "fusion_predictions_total",
        "label" => label.to_string()
    )
    .increment(1);
    histogram!("fusion_prediction_latency_ms").record(latency_ms);
}

/// Record a failed prediction by error kind.
pub fn record_prediction_failure(error: &ContractError) {
    counter!(
        "fusion_prediction_failures_total",
        "kind" => error.kind()
    )
    .increment(1);
}

/// In-memory prediction statistics.
#[derive(Debug, Clone, Default)]
pub struct PredictionAggregator {
    pub total_predictions: u64,
    pub total_failures: u64,
    pub label_counts: BTreeMap<String, u64>,
    pub failure_counts: BTreeMap<&'static str, u64>,
    pub latency_stats: RunningStats,
    pub window_stats: RunningStats,
}

impl PredictionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a successful prediction.
    pub fn record(&mut self, prediction: &Prediction, latency_ms: f64, window_frames: usize) {
        self.total_predictions += 1;
        *self
            .label_counts
            .entry(prediction.label.clone())
            .or_insert(0) += 1;
        self.latency_stats.push(latency_ms);
        self.window_stats.push(window_frames as f64);
    }

    /// Fold in a failed prediction.
    pub fn record_failure(&mut self, error: &ContractError) {
        self.total_failures += 1;
        *self.failure_counts.entry(error.kind()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> MetricsSummary {
        let attempts = self.total_predictions + self.total_failures;
        MetricsSummary {
            total_predictions: self.total_predictions,
            total_failures: self.total_failures,
            failure_rate: if attempts > 0 {
                self.total_failures as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            label_counts: self.label_counts.clone(),
            failure_counts: self.failure_counts.clone(),
            latency_ms: StatsSummary::from(&self.latency_stats),
            window_frames: StatsSummary::from(&self.window_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Snapshot of an aggregator
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_predictions: u64,
    pub total_failures: u64,
    pub failure_rate: f64,
    pub label_counts: BTreeMap<String, u64>,
    pub failure_counts: BTreeMap<&'static str, u64>,
    pub latency_ms: StatsSummary,
    pub window_frames: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Prediction Summary ===")?;
        writeln!(f, "Predictions: {}", self.total_predictions)?;
        writeln!(
            f,
            "Failures: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Window frames: {}", self.window_frames)?;

        if !self.label_counts.is_empty() {
            writeln!(f, "Labels:")?;
            for (label, count) in &self.label_counts {
                writeln!(f, "  {}: {}", label, count)?;
            }
        }

        if !self.failure_counts.is_empty() {
            writeln!(f, "Failure kinds:")?;
            for (kind, count) in &self.failure_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// Summary statistics of a series
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
            self.min, self.max, self.mean, self.std_dev, self.count
        )
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance; 0 below two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
