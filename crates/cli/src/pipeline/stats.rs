//! Run statistics.

use std::time::Duration;

use observability::PredictionAggregator;
use sync_engine::StoreStats;

/// Statistics from one run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Sensor events taken from the mock source
    pub events_received: u64,

    /// Datapoints accepted by the predictor
    pub datapoints_accepted: u64,

    /// Datapoints rejected (unknown channel, NaN value)
    pub datapoints_rejected: u64,

    /// Prediction attempts skipped for lack of data
    pub predictions_skipped: u64,

    pub duration: Duration,

    /// Per-prediction aggregation
    pub predictions: PredictionAggregator,

    /// Store state at shutdown
    pub store: Option<StoreStats>,
}

impl PipelineStats {
    /// Accepted datapoints per second
    pub fn datapoint_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.datapoints_accepted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary to stderr so stdout stays JSON lines
    pub fn print_summary(&self) {
        eprintln!("\n=== Run Statistics ===");
        eprintln!("Duration: {:.2}s", self.duration.as_secs_f64());
        if self.events_received > 0 {
            eprintln!("Events received: {}", self.events_received);
        }
        eprintln!(
            "Datapoints: {} accepted, {} rejected ({:.1}/s)",
            self.datapoints_accepted,
            self.datapoints_rejected,
            self.datapoint_rate()
        );
        eprintln!("Skipped predictions: {}", self.predictions_skipped);

        if let Some(store) = &self.store {
            eprintln!("Buffered samples: {}", store.total_samples());
            for channel in &store.channels {
                eprintln!(
                    "  {}: depth {}, pruned {}, out-of-order {}",
                    channel.channel, channel.depth, channel.pruned, channel.out_of_order
                );
            }
        }

        eprintln!("\n{}", self.predictions.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datapoint_rate() {
        let stats = PipelineStats {
            datapoints_accepted: 300,
            duration: Duration::from_secs(3),
            ..Default::default()
        };
        assert!((stats.datapoint_rate() - 100.0).abs() < 1e-9);
        assert_eq!(PipelineStats::default().datapoint_rate(), 0.0);
    }
}
