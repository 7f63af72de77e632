//! Event router: typed events to per-channel datapoints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{ChannelId, ContractError, DatapointSink, Timestamp};
use metrics::counter;
use tracing::trace;

use crate::channel::ChannelKind;
use crate::event::SensorEvent;

/// Routing counters
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Events handed to the router
    pub events_routed: AtomicU64,

    /// Datapoints accepted by the sink
    pub datapoints_recorded: AtomicU64,

    /// Bound channel fields absent (or NaN) in a matching event
    pub fields_skipped: AtomicU64,

    /// Datapoints the sink rejected
    pub datapoints_rejected: AtomicU64,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_routed: self.events_routed.load(Ordering::Relaxed),
            datapoints_recorded: self.datapoints_recorded.load(Ordering::Relaxed),
            fields_skipped: self.fields_skipped.load(Ordering::Relaxed),
            datapoints_rejected: self.datapoints_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_routed: u64,
    pub datapoints_recorded: u64,
    pub fields_skipped: u64,
    pub datapoints_rejected: u64,
}

/// Binds configured channel names to event fields.
#[derive(Debug, Clone)]
pub struct EventRouter {
    bindings: Vec<(ChannelId, ChannelKind)>,
    metrics: Arc<IngestionMetrics>,
}

impl EventRouter {
    /// # Errors
    /// `InvalidInput` if a name is not a known sensor channel
    pub fn new(channels: &[ChannelId]) -> Result<Self, ContractError> {
        let bindings = channels
            .iter()
            .map(|channel| {
                ChannelKind::from_name(channel)
                    .map(|kind| (channel.clone(), kind))
                    .ok_or_else(|| {
                        ContractError::invalid_input(format!("unknown sensor channel '{channel}'"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            bindings,
            metrics: Arc::new(IngestionMetrics::new()),
        })
    }

    /// Share an existing counter set.
    pub fn with_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<IngestionMetrics> {
        &self.metrics
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.bindings.iter().map(|(channel, _)| channel)
    }

    /// Record every bound field present in `event`.
    ///
    /// The timestamp is the event time floored to whole milliseconds; a
    /// non-finite event time falls back to the sink's wall clock. Fields that
    /// are absent or NaN are skipped. Returns the number of datapoints recorded.
    ///
    /// # Errors
    /// The first error returned by the sink; datapoints recorded before it stay.
    pub fn route<S>(&self, event: &SensorEvent, sink: &S) -> Result<usize, ContractError>
    where
        S: DatapointSink + ?Sized,
    {
        self.metrics.events_routed.fetch_add(1, Ordering::Relaxed);
        counter!("fusion_events_routed_total", "kind" => event.kind()).increment(1);

        let timestamp = event_timestamp(event.timestamp_ms());
        let mut recorded = 0;

        for (channel, kind) in &self.bindings {
            let Some(value) = kind.read(event) else {
                if kind.is_orientation() == matches!(event, SensorEvent::Orientation(_)) {
                    self.metrics.fields_skipped.fetch_add(1, Ordering::Relaxed);
                }
                continue;
            };
            if value.is_nan() {
                self.metrics.fields_skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            if let Err(e) = sink.add_datapoint(channel, value, timestamp) {
                self.metrics.datapoints_rejected.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
            recorded += 1;
            self.metrics.datapoints_recorded.fetch_add(1, Ordering::Relaxed);
        }

        trace!(kind = event.kind(), ?timestamp, recorded, "event routed");
        Ok(recorded)
    }
}

fn event_timestamp(timestamp_ms: f64) -> Option<Timestamp> {
    timestamp_ms
        .is_finite()
        .then(|| timestamp_ms.floor() as Timestamp)
}
