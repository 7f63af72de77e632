//! SampleStore - bounded multi-channel sample storage.
//!
//! Pruning is lazy and amortized:
//! - duration mode: skipped until the high-water mark has advanced more than
//!   `factor × size` ms since the last prune, then every buffer is cut back to
//!   the trailing window
//! - count mode: a buffer is cut back to its newest `factor × size` samples
//!   once it holds more than twice that

use std::collections::HashSet;

use chrono::Utc;
use contracts::{
    ChannelId, ContractError, PredictorConfig, Sample, Timestamp, Window, WindowMode,
    WindowPolicy,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::buffer::ChannelBuffer;
use crate::merge::merge_series;

/// Per-channel sample store with a fixed channel set.
#[derive(Debug, Clone)]
pub struct SampleStore {
    channels: Vec<ChannelId>,
    buffers: Vec<ChannelBuffer>,
    policy: WindowPolicy,
    prune_factor: usize,
    last_add_time: Option<Timestamp>,
    last_prune_time: Option<Timestamp>,
}

impl SampleStore {
    /// Create an empty store.
    ///
    /// # Errors
    /// `InvalidInput` for an empty or duplicated channel set or a zero prune factor
    pub fn new(
        channels: Vec<ChannelId>,
        policy: WindowPolicy,
        prune_factor: usize,
    ) -> Result<Self, ContractError> {
        if channels.is_empty() {
            return Err(ContractError::invalid_input("channel set is empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = channels.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ContractError::invalid_input(format!(
                "duplicate channel '{dup}'"
            )));
        }
        if prune_factor == 0 {
            return Err(ContractError::invalid_input("prune factor must be >= 1"));
        }

        let buffers = vec![ChannelBuffer::new(); channels.len()];
        Ok(Self {
            channels,
            buffers,
            policy,
            prune_factor,
            last_add_time: None,
            last_prune_time: None,
        })
    }

    pub fn from_config(config: &PredictorConfig) -> Result<Self, ContractError> {
        Self::new(
            config.channels.clone(),
            config.window_policy(),
            config.store.prune_factor,
        )
    }

    /// Append one sample and run the pruning schedule.
    ///
    /// A missing timestamp is replaced by the wall clock. Returns the
    /// timestamp actually stored.
    ///
    /// # Errors
    /// `InvalidInput` if `channel` is not configured or `value` is NaN;
    /// the store is left untouched
    pub fn add_sample(
        &mut self,
        channel: &str,
        value: f64,
        timestamp: Option<Timestamp>,
    ) -> Result<Timestamp, ContractError> {
        if value.is_nan() {
            observability::record_datapoint_rejected("not_a_number");
            return Err(ContractError::invalid_input(format!(
                "value for channel '{channel}' is not a number"
            )));
        }
        let index = self.channel_index(channel).ok_or_else(|| {
            observability::record_datapoint_rejected("unknown_channel");
            ContractError::invalid_input(format!("unknown channel '{channel}'"))
        })?;

        let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp_millis());

        if self.is_stale(timestamp) {
            debug!(
                channel,
                timestamp,
                last_add_time = ?self.last_add_time,
                "sample older than retained window"
            );
            observability::record_stale_sample(channel);
        }

        self.buffers[index].push(Sample::new(timestamp, value));
        self.last_add_time = Some(self.last_add_time.map_or(timestamp, |t| t.max(timestamp)));
        observability::record_datapoint_ingested(channel);

        self.prune();
        Ok(timestamp)
    }

    fn is_stale(&self, timestamp: Timestamp) -> bool {
        match (self.policy.mode, self.last_add_time) {
            (WindowMode::Duration, Some(last)) => {
                timestamp < last.saturating_sub(self.policy.span_ms())
            }
            _ => false,
        }
    }

    fn prune(&mut self) {
        match self.policy.mode {
            WindowMode::Duration => self.prune_by_time(),
            WindowMode::Count => self.prune_by_count(),
        }
    }

    fn prune_by_time(&mut self) {
        let Some(last_add) = self.last_add_time else {
            return;
        };
        let Some(last_prune) = self.last_prune_time else {
            self.last_prune_time = Some(last_add);
            return;
        };
        if last_add.saturating_sub(last_prune) <= self.retention_span_ms() {
            return;
        }

        let cutoff = last_add.saturating_sub(self.policy.span_ms());
        for (channel, buffer) in self.channels.iter().zip(self.buffers.iter_mut()) {
            let removed = buffer.retain_since(cutoff);
            observability::record_samples_pruned(channel, removed);
            observability::record_buffer_depth(channel, buffer.len());
        }
        self.last_prune_time = Some(last_add);
        trace!(cutoff, "pruned store by time");
    }

    fn prune_by_count(&mut self) {
        let keep = self.retention_count();
        let limit = keep.saturating_mul(2);
        for (channel, buffer) in self.channels.iter().zip(self.buffers.iter_mut()) {
            if buffer.len() > limit {
                let removed = buffer.keep_last(keep);
                observability::record_samples_pruned(channel, removed);
                observability::record_buffer_depth(channel, buffer.len());
                trace!(channel = %channel, removed, "pruned buffer by count");
            }
        }
    }

    /// Samples retained per channel after a count-mode prune.
    pub fn retention_count(&self) -> usize {
        usize::try_from(self.policy.size)
            .unwrap_or(usize::MAX)
            .saturating_mul(self.prune_factor)
    }

    /// High-water-mark advance that triggers a duration-mode prune.
    pub fn retention_span_ms(&self) -> i64 {
        self.policy
            .span_ms()
            .saturating_mul(i64::try_from(self.prune_factor).unwrap_or(i64::MAX))
    }

    /// Merge every channel in configured order.
    pub fn merged(&self) -> Window {
        let series: Vec<&[Sample]> = self.buffers.iter().map(ChannelBuffer::samples).collect();
        merge_series(&series)
    }

    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }

    pub fn channel_index(&self, channel: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == channel)
    }

    pub fn buffer(&self, channel: &str) -> Option<&ChannelBuffer> {
        self.channel_index(channel).map(|i| &self.buffers[i])
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn prune_factor(&self) -> usize {
        self.prune_factor
    }

    /// High-water mark of all timestamps added so far.
    pub fn last_add_time(&self) -> Option<Timestamp> {
        self.last_add_time
    }

    pub fn last_prune_time(&self) -> Option<Timestamp> {
        self.last_prune_time
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            channels: self
                .channels
                .iter()
                .zip(&self.buffers)
                .map(|(channel, buffer)| ChannelStats {
                    channel: channel.clone(),
                    depth: buffer.len(),
                    pruned: buffer.pruned_count(),
                    out_of_order: buffer.out_of_order_count(),
                })
                .collect(),
            last_add_time: self.last_add_time,
        }
    }
}

/// Store diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub channels: Vec<ChannelStats>,
    pub last_add_time: Option<Timestamp>,
}

impl StoreStats {
    pub fn total_samples(&self) -> usize {
        self.channels.iter().map(|c| c.depth).sum()
    }
}

/// Diagnostics of one channel buffer
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub channel: ChannelId,
    pub depth: usize,
    pub pruned: u64,
    pub out_of_order: u64,
}
