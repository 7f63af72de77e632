//! Per-channel sample buffer.
//!
//! Samples stay in insertion order, which is not necessarily time order.
//! Trimming is explicit and driven by the owning store.

use std::fmt;

use contracts::{Sample, Timestamp};

/// Append-only buffer of one channel's samples.
#[derive(Clone, Default)]
pub struct ChannelBuffer {
    samples: Vec<Sample>,
    pruned_count: u64,
    out_of_order_count: u64,
    last_timestamp: Option<Timestamp>,
}

impl fmt::Debug for ChannelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuffer")
            .field("len", &self.samples.len())
            .field("pruned", &self.pruned_count)
            .field("out_of_order", &self.out_of_order_count)
            .finish()
    }
}

impl ChannelBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, tracking arrivals older than their predecessor.
    #[inline]
    pub fn push(&mut self, sample: Sample) {
        if let Some(last) = self.last_timestamp {
            if sample.timestamp < last {
                self.out_of_order_count += 1;
            }
        }
        self.last_timestamp = Some(sample.timestamp);
        self.samples.push(sample);
    }

    /// Keep only samples with `timestamp >= cutoff`. Returns how many were removed.
    pub fn retain_since(&mut self, cutoff: Timestamp) -> usize {
        let before = self.samples.len();
        self.samples.retain(|s| s.timestamp >= cutoff);
        let removed = before - self.samples.len();
        self.pruned_count += removed as u64;
        removed
    }

    /// Keep only the most recently inserted `keep` samples. Returns how many were removed.
    pub fn keep_last(&mut self, keep: usize) -> usize {
        let removed = self.samples.len().saturating_sub(keep);
        if removed > 0 {
            self.samples.drain(..removed);
            self.pruned_count += removed as u64;
        }
        removed
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total samples removed by trimming since creation
    pub fn pruned_count(&self) -> u64 {
        self.pruned_count
    }

    /// Samples that arrived with a timestamp below their predecessor's
    pub fn out_of_order_count(&self) -> u64 {
        self.out_of_order_count
    }
}
