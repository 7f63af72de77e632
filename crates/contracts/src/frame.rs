//! MergedFrame / Window - StreamMerger and Windower output
//!
//! Time-aligned rows with one optional slot per channel, in configured
//! channel order.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// One time-aligned row.
///
/// `values[c]` is `Some` only if channel `c` had a sample at exactly
/// `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedFrame {
    pub timestamp: Timestamp,
    pub values: Vec<Option<f64>>,
}

impl MergedFrame {
    pub fn new(timestamp: Timestamp, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }

    /// Number of channels that actually contributed to this frame.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Merged frames ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    frames: Vec<MergedFrame>,
}

impl Window {
    /// Wrap frames that are already sorted ascending by timestamp.
    pub fn new(frames: Vec<MergedFrame>) -> Self {
        debug_assert!(frames.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Self { frames }
    }

    pub fn frames(&self) -> &[MergedFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<MergedFrame> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Earliest timestamp in the window
    pub fn start(&self) -> Option<Timestamp> {
        self.frames.first().map(|f| f.timestamp)
    }

    /// Latest timestamp in the window
    pub fn end(&self) -> Option<Timestamp> {
        self.frames.last().map(|f| f.timestamp)
    }

    /// Column of channel `index` across all frames, missing slots kept.
    pub fn channel_series(&self, index: usize) -> Vec<Option<f64>> {
        self.frames
            .iter()
            .map(|f| f.values.get(index).copied().flatten())
            .collect()
    }

    /// Column of channel `index` with missing slots dropped.
    pub fn channel_values(&self, index: usize) -> Vec<f64> {
        self.frames
            .iter()
            .filter_map(|f| f.values.get(index).copied().flatten())
            .collect()
    }
}
