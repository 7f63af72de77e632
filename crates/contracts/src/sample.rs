//! Sample - the unit of ingestion
//!
//! One `(timestamp, value)` pair of a single channel. Immutable once stored.

use serde::{Deserialize, Serialize};

use crate::ChannelId;

/// Epoch milliseconds.
pub type Timestamp = i64;

/// A single stored reading of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Epoch milliseconds supplied by the caller or taken from the wall clock
    pub timestamp: Timestamp,
    /// Reading value
    pub value: f64,
}

impl Sample {
    #[inline]
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A datapoint addressed to a named channel, as read from replay files.
///
/// `timestamp` is optional; absent means "use the wall clock at ingestion".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatapointRecord {
    pub channel: ChannelId,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}
