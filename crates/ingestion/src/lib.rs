//! # Ingestion
//!
//! Device sensor input for the predictor.
//!
//! Responsibilities:
//! - Typed orientation and motion events
//! - Static per-channel field accessors selected by [`ChannelKind`]
//! - Routing events into any [`contracts::DatapointSink`]
//! - Mock motion source and JSON-lines replay input
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{Activity, EventRouter, MockMotionSource};
//!
//! let router = EventRouter::new(&config.channels)?;
//! let source = MockMotionSource::with_activity(Activity::Walking, 50.0)?;
//! let mut rx = source.start(256);
//! while let Some(event) = rx.recv().await {
//!     router.route(&event, &predictor)?;
//! }
//! ```

mod channel;
mod error;
mod event;
mod mock;
pub mod replay;
mod router;

pub use channel::ChannelKind;
pub use error::{IngestionError, Result};
pub use event::{Axes, MotionEvent, OrientationEvent, RotationRate, SensorEvent};
pub use mock::{synthesize, Activity, MockMotionConfig, MockMotionSource};
pub use replay::{parse_records, read_records};
pub use router::{EventRouter, IngestionMetrics, MetricsSnapshot};
