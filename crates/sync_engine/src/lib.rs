//! # Sync Engine
//!
//! Bounded multi-channel sample storage and time alignment.
//!
//! Responsibilities:
//! - Per-channel append-only buffers with amortized pruning
//! - Exact-timestamp merge of all channels onto one time axis
//! - Count-based and duration-based trailing windows
//! - Linear gap interpolation (optional stage)
//!
//! ## Example
//!
//! ```
//! use contracts::WindowPolicy;
//! use sync_engine::{select_window, SampleStore};
//!
//! let mut store = SampleStore::new(vec!["a".into(), "b".into()], WindowPolicy::count(2), 10).unwrap();
//! store.add_sample("a", 1.0, Some(100)).unwrap();
//! store.add_sample("b", 2.0, Some(100)).unwrap();
//! store.add_sample("a", 3.0, Some(110)).unwrap();
//!
//! let window = select_window(store.merged(), store.policy(), store.last_add_time()).unwrap();
//! assert_eq!(window.len(), 2);
//! ```

mod buffer;
mod interpolate;
mod merge;
mod store;
mod window;

pub use buffer::ChannelBuffer;
pub use interpolate::{interpolate_linear, interpolate_window, lerp};
pub use merge::{merge, merge_series};
pub use store::{ChannelStats, SampleStore, StoreStats};
pub use window::select_window;

pub use contracts::{MergedFrame, Sample, WindowMode, WindowPolicy};
