//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the predictor.
//! Business crates depend only on this crate, never on each other in reverse.
//!
//! ## Time Model
//! - Timestamps are integer epoch milliseconds (`i64`)
//! - A missing channel value inside a merged frame is `None`, never a sentinel

mod channel_id;
mod config;
mod error;
mod feature;
mod frame;
mod prediction;
mod sample;
mod traits;

pub use channel_id::ChannelId;
pub use config::*;
pub use error::*;
pub use feature::*;
pub use frame::*;
pub use prediction::*;
pub use sample::*;
pub use traits::*;
