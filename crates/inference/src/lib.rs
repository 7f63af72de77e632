//! # Inference
//!
//! Turns a window of merged frames into a labeled prediction.
//!
//! - [`EngineHandle`]: init-once shared extraction engine
//! - [`FeatureExtractor`]: per-channel extraction in canonical order
//! - [`Scaler`]: positional center/scale normalization
//! - [`classify`]: scoring plus first-maximum label selection
//! - [`Predictor`]: owns the sample store and runs the whole pipeline
//!
//! ## Example
//!
//! ```
//! use contracts::PredictorConfig;
//! use inference::{EngineHandle, FnScorer, Predictor, StatsEngineFactory};
//!
//! # tokio_test_runtime();
//! # fn tokio_test_runtime() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let mut config = PredictorConfig::new(vec!["x".into()], 2, vec!["neg".into(), "pos".into()]);
//! config.features.names = vec!["mean".into()];
//!
//! let scorer = FnScorer::new(|f: &[f64]| vec![-f[0], f[0]]);
//! let predictor = Predictor::new(config, EngineHandle::shared(StatsEngineFactory), scorer).unwrap();
//! predictor.add_datapoint("x", 1.0, Some(10)).unwrap();
//! predictor.add_datapoint("x", 3.0, Some(20)).unwrap();
//!
//! let prediction = predictor.predict().await.unwrap();
//! assert_eq!(prediction.label, "pos");
//! # });
//! # }
//! ```

mod classifier;
mod engine;
mod extract;
mod predictor;
mod scaler;
mod scoring;
mod stats;

pub use classifier::{argmax, classify};
pub use engine::EngineHandle;
pub use extract::{assemble, FeatureExtractor};
pub use predictor::{PredictionReport, Predictor};
pub use scaler::{scale_optional, Scaler};
pub use scoring::{FnScorer, LinearScorer};
pub use stats::{quantile, StatsEngine, StatsEngineFactory, SUPPORTED_FEATURES};
