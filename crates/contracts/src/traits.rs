//! Collaborator traits
//!
//! The predictor talks to three outside parties: the feature-extraction
//! engine (built once, expensive), the scoring function, and whatever feeds
//! it datapoints. Only their call contracts live here.

use std::collections::HashMap;

use crate::{ContractError, FeatureParams, Timestamp};

/// Black-box numeric feature computer.
///
/// Returns one value per requested feature name. The order of the returned
/// map carries no meaning; callers re-order by their canonical list.
#[trait_variant::make(ExtractionEngine: Send)]
pub trait LocalExtractionEngine {
    /// Compute `feature_names` over `series`.
    ///
    /// # Errors
    /// `ExtractionFailure` for unknown features or engine faults
    async fn extract_features(
        &self,
        feature_names: &[String],
        series: &[f64],
        params: &FeatureParams,
    ) -> Result<HashMap<String, f64>, ContractError>;
}

/// Builds an extraction engine. Called at most once per engine handle.
#[trait_variant::make(EngineFactory: Send)]
pub trait LocalEngineFactory {
    type Engine;

    /// Construct the engine instance
    async fn build(&self) -> Result<Self::Engine, ContractError>;
}

/// Pre-trained scoring function: one score per configured label.
#[trait_variant::make(ScoringFunction: Send)]
pub trait LocalScoringFunction {
    /// # Errors
    /// `ClassificationFailure` if the model cannot score the input
    async fn score(&self, features: &[f64]) -> Result<Vec<f64>, ContractError>;
}

/// Synchronous datapoint ingestion target.
pub trait DatapointSink {
    /// Append one value to `channel`; `None` timestamp means wall clock.
    fn add_datapoint(
        &self,
        channel: &str,
        value: f64,
        timestamp: Option<Timestamp>,
    ) -> Result<(), ContractError>;
}
