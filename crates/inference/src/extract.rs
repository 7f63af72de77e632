//! FeatureExtractor - per-channel engine calls and canonical assembly.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{
    feature_id, ContractError, EngineFactory, ExtractionEngine, FeatureParams, FeatureVector,
};
use tracing::{instrument, trace};

use crate::EngineHandle;

/// Runs the shared engine over each channel and orders the result.
pub struct FeatureExtractor<F: EngineFactory> {
    engine: Arc<EngineHandle<F>>,
    feature_names: Vec<String>,
    params: FeatureParams,
}

impl<F> FeatureExtractor<F>
where
    F: EngineFactory,
    F::Engine: ExtractionEngine,
{
    pub fn new(
        engine: Arc<EngineHandle<F>>,
        feature_names: Vec<String>,
        params: FeatureParams,
    ) -> Self {
        Self {
            engine,
            feature_names,
            params,
        }
    }

    /// Canonical per-channel feature order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw engine output for one channel series.
    pub async fn extract_channel(
        &self,
        series: &[f64],
    ) -> Result<HashMap<String, f64>, ContractError> {
        let engine = self.engine.get().await?;
        engine
            .extract_features(&self.feature_names, series, &self.params)
            .await
    }

    /// Extract every channel column and assemble the ordered vector.
    #[instrument(name = "feature_extract", skip_all, fields(channels = columns.len()))]
    pub async fn extract(&self, columns: &[Vec<f64>]) -> Result<FeatureVector, ContractError> {
        let mut per_channel = Vec::with_capacity(columns.len());
        for (index, series) in columns.iter().enumerate() {
            trace!(channel = index, len = series.len(), "extracting channel");
            per_channel.push(self.extract_channel(series).await?);
        }
        assemble(&per_channel, &self.feature_names)
    }
}

/// Order engine output by channel index, then by `feature_names`.
///
/// Keys the engine returned beyond `feature_names` are ignored.
///
/// # Errors
/// `ExtractionFailure` if a channel's output lacks a canonical feature
pub fn assemble(
    per_channel: &[HashMap<String, f64>],
    feature_names: &[String],
) -> Result<FeatureVector, ContractError> {
    let capacity = per_channel.len() * feature_names.len();
    let mut names = Vec::with_capacity(capacity);
    let mut values = Vec::with_capacity(capacity);

    for (channel, output) in per_channel.iter().enumerate() {
        for name in feature_names {
            let value = output.get(name).copied().ok_or_else(|| {
                ContractError::extraction(format!(
                    "engine returned no '{name}' for channel {channel}"
                ))
            })?;
            names.push(feature_id(channel, name));
            values.push(value);
        }
    }
    Ok(FeatureVector::new(names, values))
}
