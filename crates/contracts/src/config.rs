//! PredictorBlueprint - Config Loader output
//!
//! Describes one predictor: channels, windowing, labels, optional scaler,
//! feature layout, store pruning and (for the CLI) a linear scoring model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{default_feature_names, default_feature_params, ChannelId, FeatureParams};

/// Default retention multiple of the window size kept by the store.
pub const DEFAULT_PRUNE_FACTOR: usize = 10;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictorBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Predictor settings
    #[validate(nested)]
    pub predictor: PredictorConfig,

    /// Linear scoring model used by the command-line runner
    #[serde(default)]
    pub model: Option<LinearModelConfig>,
}

/// Predictor configuration surface
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictorConfig {
    /// Channel names, in feature-vector order
    #[validate(length(min = 1, message = "at least one channel is required"))]
    pub channels: Vec<ChannelId>,

    /// Signed window size: positive = last N frames, negative = trailing milliseconds
    pub window_size: i64,

    /// Explicit windowing mode, overrides the sign of `window_size`
    #[serde(default)]
    pub windowing_mode: Option<WindowingMode>,

    /// Class labels, aligned with the scoring function output
    #[validate(length(min = 1, message = "at least one label is required"))]
    pub labels: Vec<String>,

    /// Positional center/scale normalization
    #[serde(default)]
    pub scaler: Option<ScalerParams>,

    /// Store pruning settings
    #[serde(default)]
    #[validate(nested)]
    pub store: StoreConfig,

    /// Feature layout and engine parameters
    #[serde(default)]
    #[validate(nested)]
    pub features: FeatureConfig,

    /// Treatment of missing slots before extraction
    #[serde(default)]
    pub gap_fill: GapFill,
}

impl PredictorConfig {
    /// Minimal configuration with defaults for everything optional.
    pub fn new(channels: Vec<ChannelId>, window_size: i64, labels: Vec<String>) -> Self {
        Self {
            channels,
            window_size,
            windowing_mode: None,
            labels,
            scaler: None,
            store: StoreConfig::default(),
            features: FeatureConfig::default(),
            gap_fill: GapFill::default(),
        }
    }

    /// Resolve the effective windowing policy.
    pub fn window_policy(&self) -> WindowPolicy {
        let mode = match self.windowing_mode {
            Some(WindowingMode::Time) => WindowMode::Duration,
            Some(WindowingMode::Sample) => WindowMode::Count,
            None if self.window_size < 0 => WindowMode::Duration,
            None => WindowMode::Count,
        };
        WindowPolicy {
            mode,
            size: self.window_size.unsigned_abs(),
        }
    }

    /// Length of the feature vector this configuration produces.
    pub fn feature_count(&self) -> usize {
        self.channels.len() * self.features.names.len()
    }
}

/// Windowing mode as spelled in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowingMode {
    /// Trailing duration in milliseconds
    Time,
    /// Last N merged frames
    Sample,
}

/// Resolved windowing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Count,
    Duration,
}

/// Resolved window size and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub mode: WindowMode,
    /// Frames in count mode, milliseconds in duration mode
    pub size: u64,
}

impl WindowPolicy {
    pub fn count(size: u64) -> Self {
        Self {
            mode: WindowMode::Count,
            size,
        }
    }

    pub fn duration(size_ms: u64) -> Self {
        Self {
            mode: WindowMode::Duration,
            size: size_ms,
        }
    }

    /// Size as a signed millisecond span, saturating.
    pub fn span_ms(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }
}

/// Positional scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Store pruning configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Retained multiple of the window size
    #[validate(range(min = 1, message = "prune_factor must be >= 1"))]
    #[serde(default = "default_prune_factor")]
    pub prune_factor: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prune_factor: DEFAULT_PRUNE_FACTOR,
        }
    }
}

fn default_prune_factor() -> usize {
    DEFAULT_PRUNE_FACTOR
}

/// Feature layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeatureConfig {
    /// Canonical per-channel feature order
    #[validate(length(min = 1, message = "at least one feature name is required"))]
    #[serde(default = "default_feature_names")]
    pub names: Vec<String>,

    /// Parameters passed to the extraction engine
    #[serde(default = "default_feature_params")]
    pub params: FeatureParams,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            names: default_feature_names(),
            params: default_feature_params(),
        }
    }
}

/// Treatment of missing slots before extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFill {
    /// Drop missing slots per channel
    #[default]
    Skip,
    /// Linear interpolation with constant boundary extension
    Interpolate,
}

/// Linear scoring model: `score[k] = bias[k] + weights[k] · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelConfig {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}
