//! FeatureVector - FeatureExtractor output
//!
//! Layout is channel index ascending, then canonical feature-name order
//! within each channel. Externally trained scaler and classifier parameters
//! are positional, so this layout is part of the contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical per-channel feature order used at training time.
pub const DEFAULT_FEATURE_NAMES: [&str; 10] = [
    "sum",
    "median",
    "mean",
    "length",
    "std_dev",
    "var",
    "root_mean_square",
    "max",
    "abs_max",
    "min",
];

/// Numeric parameters handed to the extraction engine on every call.
pub type FeatureParams = BTreeMap<String, f64>;

/// Engine parameters matching the training-time defaults.
pub fn default_feature_params() -> FeatureParams {
    [
        ("mean_n_abs_max_n", 8.0),
        ("change_quantile_lower", -0.1),
        ("change_quantile_upper", 0.1),
        ("change_quantile_aggr", 0.0),
        ("range_count_lower", -1.0),
        ("range_count_upper", 1.0),
        ("count_above_x", 0.0),
        ("count_below_x", 0.0),
        ("quantile_q", 0.5),
        ("autocorrelation_lag", 1.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

pub fn default_feature_names() -> Vec<String> {
    DEFAULT_FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Identifier of one vector position: `"{channel_index}__{feature_name}"`.
pub fn feature_id(channel_index: usize, feature_name: &str) -> String {
    format!("{channel_index}__{feature_name}")
}

/// Full identifier layout for `channel_count` channels.
pub fn feature_layout(channel_count: usize, feature_names: &[String]) -> Vec<String> {
    (0..channel_count)
        .flat_map(|c| feature_names.iter().map(move |name| feature_id(c, name)))
        .collect()
}

/// Ordered feature values with their matching identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build from parallel identifier and value lists.
    ///
    /// Panics in debug builds if lengths differ.
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Same identifiers, new values (used by the scaler).
    pub fn with_values(&self, values: Vec<f64>) -> Self {
        Self::new(self.names.clone(), values)
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}
