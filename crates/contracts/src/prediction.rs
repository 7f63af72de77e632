//! Prediction - Classifier output

use serde::{Deserialize, Serialize};

/// Labeled prediction.
///
/// Serializes as `{"prediction": label, "result": [scores]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Label at the arg-max score index
    #[serde(rename = "prediction")]
    pub label: String,

    /// One score per configured label, in label order
    #[serde(rename = "result")]
    pub scores: Vec<f64>,
}
