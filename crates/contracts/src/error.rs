//! Layered error definitions
//!
//! Categorized by source: ingestion / prediction / collaborators / config

use thiserror::Error;

/// Boxed source error carried by collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Ingestion Errors =====
    /// Unknown channel or non-numeric value
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    // ===== Prediction Errors =====
    /// Count-mode window underflow
    #[error("Not enough samples: required {required}, available {available}")]
    InsufficientData { required: usize, available: usize },

    // ===== Collaborator Errors =====
    /// Feature extraction engine failure
    #[error("feature extraction failed: {message}")]
    ExtractionFailure {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Scoring function failure
    #[error("classification failed: {message}")]
    ClassificationFailure {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create insufficient data error
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    /// Create extraction failure without a source
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::ExtractionFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Create classification failure without a source
    pub fn classification(message: impl Into<String>) -> Self {
        Self::ClassificationFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::ExtractionFailure { .. } => "extraction_failure",
            Self::ClassificationFailure { .. } => "classification_failure",
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = ContractError::insufficient_data(3, 2);
        assert!(err.to_string().starts_with("Not enough samples"));
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = ContractError::config_validation("predictor.labels", "must not be empty");
        assert_eq!(
            err.to_string(),
            "config validation error at 'predictor.labels': must not be empty"
        );
    }
}
