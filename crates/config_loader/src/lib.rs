//! # Config Loader
//!
//! Reads a `[predictor]` section (channels, window, labels, features,
//! optional scaler) and an optional `[model]` section from TOML or JSON.
//! Everything that can be checked without building an engine is checked
//! here: unique channels and labels, a non-zero window, scaler and model
//! dimensions against `channels × features`, and a prune factor of at least 1.
//! Whether a feature name is computable is up to the engine.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! let model = ConfigLoader::require_model(&blueprint).unwrap();
//! println!("{} channels, {} labels", blueprint.predictor.channels.len(), model.bias.len());
//! ```

mod parser;
mod validator;

pub use contracts::PredictorBlueprint;
pub use parser::ConfigFormat;

use contracts::{ContractError, LinearModelConfig};
use std::path::Path;

/// Loads and checks predictor blueprints.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a `.toml` or `.json` predictor configuration.
    ///
    /// # Errors
    /// `ConfigParse` for an unreadable file, an unknown extension or a
    /// syntax error; `ConfigValidation` naming the offending field otherwise
    pub fn load_from_path(path: &Path) -> Result<PredictorBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Same as [`ConfigLoader::load_from_path`] for in-memory content.
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PredictorBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Re-run every validation rule, e.g. after command-line overrides.
    pub fn validate(blueprint: &PredictorBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// The scoring model of a blueprint that is about to predict.
    ///
    /// # Errors
    /// `ConfigValidation` on `model` when the `[model]` section is absent
    pub fn require_model(
        blueprint: &PredictorBlueprint,
    ) -> Result<&LinearModelConfig, ContractError> {
        blueprint.model.as_ref().ok_or_else(|| {
            ContractError::config_validation(
                "model",
                format!(
                    "no [model] section; predicting {} labels needs weights and bias",
                    blueprint.predictor.labels.len()
                ),
            )
        })
    }

    pub fn to_toml(blueprint: &PredictorBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(blueprint: &PredictorBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse(format!(
                "{} has no extension; expected .toml or .json",
                path.display()
            ))
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        std::fs::read_to_string(path).map_err(|e| {
            ContractError::config_parse(format!("cannot read {}: {e}", path.display()))
        })
    }

    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PredictorBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[predictor]
channels = ["alpha", "accelerationIncludingGravity.z"]
window_size = -2000
labels = ["still", "walking"]

[predictor.features]
names = ["mean", "std_dev"]

[model]
weights = [[0.0, 0.0, 0.0, -1.0], [0.0, 0.0, 0.0, 1.0]]
bias = [0.5, 0.0]
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.predictor.channels[1], "accelerationIncludingGravity.z");
        assert_eq!(bp.predictor.feature_count(), 4);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.predictor.channels, bp2.predictor.channels);
        assert_eq!(bp.predictor.window_size, bp2.predictor.window_size);
        assert_eq!(bp.model, bp2.model);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.predictor.labels, bp2.predictor.labels);
        assert_eq!(bp.predictor.features.params, bp2.predictor.features.params);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = MINIMAL_TOML.replace("bias = [0.5, 0.0]", "bias = [0.5]");
        let result = ConfigLoader::load_from_str(&content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("model.bias"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();
        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.predictor.labels, vec!["still", "walking"]);
    }

    #[test]
    fn test_require_model() {
        let mut bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(ConfigLoader::require_model(&bp).unwrap().bias, vec![0.5, 0.0]);

        bp.model = None;
        let err = ConfigLoader::require_model(&bp).unwrap_err();
        assert_eq!(err.kind(), "config_validation");
        assert!(err.to_string().contains("[model]"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = ConfigLoader::load_from_path(Path::new("/nonexistent/predictor.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/predictor.toml"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
