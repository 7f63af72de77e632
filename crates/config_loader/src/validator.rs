//! Configuration validation
//!
//! Field rules come from the `validator` derive on the blueprint types.
//! Cross-field rules checked here:
//! - channel names, labels and feature names unique
//! - window_size != 0
//! - scaler arrays match the feature layout, every scale finite and non-zero
//! - linear model has one row and one bias per label, rows match the layout

use std::collections::HashSet;

use contracts::{ContractError, LinearModelConfig, PredictorBlueprint, PredictorConfig};
use validator::Validate;

/// Validate a blueprint.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PredictorBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("predictor", e.to_string()))?;

    let predictor = &blueprint.predictor;
    validate_unique("predictor.channels", predictor.channels.iter().map(|c| c.as_str()))?;
    validate_unique("predictor.labels", predictor.labels.iter().map(String::as_str))?;
    validate_unique(
        "predictor.features.names",
        predictor.features.names.iter().map(String::as_str),
    )?;
    validate_window(predictor)?;
    validate_scaler(predictor)?;
    if let Some(model) = &blueprint.model {
        validate_model(predictor, model)?;
    }
    Ok(())
}

fn validate_unique<'a>(
    field: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(ContractError::config_validation(field, "names cannot be empty"));
        }
        if !seen.insert(name) {
            return Err(ContractError::config_validation(
                format!("{field}[{name}]"),
                "duplicate name",
            ));
        }
    }
    Ok(())
}

fn validate_window(predictor: &PredictorConfig) -> Result<(), ContractError> {
    if predictor.window_size == 0 {
        return Err(ContractError::config_validation(
            "predictor.window_size",
            "window_size must be non-zero (positive = frames, negative = milliseconds)",
        ));
    }
    Ok(())
}

fn validate_scaler(predictor: &PredictorConfig) -> Result<(), ContractError> {
    let Some(scaler) = &predictor.scaler else {
        return Ok(());
    };
    let expected = predictor.feature_count();
    for (field, len) in [
        ("predictor.scaler.center", scaler.center.len()),
        ("predictor.scaler.scale", scaler.scale.len()),
    ] {
        if len != expected {
            return Err(ContractError::config_validation(
                field,
                format!("expected {expected} entries (channels x features), got {len}"),
            ));
        }
    }
    if let Some(i) = scaler.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
        return Err(ContractError::config_validation(
            format!("predictor.scaler.scale[{i}]"),
            format!("scale must be finite and non-zero, got {}", scaler.scale[i]),
        ));
    }
    Ok(())
}

fn validate_model(
    predictor: &PredictorConfig,
    model: &LinearModelConfig,
) -> Result<(), ContractError> {
    let labels = predictor.labels.len();
    if model.weights.len() != labels {
        return Err(ContractError::config_validation(
            "model.weights",
            format!("expected one row per label ({labels}), got {}", model.weights.len()),
        ));
    }
    if model.bias.len() != labels {
        return Err(ContractError::config_validation(
            "model.bias",
            format!("expected one bias per label ({labels}), got {}", model.bias.len()),
        ));
    }
    let expected = predictor.feature_count();
    if let Some((k, row)) = model
        .weights
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != expected)
    {
        return Err(ContractError::config_validation(
            format!("model.weights[{k}]"),
            format!("expected {expected} weights, got {}", row.len()),
        ));
    }
    Ok(())
}
