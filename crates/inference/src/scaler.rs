//! Positional center/scale normalization.

use contracts::{ContractError, FeatureVector, ScalerParams};

/// `x'[i] = (x[i] - center[i]) / scale[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler {
    /// # Errors
    /// `InvalidInput` on length mismatch or a zero/non-finite scale entry
    pub fn new(center: Vec<f64>, scale: Vec<f64>) -> Result<Self, ContractError> {
        if center.len() != scale.len() {
            return Err(ContractError::invalid_input(format!(
                "scaler center has {} entries but scale has {}",
                center.len(),
                scale.len()
            )));
        }
        if let Some(i) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ContractError::invalid_input(format!(
                "scaler scale[{i}] must be finite and non-zero"
            )));
        }
        Ok(Self { center, scale })
    }

    pub fn from_params(params: &ScalerParams) -> Result<Self, ContractError> {
        Self::new(params.center.clone(), params.scale.clone())
    }

    pub fn len(&self) -> usize {
        self.center.len()
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }

    /// # Errors
    /// `InvalidInput` if `values` is not exactly as long as the scaler
    pub fn apply_values(&self, values: &[f64]) -> Result<Vec<f64>, ContractError> {
        if values.len() != self.len() {
            return Err(ContractError::invalid_input(format!(
                "feature vector has {} entries, scaler expects {}",
                values.len(),
                self.len()
            )));
        }
        Ok(values
            .iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(x, (c, s))| (x - c) / s)
            .collect())
    }

    /// Scale a feature vector, keeping its identifiers.
    pub fn apply(&self, vector: &FeatureVector) -> Result<FeatureVector, ContractError> {
        Ok(vector.with_values(self.apply_values(vector.values())?))
    }
}

/// Apply an optional scaler; `None` leaves the vector unchanged.
pub fn scale_optional(
    scaler: Option<&Scaler>,
    vector: FeatureVector,
) -> Result<FeatureVector, ContractError> {
    match scaler {
        Some(scaler) => scaler.apply(&vector),
        None => Ok(vector),
    }
}
