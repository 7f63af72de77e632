//! Scoring function implementations.

use contracts::{ContractError, LinearModelConfig, ScoringFunction};

/// Linear model: `score[k] = bias[k] + weights[k] · x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScorer {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    input_len: usize,
}

impl LinearScorer {
    /// # Errors
    /// `InvalidInput` for an empty model, ragged weight rows, or a bias
    /// count that differs from the row count
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, ContractError> {
        let Some(first) = weights.first() else {
            return Err(ContractError::invalid_input("linear model has no weight rows"));
        };
        let input_len = first.len();
        if let Some(k) = weights.iter().position(|row| row.len() != input_len) {
            return Err(ContractError::invalid_input(format!(
                "weight row {k} has {} entries, expected {input_len}",
                weights[k].len()
            )));
        }
        if bias.len() != weights.len() {
            return Err(ContractError::invalid_input(format!(
                "linear model has {} weight rows but {} bias terms",
                weights.len(),
                bias.len()
            )));
        }
        Ok(Self {
            weights,
            bias,
            input_len,
        })
    }

    pub fn from_config(config: &LinearModelConfig) -> Result<Self, ContractError> {
        Self::new(config.weights.clone(), config.bias.clone())
    }

    /// Expected feature vector length
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Number of scores produced
    pub fn output_len(&self) -> usize {
        self.bias.len()
    }

    pub fn score_sync(&self, features: &[f64]) -> Result<Vec<f64>, ContractError> {
        if features.len() != self.input_len {
            return Err(ContractError::classification(format!(
                "linear model expects {} features, got {}",
                self.input_len,
                features.len()
            )));
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| b + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>())
            .collect())
    }
}

impl ScoringFunction for LinearScorer {
    async fn score(&self, features: &[f64]) -> Result<Vec<f64>, ContractError> {
        self.score_sync(features)
    }
}

/// Adapts a synchronous closure into a scoring function.
pub struct FnScorer<F> {
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ScoringFunction for FnScorer<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    async fn score(&self, features: &[f64]) -> Result<Vec<f64>, ContractError> {
        Ok((self.f)(features))
    }
}
