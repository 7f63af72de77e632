//! Built-in statistical extraction engine.
//!
//! Covers the canonical summary features plus a handful of parameterised
//! ones. `std_dev` and `var` are population statistics. On an empty series
//! `length`, `sum` and `range_count` are 0 and everything else is NaN.

use std::collections::HashMap;

use contracts::{ContractError, EngineFactory, ExtractionEngine, FeatureParams};
use statrs::statistics::Statistics;

/// Feature names understood by [`StatsEngine`].
pub const SUPPORTED_FEATURES: [&str; 16] = [
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
    "mean_n_abs_max",
    "count_above",
    "count_below",
    "quantile",
    "autocorrelation",
    "range_count",
];

/// Stateless summary-statistics engine
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngine;

impl StatsEngine {
    pub fn supports(name: &str) -> bool {
        SUPPORTED_FEATURES.contains(&name)
    }

    /// Compute one feature.
    ///
    /// # Errors
    /// `ExtractionFailure` for an unknown name or a missing/invalid parameter
    pub fn compute(
        &self,
        name: &str,
        series: &[f64],
        params: &FeatureParams,
    ) -> Result<f64, ContractError> {
        let value = match name {
            "sum" => series.iter().sum(),
            "length" => series.len() as f64,
            "mean" => Statistics::mean(series),
            "median" => quantile(series, 0.5),
            "std_dev" => Statistics::population_std_dev(series),
            "var" => Statistics::population_variance(series),
            "root_mean_square" => Statistics::quadratic_mean(series),
            "max" => Statistics::max(series),
            "min" => Statistics::min(series),
            "abs_max" => Statistics::abs_max(series),
            "mean_n_abs_max" => {
                let n = param(params, "mean_n_abs_max_n")?;
                if n < 1.0 || n.fract() != 0.0 {
                    return Err(ContractError::extraction(format!(
                        "mean_n_abs_max_n must be a positive integer, got {n}"
                    )));
                }
                mean_n_abs_max(series, n as usize)
            }
            "count_above" => {
                let x = param(params, "count_above_x")?;
                share(series, |v| v >= x)
            }
            "count_below" => {
                let x = param(params, "count_below_x")?;
                share(series, |v| v <= x)
            }
            "quantile" => {
                let q = param(params, "quantile_q")?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(ContractError::extraction(format!(
                        "quantile_q must lie in [0, 1], got {q}"
                    )));
                }
                quantile(series, q)
            }
            "autocorrelation" => {
                let lag = param(params, "autocorrelation_lag")?;
                if lag < 0.0 || lag.fract() != 0.0 {
                    return Err(ContractError::extraction(format!(
                        "autocorrelation_lag must be a non-negative integer, got {lag}"
                    )));
                }
                autocorrelation(series, lag as usize)
            }
            "range_count" => {
                let lower = param(params, "range_count_lower")?;
                let upper = param(params, "range_count_upper")?;
                series.iter().filter(|&&v| v >= lower && v < upper).count() as f64
            }
            other => {
                return Err(ContractError::extraction(format!(
                    "unsupported feature '{other}'"
                )))
            }
        };
        Ok(value)
    }
}

impl ExtractionEngine for StatsEngine {
    async fn extract_features(
        &self,
        feature_names: &[String],
        series: &[f64],
        params: &FeatureParams,
    ) -> Result<HashMap<String, f64>, ContractError> {
        feature_names
            .iter()
            .map(|name| Ok((name.clone(), self.compute(name, series, params)?)))
            .collect()
    }
}

/// Factory for [`StatsEngine`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngineFactory;

impl EngineFactory for StatsEngineFactory {
    type Engine = StatsEngine;

    async fn build(&self) -> Result<StatsEngine, ContractError> {
        Ok(StatsEngine)
    }
}

fn param(params: &FeatureParams, key: &str) -> Result<f64, ContractError> {
    params
        .get(key)
        .copied()
        .ok_or_else(|| ContractError::extraction(format!("missing parameter '{key}'")))
}

/// Linear-interpolated quantile over the sorted series.
pub fn quantile(series: &[f64], q: f64) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sync_engine::lerp(sorted[lo], sorted[hi], pos - lo as f64)
}

fn mean_n_abs_max(series: &[f64], n: usize) -> f64 {
    if series.len() <= n {
        return f64::NAN;
    }
    let mut magnitudes: Vec<f64> = series.iter().map(|v| v.abs()).collect();
    magnitudes.sort_by(|a, b| b.total_cmp(a));
    Statistics::mean(&magnitudes[..n])
}

fn share(series: &[f64], predicate: impl Fn(f64) -> bool) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    series.iter().filter(|&&v| predicate(v)).count() as f64 / series.len() as f64
}

fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    let n = series.len();
    if n <= lag {
        return f64::NAN;
    }
    let mean = Statistics::mean(series);
    let variance = Statistics::population_variance(series);
    if variance.abs() < f64::EPSILON {
        return f64::NAN;
    }
    let products: f64 = series[..n - lag]
        .iter()
        .zip(&series[lag..])
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum();
    products / ((n - lag) as f64 * variance)
}
