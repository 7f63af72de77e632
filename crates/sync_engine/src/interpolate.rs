//! Linear gap filling with constant boundary extension.

use contracts::{ContractError, Window};

/// `a` at `t = 0`, `b` at `t = 1`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Fill every missing slot of `series`.
///
/// Interior runs are interpolated between their neighbours. A leading run
/// takes `left` or else the first known value; a trailing run takes `right`
/// or else the last known value. An empty series yields an empty result.
///
/// # Errors
/// `InsufficientData` if the series is non-empty and every slot is missing
pub fn interpolate_linear(
    series: &[Option<f64>],
    left: Option<f64>,
    right: Option<f64>,
) -> Result<Vec<f64>, ContractError> {
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let first = series
        .iter()
        .position(Option::is_some)
        .ok_or_else(|| ContractError::insufficient_data(1, 0))?;

    let mut out = Vec::with_capacity(series.len());
    let mut previous: Option<(usize, f64)> = None;

    for (i, slot) in series.iter().enumerate() {
        let Some(value) = *slot else { continue };
        match previous {
            None => {
                let fill = left.unwrap_or(value);
                out.extend(std::iter::repeat_n(fill, first));
            }
            Some((at, a)) => {
                let gap = i - at - 1;
                let n = (gap + 1) as f64;
                out.extend((0..gap).map(|j| lerp(a, value, (j + 1) as f64 / n)));
            }
        }
        out.push(value);
        previous = Some((i, value));
    }

    if let Some((at, last)) = previous {
        let fill = right.unwrap_or(last);
        out.extend(std::iter::repeat_n(fill, series.len() - at - 1));
    }
    Ok(out)
}

/// Interpolate each of `channel_count` columns of `window` independently.
///
/// # Errors
/// `InsufficientData` if any column has no known value
pub fn interpolate_window(
    window: &Window,
    channel_count: usize,
) -> Result<Vec<Vec<f64>>, ContractError> {
    (0..channel_count)
        .map(|c| interpolate_linear(&window.channel_series(c), None, None))
        .collect()
}
