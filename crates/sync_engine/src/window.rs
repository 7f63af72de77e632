//! Trailing window selection over merged frames.

use contracts::{ContractError, Timestamp, Window, WindowMode, WindowPolicy};

/// Select the trailing window of `merged` under `policy`.
///
/// Count mode takes the last `size` frames. Duration mode takes every frame
/// with `timestamp >= reference - size`; without a reference (nothing ingested
/// yet) the window is empty.
///
/// # Errors
/// `InsufficientData` in count mode when fewer than `size` frames exist
pub fn select_window(
    merged: Window,
    policy: WindowPolicy,
    reference: Option<Timestamp>,
) -> Result<Window, ContractError> {
    match policy.mode {
        WindowMode::Count => {
            let required = usize::try_from(policy.size).unwrap_or(usize::MAX);
            let available = merged.len();
            if available < required {
                return Err(ContractError::insufficient_data(required, available));
            }
            let mut frames = merged.into_frames();
            frames.drain(..available - required);
            Ok(Window::new(frames))
        }
        WindowMode::Duration => {
            let Some(reference) = reference else {
                return Ok(Window::default());
            };
            let cutoff = reference.saturating_sub(policy.span_ms());
            let mut frames = merged.into_frames();
            let start = frames.partition_point(|f| f.timestamp < cutoff);
            frames.drain(..start);
            Ok(Window::new(frames))
        }
    }
}
