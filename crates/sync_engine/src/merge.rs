//! Exact-time join of channel buffers.

use std::collections::BTreeMap;

use contracts::{ChannelId, ContractError, MergedFrame, Sample, Timestamp, Window};

use crate::SampleStore;

/// Join per-channel sample slices onto their timestamp union.
///
/// Slot `c` of a frame is filled only when `series[c]` holds a sample at
/// exactly that timestamp. When one channel has several samples at the same
/// timestamp, the last inserted wins.
pub fn merge_series(series: &[&[Sample]]) -> Window {
    let width = series.len();
    let mut rows: BTreeMap<Timestamp, Vec<Option<f64>>> = BTreeMap::new();

    for (channel, samples) in series.iter().enumerate() {
        for sample in samples.iter() {
            rows.entry(sample.timestamp)
                .or_insert_with(|| vec![None; width])[channel] = Some(sample.value);
        }
    }

    Window::new(
        rows.into_iter()
            .map(|(timestamp, values)| MergedFrame::new(timestamp, values))
            .collect(),
    )
}

/// Merge the store's buffers in `channel_order`.
///
/// # Errors
/// `InvalidInput` if `channel_order` names a channel the store does not hold
pub fn merge(store: &SampleStore, channel_order: &[ChannelId]) -> Result<Window, ContractError> {
    let series = channel_order
        .iter()
        .map(|channel| {
            store
                .buffer(channel)
                .map(|b| b.samples())
                .ok_or_else(|| ContractError::invalid_input(format!("unknown channel '{channel}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merge_series(&series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::WindowPolicy;

    fn samples(points: &[(Timestamp, f64)]) -> Vec<Sample> {
        points.iter().map(|&(t, v)| Sample::new(t, v)).collect()
    }

    #[test]
    fn test_staggered_channels() {
        let a = samples(&[(1, 10.0), (3, 30.0)]);
        let b = samples(&[(2, 20.0), (3, 31.0)]);
        let window = merge_series(&[&a, &b]);

        assert_eq!(
            window.frames(),
            &[
                MergedFrame::new(1, vec![Some(10.0), None]),
                MergedFrame::new(2, vec![None, Some(20.0)]),
                MergedFrame::new(3, vec![Some(30.0), Some(31.0)]),
            ]
        );
    }

    #[test]
    fn test_numeric_not_lexical_order() {
        let a = samples(&[(100, 1.0), (9, 2.0), (20, 3.0)]);
        let window = merge_series(&[&a]);
        let order: Vec<_> = window.frames().iter().map(|f| f.timestamp).collect();
        assert_eq!(order, vec![9, 20, 100]);
    }

    #[test]
    fn test_duplicate_timestamp_last_insert_wins() {
        let a = samples(&[(5, 1.0), (5, 2.0)]);
        let window = merge_series(&[&a]);
        assert_eq!(window.len(), 1);
        assert_eq!(window.frames()[0].values, vec![Some(2.0)]);
    }

    #[test]
    fn test_zero_is_not_missing() {
        let a = samples(&[(1, 0.0)]);
        let b: Vec<Sample> = Vec::new();
        let window = merge_series(&[&a, &b]);
        assert_eq!(window.frames()[0].values, vec![Some(0.0), None]);
    }

    #[test]
    fn test_merge_store_in_requested_order() {
        let mut store = SampleStore::new(
            vec!["a".into(), "b".into()],
            WindowPolicy::count(2),
            10,
        )
        .unwrap();
        store.add_sample("a", 1.0, Some(1)).unwrap();
        store.add_sample("b", 2.0, Some(1)).unwrap();

        let window = merge(&store, &["b".into(), "a".into()]).unwrap();
        assert_eq!(window.frames()[0].values, vec![Some(2.0), Some(1.0)]);

        assert!(merge(&store, &["z".into()]).is_err());
    }
}
