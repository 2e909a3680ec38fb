//! Search for samples by position
//!
//! Both searches assume the samples are ordered by ascending position and run
//! in O(log n). They operate on a snapshot, so the caller never needs to hold
//! a lock while searching.

use crate::axis::Position;
use crate::data::PlotSample;

/// Index of the last sample whose position is at or before `position`
///
/// Returns `None` when every sample lies after `position`.
pub fn find_sample_less_or_equal<X: Position>(
    samples: &[PlotSample<X>],
    position: X,
) -> Option<usize> {
    let idx = samples.partition_point(|s| s.position <= position);
    idx.checked_sub(1)
}

/// Index of the first sample whose position is at or after `position`
///
/// Returns `None` when every sample lies before `position`.
pub fn find_sample_greater_or_equal<X: Position>(
    samples: &[PlotSample<X>],
    position: X,
) -> Option<usize> {
    let idx = samples.partition_point(|s| s.position < position);
    (idx < samples.len()).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(positions: &[f64]) -> Vec<PlotSample<f64>> {
        positions.iter().map(|&p| PlotSample::new(p, p * 2.0)).collect()
    }

    #[test]
    fn test_less_or_equal_boundaries() {
        let data = samples(&[0.0, 10.0, 20.0, 30.0]);
        assert_eq!(find_sample_less_or_equal(&data, 10.0), Some(1));
        assert_eq!(find_sample_less_or_equal(&data, 5.0), Some(0));
        assert_eq!(find_sample_less_or_equal(&data, -1.0), None);
        assert_eq!(find_sample_less_or_equal(&data, 0.0), Some(0));
        assert_eq!(find_sample_less_or_equal(&data, 99.0), Some(3));
    }

    #[test]
    fn test_greater_or_equal_boundaries() {
        let data = samples(&[0.0, 10.0, 20.0, 30.0]);
        assert_eq!(find_sample_greater_or_equal(&data, 10.0), Some(1));
        assert_eq!(find_sample_greater_or_equal(&data, 5.0), Some(1));
        assert_eq!(find_sample_greater_or_equal(&data, -1.0), Some(0));
        assert_eq!(find_sample_greater_or_equal(&data, 30.0), Some(3));
        assert_eq!(find_sample_greater_or_equal(&data, 31.0), None);
    }

    #[test]
    fn test_empty_data() {
        let data: Vec<PlotSample<f64>> = Vec::new();
        assert_eq!(find_sample_less_or_equal(&data, 0.0), None);
        assert_eq!(find_sample_greater_or_equal(&data, 0.0), None);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_search_matches_linear_scan(
            mut positions in prop::collection::vec(-1000.0f64..1000.0, 0..64),
            query in -1100.0f64..1100.0
        ) {
            positions.sort_by(|a, b| a.total_cmp(b));
            let data = samples(&positions);

            let expected_le = positions.iter().rposition(|&p| p <= query);
            let expected_ge = positions.iter().position(|&p| p >= query);

            let le = find_sample_less_or_equal(&data, query);
            let ge = find_sample_greater_or_equal(&data, query);

            // With duplicate positions any equal index is acceptable
            prop_assert_eq!(le.map(|i| positions[i]), expected_le.map(|i| positions[i]));
            prop_assert_eq!(ge.map(|i| positions[i]), expected_ge.map(|i| positions[i]));
        }
    }
}
