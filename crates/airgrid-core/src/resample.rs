//! Projection of irregular samples onto a fixed time grid

use crate::grid::GridSpec;
use crate::types::{DataPoint, Series, TimestampMs};

/// Resample `source` onto `grid`, with the last slot at `max(now, newest sample)`.
///
/// Slots strictly between two samples are linearly interpolated; slots
/// before the first sample, after the last one, or exactly on a sample take
/// that sample's values unchanged. The source cursor only moves forward, so
/// the cost is `O(point_count + source.len())` after sorting.
///
/// An empty source yields an empty series, which callers must treat as
/// insufficient data.
pub fn resample(source: &[DataPoint], grid: &GridSpec, now: TimestampMs) -> Series {
    let mut sorted = source.to_vec();
    sorted.sort_by_key(|point| point.timestamp);

    let Some(newest) = sorted.last() else {
        return Vec::new();
    };
    let end = now.max(newest.timestamp);
    let start = grid.start_for(end);

    let mut window = Vec::with_capacity(grid.point_count());
    let mut cursor = 0;

    for index in 0..grid.point_count() {
        let slot = grid.slot(start, index);

        while cursor + 1 < sorted.len() && sorted[cursor + 1].timestamp <= slot {
            cursor += 1;
        }

        let current = &sorted[cursor];
        let point = match sorted.get(cursor + 1) {
            Some(next)
                if slot > current.timestamp
                    && slot < next.timestamp
                    && next.timestamp != current.timestamp =>
            {
                let ratio = (slot - current.timestamp) as f64
                    / (next.timestamp - current.timestamp) as f64;
                current.lerp(next, ratio, slot)
            }
            _ => current.at(slot),
        };
        window.push(point);
    }

    window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: i64, c: f64, temp: f64, h: f64) -> DataPoint {
        DataPoint::new(t, c, temp, h).unwrap()
    }

    fn values(window: &[DataPoint]) -> Vec<(i64, f64, f64, f64)> {
        window
            .iter()
            .map(|p| (p.timestamp, p.concentration, p.temperature, p.humidity))
            .collect()
    }

    #[test]
    fn test_two_point_scenario() {
        let source = [point(0, 100.0, 20.0, 40.0), point(60_000, 200.0, 22.0, 42.0)];
        let grid = GridSpec::from_millis(30_000, 3).unwrap();

        let window = resample(&source, &grid, 60_000);

        insta::assert_debug_snapshot!(values(&window), @r###"
        [
            (
                0,
                100.0,
                20.0,
                40.0,
            ),
            (
                30000,
                150.0,
                21.0,
                41.0,
            ),
            (
                60000,
                200.0,
                22.0,
                42.0,
            ),
        ]
        "###);
    }

    #[test]
    fn test_empty_source() {
        assert!(resample(&[], &GridSpec::default(), 1_000).is_empty());
    }

    #[test]
    fn test_single_point_fills_every_slot() {
        let grid = GridSpec::from_millis(1_000, 5).unwrap();
        let window = resample(&[point(2_000, 7.0, 8.0, 9.0)], &grid, 10_000);

        assert_eq!(window.len(), 5);
        assert!(window
            .iter()
            .all(|p| (p.concentration, p.temperature, p.humidity) == (7.0, 8.0, 9.0)));
        assert_eq!(window.last().unwrap().timestamp, 10_000);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let grid = GridSpec::from_millis(30_000, 3).unwrap();
        let sorted = [point(0, 100.0, 20.0, 40.0), point(60_000, 200.0, 22.0, 42.0)];
        let reversed = [sorted[1], sorted[0]];

        assert_eq!(resample(&sorted, &grid, 0), resample(&reversed, &grid, 0));
    }

    #[test]
    fn test_anchor_moves_to_newest_sample_when_clock_lags() {
        let grid = GridSpec::from_millis(10, 4).unwrap();
        let window = resample(&[point(500, 1.0, 1.0, 1.0)], &grid, 100);

        let times: Vec<i64> = window.iter().map(|p| p.timestamp).collect();
        assert_eq!(times, vec![470, 480, 490, 500]);
    }

    #[test]
    fn test_duplicate_timestamps_do_not_divide_by_zero() {
        let grid = GridSpec::from_millis(50, 3).unwrap();
        let source = [
            point(0, 1.0, 1.0, 1.0),
            point(50, 2.0, 2.0, 2.0),
            point(50, 3.0, 3.0, 3.0),
            point(100, 4.0, 4.0, 4.0),
        ];

        let window = resample(&source, &grid, 100);

        assert!(window.iter().all(|p| p.concentration.is_finite()));
        assert_eq!(window[1].concentration, 3.0);
        assert_eq!(window[2].concentration, 4.0);
    }
}
