//! Grid parameters shared between the window producer and the forecaster

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::types::TimestampMs;

/// Grid parameter error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid must contain at least one point")]
    ZeroPoints,

    #[error("Grid interval must be positive, got {0}ms")]
    NonPositiveInterval(i64),

    #[error("Window duration overflows: {point_count} points at {interval_ms}ms")]
    Overflow { point_count: usize, interval_ms: i64 },
}

/// Fixed-size, evenly spaced time grid.
///
/// `window_duration = interval × (point_count − 1)`; the forecasting model is
/// trained against exactly these values, so both sides must agree on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    interval_ms: i64,
    point_count: usize,
}

impl GridSpec {
    pub const DEFAULT_INTERVAL_MS: i64 = 30_000;
    pub const DEFAULT_POINT_COUNT: usize = 240;

    pub fn new(interval: Duration, point_count: usize) -> Result<Self, GridError> {
        let interval_ms = i64::try_from(interval.as_millis()).map_err(|_| GridError::Overflow {
            point_count,
            interval_ms: i64::MAX,
        })?;
        Self::from_millis(interval_ms, point_count)
    }

    pub fn from_millis(interval_ms: i64, point_count: usize) -> Result<Self, GridError> {
        if point_count == 0 {
            return Err(GridError::ZeroPoints);
        }
        if interval_ms <= 0 {
            return Err(GridError::NonPositiveInterval(interval_ms));
        }
        i64::try_from(point_count - 1)
            .ok()
            .and_then(|steps| steps.checked_mul(interval_ms))
            .ok_or(GridError::Overflow {
                point_count,
                interval_ms,
            })?;
        Ok(Self {
            interval_ms,
            point_count,
        })
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Span between the first and the last slot
    pub fn window_duration_ms(&self) -> i64 {
        // Bounded by the check in `from_millis`
        self.interval_ms * (self.point_count as i64 - 1)
    }

    /// First slot of a grid whose last slot is `end`
    pub fn start_for(&self, end: TimestampMs) -> TimestampMs {
        end.saturating_sub(self.window_duration_ms())
    }

    /// Timestamp of slot `index` on a grid starting at `start`
    pub fn slot(&self, start: TimestampMs, index: usize) -> TimestampMs {
        start.saturating_add(self.interval_ms * index as i64)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            interval_ms: Self::DEFAULT_INTERVAL_MS,
            point_count: Self::DEFAULT_POINT_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_contract() {
        let grid = GridSpec::default();
        assert_eq!(grid.point_count(), 240);
        assert_eq!(grid.interval_ms(), 30_000);
        assert_eq!(grid.window_duration_ms(), 7_170_000);
    }

    #[test]
    fn test_grid_validation() {
        assert_eq!(GridSpec::from_millis(30_000, 0), Err(GridError::ZeroPoints));
        assert_eq!(
            GridSpec::from_millis(0, 10),
            Err(GridError::NonPositiveInterval(0))
        );
        assert!(matches!(
            GridSpec::from_millis(i64::MAX, 3),
            Err(GridError::Overflow { .. })
        ));
        assert!(GridSpec::new(Duration::from_secs(30), 1).is_ok());
    }

    #[test]
    fn test_slots() {
        let grid = GridSpec::from_millis(30_000, 3).unwrap();
        let start = grid.start_for(60_000);
        assert_eq!(start, 0);
        assert_eq!(grid.slot(start, 2), 60_000);
    }

    #[test]
    fn test_single_point_grid_has_no_duration() {
        let grid = GridSpec::from_millis(30_000, 1).unwrap();
        assert_eq!(grid.window_duration_ms(), 0);
        assert_eq!(grid.start_for(5_000), 5_000);
    }
}
