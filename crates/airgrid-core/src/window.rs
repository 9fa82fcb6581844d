//! Assembly of the fixed-length window handed to the forecaster

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::grid::GridSpec;
use crate::merge::{merge_with_synthetic, DEFAULT_COINCIDENCE_TOLERANCE_MS};
use crate::normalize::normalize_all;
use crate::resample::resample;
use crate::synthetic::{SyntheticGenerator, SyntheticMode};
use crate::types::{DataPoint, RawReading, Series, TimestampMs};

/// Default look-back bound for real readings (2 hours)
pub const DEFAULT_LOOKBACK_MS: i64 = 2 * 60 * 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Insufficient data: window needs {required} points, {available} available")]
    InsufficientData { required: usize, available: usize },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Where the values of a window came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Enough real readings; no backfill
    Real,
    /// No usable real readings; entirely generated
    Synthetic,
    /// Real readings overlaid on a generated baseline
    Merged,
}

/// Exactly `point_count` evenly spaced points ending at `end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window {
    points: Series,
    origin: DataOrigin,
    real_points: usize,
    end: TimestampMs,
}

impl Window {
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn into_points(self) -> Series {
        self.points
    }

    pub fn origin(&self) -> DataOrigin {
        self.origin
    }

    /// Number of in-bound real points the window was built from
    pub fn real_points(&self) -> usize {
        self.real_points
    }

    pub fn start(&self) -> TimestampMs {
        self.points.first().map_or(self.end, |p| p.timestamp)
    }

    pub fn end(&self) -> TimestampMs {
        self.end
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Tunables of the assembler besides the grid itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyPolicy {
    /// Real and synthetic points closer than this share a slot
    pub coincidence_tolerance_ms: i64,
    /// Readings older than `now - lookback_ms` are ignored
    pub lookback_ms: i64,
    /// Pad scarce real data with synthetic points
    pub backfill: bool,
}

impl Default for AssemblyPolicy {
    fn default() -> Self {
        Self {
            coincidence_tolerance_ms: DEFAULT_COINCIDENCE_TOLERANCE_MS,
            lookback_ms: DEFAULT_LOOKBACK_MS,
            backfill: true,
        }
    }
}

/// Builds forecast windows from normalized series
#[derive(Debug, Clone)]
pub struct WindowAssembler {
    grid: GridSpec,
    policy: AssemblyPolicy,
    generator: SyntheticGenerator,
    synthetic_mode: SyntheticMode,
}

impl WindowAssembler {
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            policy: AssemblyPolicy::default(),
            generator: SyntheticGenerator::new(grid),
            synthetic_mode: SyntheticMode::Default,
        }
    }

    pub fn with_policy(mut self, policy: AssemblyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seed backfill statistics from an archival sample
    pub fn with_seed(mut self, seed: &[DataPoint]) -> Self {
        self.synthetic_mode = SyntheticMode::from_seed(seed);
        self
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn policy(&self) -> &AssemblyPolicy {
        &self.policy
    }

    pub fn synthetic_mode(&self) -> &SyntheticMode {
        &self.synthetic_mode
    }

    /// Build a window from an already normalized series
    pub fn assemble(&self, now: TimestampMs, series: &[DataPoint]) -> AssemblyResult<Window> {
        self.assemble_with_rng(now, series, &mut rand::thread_rng())
    }

    #[instrument(skip(self, series, rng), fields(input = series.len()))]
    pub fn assemble_with_rng<R: Rng + ?Sized>(
        &self,
        now: TimestampMs,
        series: &[DataPoint],
        rng: &mut R,
    ) -> AssemblyResult<Window> {
        let required = self.grid.point_count();
        let oldest = now.saturating_sub(self.policy.lookback_ms);
        let mut recent: Series = series
            .iter()
            .filter(|point| point.timestamp >= oldest)
            .copied()
            .collect();
        recent.sort_by_key(|point| point.timestamp);
        let real_points = recent.len();

        if real_points >= required {
            let source = recent.split_off(real_points - required);
            return self.finish(now, &source, DataOrigin::Real, required);
        }

        if !self.policy.backfill {
            warn!(
                "Only {} of {} required points and backfill is disabled",
                real_points, required
            );
            return Err(AssemblyError::InsufficientData {
                required,
                available: real_points,
            });
        }

        let synthetic = self.generator.generate(now, &self.synthetic_mode, rng);
        let (source, origin) = if recent.is_empty() {
            (synthetic, DataOrigin::Synthetic)
        } else {
            let merged = merge_with_synthetic(
                &synthetic,
                &recent,
                self.policy.coincidence_tolerance_ms,
                required,
            );
            (merged, DataOrigin::Merged)
        };
        info!(
            "Backfilling window: {} real points, {} required, origin {:?}",
            real_points, required, origin
        );
        self.finish(now, &source, origin, real_points)
    }

    /// Normalize raw readings, then assemble
    pub fn assemble_readings(
        &self,
        now: TimestampMs,
        readings: &[RawReading],
    ) -> AssemblyResult<Window> {
        let series = normalize_all(readings);
        self.assemble(now, &series)
    }

    /// Window used when the reading source failed outright
    pub fn assemble_fallback(&self, now: TimestampMs) -> AssemblyResult<Window> {
        self.assemble_fallback_with_rng(now, &mut rand::thread_rng())
    }

    pub fn assemble_fallback_with_rng<R: Rng + ?Sized>(
        &self,
        now: TimestampMs,
        rng: &mut R,
    ) -> AssemblyResult<Window> {
        warn!("No real readings available; falling back to synthetic window");
        self.assemble_with_rng(now, &[], rng)
    }

    fn finish(
        &self,
        now: TimestampMs,
        source: &[DataPoint],
        origin: DataOrigin,
        real_points: usize,
    ) -> AssemblyResult<Window> {
        let required = self.grid.point_count();
        let points = resample(source, &self.grid, now);

        let Some(end) = points.last().map(|p| p.timestamp) else {
            return Err(AssemblyError::InsufficientData {
                required,
                available: 0,
            });
        };
        if points.len() != required {
            return Err(AssemblyError::InsufficientData {
                required,
                available: points.len(),
            });
        }

        debug!(
            "Assembled {} point window ending at {} ({:?})",
            points.len(),
            end,
            origin
        );
        Ok(Window {
            points,
            origin,
            real_points,
            end,
        })
    }
}
