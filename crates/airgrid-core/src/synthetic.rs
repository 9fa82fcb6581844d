//! Synthetic fallback series used when real data is scarce

use std::f64::consts::PI;

use rand::Rng;

use crate::grid::GridSpec;
use crate::stats::{FieldStats, Moments};
use crate::types::{DataPoint, Series, TimestampMs};

/// Number of most recent seed points the statistics are computed from
pub const SEED_SAMPLE_SIZE: usize = 10;

/// Baselines used when no seed sample is available
pub const DEFAULT_CONCENTRATION: f64 = 300.0;
pub const DEFAULT_TEMPERATURE: f64 = 25.0;
pub const DEFAULT_HUMIDITY: f64 = 50.0;

/// How a synthetic series is parameterised
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntheticMode {
    /// Statistics of a recent real sample
    Seeded(FieldStats),
    /// Fixed baselines
    Default,
}

impl SyntheticMode {
    /// Seeded from the last [`SEED_SAMPLE_SIZE`] points, or default for an empty sample
    pub fn from_seed(seed: &[DataPoint]) -> Self {
        let recent = &seed[seed.len().saturating_sub(SEED_SAMPLE_SIZE)..];
        FieldStats::from_points(recent).map_or(SyntheticMode::Default, SyntheticMode::Seeded)
    }
}

/// Generator for plausible full-length series.
///
/// Values carry uniform noise plus a slow sinusoid completing two periods
/// across the window, so the model sees something shaped like real data.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticGenerator {
    grid: GridSpec,
}

impl SyntheticGenerator {
    pub fn new(grid: GridSpec) -> Self {
        Self { grid }
    }

    /// Generate `point_count` points ending at `now`
    pub fn generate<R: Rng + ?Sized>(
        &self,
        now: TimestampMs,
        mode: &SyntheticMode,
        rng: &mut R,
    ) -> Series {
        let start = self.grid.start_for(now);
        let count = self.grid.point_count();

        (0..count)
            .filter_map(|i| {
                let timestamp = self.grid.slot(start, i);
                let phase = phase(i, count);
                match mode {
                    SyntheticMode::Seeded(stats) => seeded_point(timestamp, phase, stats, rng),
                    SyntheticMode::Default => default_point(timestamp, phase, rng),
                }
            })
            .collect()
    }
}

/// Sinusoid phase at slot `index`, running from 0 to 4π across the window
fn phase(index: usize, count: usize) -> f64 {
    let last_index = count.saturating_sub(1).max(1) as f64;
    index as f64 / last_index * PI * 4.0
}

fn seeded_point<R: Rng + ?Sized>(
    timestamp: TimestampMs,
    phase: f64,
    stats: &FieldStats,
    rng: &mut R,
) -> Option<DataPoint> {
    let mut noisy = |moments: &Moments| moments.mean + symmetric(rng, moments.std_dev());
    let concentration = noisy(&stats.concentration);
    let temperature = noisy(&stats.temperature);
    let humidity = noisy(&stats.humidity);
    let sine = (phase + rng.gen::<f64>() * 0.5).sin();

    DataPoint::new(
        timestamp,
        (concentration + sine * 10.0).round().max(0.0),
        round_tenth(temperature + sine * 0.5),
        round_tenth(humidity + sine * 2.0).clamp(0.0, 100.0),
    )
}

fn default_point<R: Rng + ?Sized>(
    timestamp: TimestampMs,
    phase: f64,
    rng: &mut R,
) -> Option<DataPoint> {
    let sine = phase.sin();
    let concentration = DEFAULT_CONCENTRATION + sine * 20.0 + symmetric(rng, 15.0);
    let temperature = DEFAULT_TEMPERATURE + sine * 2.0 + symmetric(rng, 0.5);
    let humidity = DEFAULT_HUMIDITY + sine * 5.0 + symmetric(rng, 1.5);

    DataPoint::new(
        timestamp,
        concentration.round().max(0.0),
        round_tenth(temperature),
        round_tenth(humidity).clamp(0.0, 100.0),
    )
}

/// Uniform in `[-half_width, half_width)`
fn symmetric<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * 2.0 * half_width
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
