//! Simulated air-quality sensor for testing

use std::f64::consts::PI;
use std::sync::Mutex;

use airgrid_core::{
    format_timestamp, PayloadValue, RawReading, RawTimestamp, ReadingPayload, ReadingSource,
    TimestampMs, UpstreamResult,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SIMULATOR_TOPIC: &str = "simulator/air";

/// Generates the kind of irregular traffic a real sensor backend returns:
/// jittered cadence, occasional gaps, numbers sent as strings and readings
/// with a field missing.
pub struct SimulatedSource {
    cadence_ms: i64,
    count: usize,
    base_ppm: f64,
    base_temp: f64,
    base_humidity: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedSource {
    /// `count` readings per fetch, roughly `cadence_ms` apart
    pub fn new(count: usize, cadence_ms: i64) -> Self {
        Self::with_rng(count, cadence_ms, StdRng::from_entropy())
    }

    pub fn seeded(count: usize, cadence_ms: i64, seed: u64) -> Self {
        Self::with_rng(count, cadence_ms, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, cadence_ms: i64, rng: StdRng) -> Self {
        Self {
            cadence_ms: cadence_ms.max(1),
            count,
            base_ppm: 420.0,
            base_temp: 22.0,
            base_humidity: 45.0,
            rng: Mutex::new(rng),
        }
    }

    /// Readings ending at `now`, newest first like the backend returns them
    pub fn generate(&self, now: TimestampMs) -> Vec<RawReading> {
        let Ok(mut rng) = self.rng.lock() else {
            return Vec::new();
        };
        let jitter = self.cadence_ms / 5;
        let mut t = now;
        let mut readings = Vec::with_capacity(self.count);

        for i in 0..self.count {
            // Dropped transmissions
            if i > 0 && rng.gen_bool(0.05) {
                t -= self.cadence_ms;
                continue;
            }
            let phase = (t as f64 / 3_600_000.0) * 2.0 * PI;
            let ppm = self.base_ppm + 40.0 * phase.sin() + rng.gen_range(-15.0..15.0);
            let temp = self.base_temp + 1.5 * phase.cos() + rng.gen_range(-0.3..0.3);
            let humidity = self.base_humidity - 4.0 * phase.sin() + rng.gen_range(-1.0..1.0);

            let payload = ReadingPayload {
                ppm: Some(payload_value(&mut rng, ppm.round())),
                temperature: Some(payload_value(&mut rng, round_tenth(temp))),
                humidity: rng
                    .gen_bool(0.97)
                    .then(|| payload_value(&mut rng, round_tenth(humidity))),
                ..Default::default()
            };
            let timestamp = match (i % 4, format_timestamp(t)) {
                (0, _) | (_, None) => RawTimestamp::Millis(t),
                (_, Some(text)) => RawTimestamp::Text(text),
            };
            readings.push(RawReading {
                topic: SIMULATOR_TOPIC.to_string(),
                payload,
                timestamp,
            });

            t -= self.cadence_ms + rng.gen_range(-jitter..=jitter);
        }

        tracing::debug!("Simulator produced {} readings", readings.len());
        readings
    }
}

#[async_trait::async_trait]
impl ReadingSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulator"
    }

    async fn fetch_readings(&self) -> UpstreamResult<Vec<RawReading>> {
        Ok(self.generate(Utc::now().timestamp_millis()))
    }
}

/// Some firmware sends numbers as strings
fn payload_value(rng: &mut StdRng, v: f64) -> PayloadValue {
    if rng.gen_bool(0.1) {
        PayloadValue::Text(v.to_string())
    } else {
        PayloadValue::Number(v)
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use airgrid_core::normalize_all;

    const NOW: i64 = 1_714_557_600_000;

    #[test]
    fn test_simulator_readings_shape() {
        let sim = SimulatedSource::seeded(200, 30_000, 7);
        let readings = sim.generate(NOW);

        assert!(!readings.is_empty());
        assert!(readings.len() <= 200);
        assert!(readings.iter().all(|r| r.topic == SIMULATOR_TOPIC));
        assert_eq!(readings[0].timestamp.to_millis(), Some(NOW));
        assert!(readings
            .iter()
            .all(|r| r.timestamp.to_millis().is_some_and(|t| t <= NOW)));
    }

    #[test]
    fn test_simulator_readings_normalize() {
        let sim = SimulatedSource::seeded(200, 30_000, 11);
        let readings = sim.generate(NOW);
        let points = normalize_all(&readings);

        // Only readings missing humidity are rejected
        let complete = readings
            .iter()
            .filter(|r| r.payload.humidity.is_some())
            .count();
        assert_eq!(points.len(), complete);
        assert!(points
            .iter()
            .all(|p| (300.0..=540.0).contains(&p.concentration)));
    }

    #[test]
    fn test_simulator_is_deterministic_when_seeded() {
        let a = SimulatedSource::seeded(50, 10_000, 3).generate(NOW);
        let b = SimulatedSource::seeded(50, 10_000, 3).generate(NOW);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_simulator_as_reading_source() {
        let sim = SimulatedSource::new(20, 30_000);
        assert_eq!(sim.name(), "simulator");
        let readings = sim.fetch_readings().await.unwrap();
        assert!(readings.len() <= 20);
    }
}
