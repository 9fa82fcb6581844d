//! Summary statistics over sensor fields

use crate::types::DataPoint;

/// Accumulator for summarising a stream of observations
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    observations: Vec<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.observations.push(value);
    }

    pub fn mean(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }
        let sum: f64 = self.observations.iter().sum();
        Some(sum / self.observations.len() as f64)
    }

    /// Population variance
    pub fn variance(&self) -> Option<f64> {
        let mean = self.mean()?;
        let squares: f64 = self
            .observations
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum();
        Some(squares / self.observations.len() as f64)
    }
}

/// Mean and variance of one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
}

impl Moments {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    fn from_accumulator(acc: &Accumulator) -> Option<Self> {
        Some(Self {
            mean: acc.mean()?,
            variance: acc.variance()?,
        })
    }
}

/// Per-field moments of a sample of data points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub concentration: Moments,
    pub temperature: Moments,
    pub humidity: Moments,
}

impl FieldStats {
    /// `None` for an empty sample
    pub fn from_points(points: &[DataPoint]) -> Option<Self> {
        let mut concentration = Accumulator::new();
        let mut temperature = Accumulator::new();
        let mut humidity = Accumulator::new();

        for point in points {
            concentration.add(point.concentration);
            temperature.add(point.temperature);
            humidity.add(point.humidity);
        }

        Some(Self {
            concentration: Moments::from_accumulator(&concentration)?,
            temperature: Moments::from_accumulator(&temperature)?,
            humidity: Moments::from_accumulator(&humidity)?,
        })
    }
}
