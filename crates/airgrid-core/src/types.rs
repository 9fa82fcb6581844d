//! Core data types for sensor readings, data points and predictions

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type (Unix epoch milliseconds, UTC)
pub type TimestampMs = i64;

/// Sorted-ascending sequence of data points
pub type Series = Vec<DataPoint>;

/// Reading as delivered by the ingestion backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawReading {
    /// Message topic the reading was published on
    #[serde(default)]
    pub topic: String,

    /// Sensor values, every one of them optional
    #[serde(default)]
    pub payload: ReadingPayload,

    /// Time of measurement
    #[serde(default)]
    pub timestamp: RawTimestamp,
}

/// Loosely typed payload bag of a raw reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReadingPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<PayloadValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<PayloadValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppm: Option<PayloadValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aqi: Option<PayloadValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<PayloadValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm25: Option<PayloadValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<PayloadValue>,

    /// Unparsed sensor line, kept for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ReadingPayload {
    /// Gas concentration from the first usable alias: `ppm`, then `aqi`, then `co2`
    pub fn concentration(&self) -> Option<f64> {
        [&self.ppm, &self.aqi, &self.co2]
            .into_iter()
            .find_map(|value| value.as_ref().and_then(PayloadValue::as_f64))
    }
}

/// A payload value that may arrive as a number or a numeric string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PayloadValue {
    Number(f64),
    Text(String),
}

impl PayloadValue {
    /// Finite numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            PayloadValue::Number(v) => *v,
            PayloadValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        PayloadValue::Number(value)
    }
}

/// Timestamp of a raw reading: epoch milliseconds or a date string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
    #[default]
    Missing,
}

impl RawTimestamp {
    /// Resolve to epoch milliseconds.
    ///
    /// Accepts RFC 3339 (`2024-05-01T10:00:00Z`), naive ISO 8601 and
    /// `YYYY-MM-DD HH:MM:SS`; naive forms are taken as UTC.
    pub fn to_millis(&self) -> Option<TimestampMs> {
        match self {
            RawTimestamp::Millis(ms) => Some(*ms),
            RawTimestamp::Text(s) => parse_timestamp(s.trim()),
            RawTimestamp::Missing => None,
        }
    }
}

impl From<TimestampMs> for RawTimestamp {
    fn from(ms: TimestampMs) -> Self {
        RawTimestamp::Millis(ms)
    }
}

fn parse_timestamp(s: &str) -> Option<TimestampMs> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).timestamp_millis())
}

/// Format epoch milliseconds as RFC 3339 with millisecond precision
pub fn format_timestamp(ms: TimestampMs) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Canonical sample: all three fields present and finite
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    pub timestamp: TimestampMs,

    /// Gas concentration (ppm)
    #[serde(rename = "ppm")]
    pub concentration: f64,

    /// Temperature (°C)
    pub temperature: f64,

    /// Relative humidity (%)
    pub humidity: f64,
}

impl DataPoint {
    /// Build a data point, refusing non-finite values
    pub fn new(
        timestamp: TimestampMs,
        concentration: f64,
        temperature: f64,
        humidity: f64,
    ) -> Option<Self> {
        let finite = concentration.is_finite() && temperature.is_finite() && humidity.is_finite();
        finite.then_some(Self {
            timestamp,
            concentration,
            temperature,
            humidity,
        })
    }

    /// Same values, moved to another timestamp
    pub fn at(&self, timestamp: TimestampMs) -> Self {
        Self { timestamp, ..*self }
    }

    /// Linear interpolation towards `next` at fractional position `ratio`
    pub fn lerp(&self, next: &DataPoint, ratio: f64, timestamp: TimestampMs) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * ratio;
        Self {
            timestamp,
            concentration: mix(self.concentration, next.concentration),
            temperature: mix(self.temperature, next.temperature),
            humidity: mix(self.humidity, next.humidity),
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// One future step returned by the forecasting service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    /// Timestamp as reported by the forecaster (not validated)
    pub timestamp: String,

    #[serde(rename = "ppm")]
    pub concentration: f64,

    pub temperature: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}
