//! Air-quality classification and latest-conditions summary

use serde::Serialize;

use crate::types::{PayloadValue, RawReading, TimestampMs};

/// Air Quality Index band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Unknown,
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Band for an index value; a missing or zero index is `Unknown`
    pub fn classify(aqi: Option<f64>) -> Self {
        match aqi {
            None => AqiCategory::Unknown,
            Some(v) if v == 0.0 || v.is_nan() => AqiCategory::Unknown,
            Some(v) if v <= 50.0 => AqiCategory::Good,
            Some(v) if v <= 100.0 => AqiCategory::Moderate,
            Some(v) if v <= 150.0 => AqiCategory::UnhealthyForSensitive,
            Some(v) if v <= 200.0 => AqiCategory::Unhealthy,
            Some(v) if v <= 300.0 => AqiCategory::VeryUnhealthy,
            Some(_) => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Unknown => "Unknown",
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for Sensitive",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

/// Snapshot of the newest reading, fields kept optional
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestConditions {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// AQI, falling back to `ppm`
    pub aqi: Option<f64>,
    pub co2: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub timestamp: Option<TimestampMs>,
}

impl LatestConditions {
    /// Summary of the first reading; backends return newest first
    pub fn from_readings(readings: &[RawReading]) -> Option<Self> {
        let latest = readings.first()?;
        let payload = &latest.payload;
        let value = |v: &Option<PayloadValue>| v.as_ref().and_then(PayloadValue::as_f64);

        Some(Self {
            temperature: value(&payload.temperature),
            humidity: value(&payload.humidity),
            aqi: value(&payload.aqi).or_else(|| value(&payload.ppm)),
            co2: value(&payload.co2),
            pm25: value(&payload.pm25),
            pm10: value(&payload.pm10),
            timestamp: latest.timestamp.to_millis(),
        })
    }

    pub fn category(&self) -> AqiCategory {
        AqiCategory::classify(self.aqi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawTimestamp, ReadingPayload};

    #[test]
    fn test_aqi_bands() {
        assert_eq!(AqiCategory::classify(None), AqiCategory::Unknown);
        assert_eq!(AqiCategory::classify(Some(0.0)), AqiCategory::Unknown);
        assert_eq!(AqiCategory::classify(Some(50.0)), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(Some(50.5)), AqiCategory::Moderate);
        assert_eq!(
            AqiCategory::classify(Some(150.0)),
            AqiCategory::UnhealthyForSensitive
        );
        assert_eq!(AqiCategory::classify(Some(200.0)), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::classify(Some(300.0)), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::classify(Some(301.0)), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::Hazardous.label(), "Hazardous");
    }

    #[test]
    fn test_latest_conditions_from_first_reading() {
        let newest = RawReading {
            topic: "sensors/air".into(),
            payload: ReadingPayload {
                temperature: Some(23.0.into()),
                ppm: Some(75.0.into()),
                pm25: Some(PayloadValue::Text("12.5".into())),
                ..Default::default()
            },
            timestamp: RawTimestamp::Millis(2_000),
        };
        let older = RawReading {
            payload: ReadingPayload {
                aqi: Some(10.0.into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let latest = LatestConditions::from_readings(&[newest, older]).unwrap();

        assert_eq!(latest.temperature, Some(23.0));
        assert_eq!(latest.aqi, Some(75.0));
        assert_eq!(latest.pm25, Some(12.5));
        assert_eq!(latest.humidity, None);
        assert_eq!(latest.timestamp, Some(2_000));
        assert_eq!(latest.category(), AqiCategory::Moderate);
        assert!(LatestConditions::from_readings(&[]).is_none());
    }
}
