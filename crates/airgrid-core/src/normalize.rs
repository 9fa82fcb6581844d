//! Raw reading normalization

use tracing::debug;

use crate::types::{DataPoint, PayloadValue, RawReading, Series};

/// Map a raw reading onto a canonical data point.
///
/// Returns `None` when the concentration (any alias), temperature, humidity
/// or timestamp is missing or not a finite number. Rejected readings are
/// dropped by callers, never reported as errors.
pub fn normalize(reading: &RawReading) -> Option<DataPoint> {
    let payload = &reading.payload;
    let concentration = payload.concentration()?;
    let temperature = payload.temperature.as_ref().and_then(PayloadValue::as_f64)?;
    let humidity = payload.humidity.as_ref().and_then(PayloadValue::as_f64)?;
    let timestamp = reading.timestamp.to_millis()?;

    DataPoint::new(timestamp, concentration, temperature, humidity)
}

/// Normalize a batch of readings into a series sorted by timestamp
pub fn normalize_all(readings: &[RawReading]) -> Series {
    let mut series: Series = readings.iter().filter_map(normalize).collect();
    let rejected = readings.len() - series.len();
    if rejected > 0 {
        debug!(
            "Dropped {} of {} readings missing required fields",
            rejected,
            readings.len()
        );
    }

    series.sort_by_key(|point| point.timestamp);
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawTimestamp, ReadingPayload};

    fn reading(
        timestamp: i64,
        ppm: Option<f64>,
        temperature: Option<f64>,
        humidity: Option<f64>,
    ) -> RawReading {
        RawReading {
            topic: "sensors/air".into(),
            payload: ReadingPayload {
                ppm: ppm.map(PayloadValue::from),
                temperature: temperature.map(PayloadValue::from),
                humidity: humidity.map(PayloadValue::from),
                ..Default::default()
            },
            timestamp: RawTimestamp::Millis(timestamp),
        }
    }

    #[test]
    fn test_complete_reading_normalizes() {
        let point = normalize(&reading(1_000, Some(410.0), Some(22.5), Some(48.0))).unwrap();
        assert_eq!(point.timestamp, 1_000);
        assert_eq!(point.concentration, 410.0);
        assert_eq!(point.temperature, 22.5);
        assert_eq!(point.humidity, 48.0);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(normalize(&reading(1, None, Some(22.0), Some(40.0))).is_none());
        assert!(normalize(&reading(1, Some(400.0), None, Some(40.0))).is_none());
        assert!(normalize(&reading(1, Some(400.0), Some(22.0), None)).is_none());
    }

    #[test]
    fn test_unparseable_timestamp_is_rejected() {
        let mut raw = reading(1, Some(400.0), Some(22.0), Some(40.0));
        raw.timestamp = RawTimestamp::Text("not a date".into());
        assert!(normalize(&raw).is_none());

        raw.timestamp = RawTimestamp::Missing;
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn test_co2_alias_used_when_ppm_absent() {
        let mut raw = reading(5, None, Some(20.0), Some(30.0));
        raw.payload.co2 = Some(PayloadValue::Text("615".into()));
        assert_eq!(normalize(&raw).unwrap().concentration, 615.0);
    }

    #[test]
    fn test_normalize_is_pure() {
        let raw = reading(7, Some(1.0), Some(2.0), Some(3.0));
        assert_eq!(normalize(&raw), normalize(&raw));
    }

    #[test]
    fn test_normalize_all_sorts_and_filters() {
        let readings = vec![
            reading(3_000, Some(3.0), Some(20.0), Some(40.0)),
            reading(1_000, Some(1.0), Some(20.0), Some(40.0)),
            reading(2_000, None, Some(20.0), Some(40.0)),
            reading(2_500, Some(2.5), Some(20.0), Some(40.0)),
        ];
        let series = normalize_all(&readings);
        let times: Vec<i64> = series.iter().map(|p| p.timestamp).collect();
        assert_eq!(times, vec![1_000, 2_500, 3_000]);
    }
}
