//! JSON bodies exchanged with the forecasting service

use airgrid_core::{format_timestamp, DataPoint, Prediction, Window};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ForecastError, ForecastResult};

/// One window entry as the model expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSample {
    pub timestamp: String,
    pub ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl WireSample {
    pub fn from_point(point: &DataPoint) -> ForecastResult<Self> {
        let timestamp =
            format_timestamp(point.timestamp).ok_or(ForecastError::Timestamp(point.timestamp))?;
        Ok(Self {
            timestamp,
            ppm: point.concentration,
            temperature: point.temperature,
            humidity: point.humidity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub data: Vec<WireSample>,
}

impl PredictRequest {
    pub fn from_window(window: &Window) -> ForecastResult<Self> {
        let data = window
            .points()
            .iter()
            .map(WireSample::from_point)
            .collect::<ForecastResult<Vec<_>>>()?;
        Ok(Self { data })
    }
}

/// Decode a successful response. Any number of predictions is accepted.
pub fn parse_predictions(body: &[u8]) -> ForecastResult<Vec<Prediction>> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ForecastError::Format(e.to_string()))?;

    match value.get("predictions") {
        Some(predictions @ Value::Array(_)) => serde_json::from_value(predictions.clone())
            .map_err(|e| ForecastError::Format(format!("bad prediction entry: {e}"))),
        Some(_) => Err(ForecastError::Format(
            "`predictions` is not an array".to_string(),
        )),
        None => match value.get("error").and_then(Value::as_str) {
            Some(message) => Err(ForecastError::Format(format!(
                "no predictions, forecaster said: {message}"
            ))),
            None => Err(ForecastError::Format(
                "response has no `predictions`".to_string(),
            )),
        },
    }
}

/// The `error` field of a JSON error body, else the trimmed body text
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
