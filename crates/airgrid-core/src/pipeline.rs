//! Collaborator seams and the fetch → assemble → forecast cycle

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::normalize::normalize_all;
use crate::quality::LatestConditions;
use crate::types::{DataPoint, Prediction, RawReading, Series, TimestampMs};
use crate::window::{AssemblyError, AssemblyResult, Window, WindowAssembler};

/// Failure of an external collaborator
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed upstream response: {0}")]
    Format(String),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Supplier of recent raw readings, in any order
#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_readings(&self) -> UpstreamResult<Vec<RawReading>>;
}

/// Supplier of an archival sample used to seed synthetic backfill
#[async_trait::async_trait]
pub trait SeedSource: Send + Sync {
    async fn seed_sample(&self) -> UpstreamResult<Vec<DataPoint>>;
}

/// Consumer of assembled windows
#[async_trait::async_trait]
pub trait Forecaster: Send + Sync {
    async fn forecast(&self, window: &Window) -> UpstreamResult<Vec<Prediction>>;
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Forecast failed: {0}")]
    Forecast(#[source] UpstreamError),
}

/// Window sent to the forecaster and what came back
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub window: Window,
    pub predictions: Vec<Prediction>,
}

/// Wires a reading source and a forecaster around a [`WindowAssembler`]
pub struct PredictionCycle {
    source: Box<dyn ReadingSource>,
    forecaster: Box<dyn Forecaster>,
    assembler: WindowAssembler,
}

impl PredictionCycle {
    pub fn new(
        source: Box<dyn ReadingSource>,
        forecaster: Box<dyn Forecaster>,
        assembler: WindowAssembler,
    ) -> Self {
        Self {
            source,
            forecaster,
            assembler,
        }
    }

    pub fn assembler(&self) -> &WindowAssembler {
        &self.assembler
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch and normalize readings; a failed fetch yields an empty series
    pub async fn collect(&self) -> Series {
        match self.source.fetch_readings().await {
            Ok(readings) => {
                log_latest(&readings);
                let series = normalize_all(&readings);
                info!(
                    "Fetched {} readings from {}, {} usable",
                    readings.len(),
                    self.source.name(),
                    series.len()
                );
                series
            }
            Err(e) => {
                warn!("Reading source {} failed: {}", self.source.name(), e);
                Vec::new()
            }
        }
    }

    pub fn assemble(&self, now: TimestampMs, series: &[DataPoint]) -> AssemblyResult<Window> {
        self.assembler.assemble(now, series)
    }

    /// Hand a complete window to the forecaster; failures are not retried
    pub async fn forecast(&self, window: &Window) -> Result<Vec<Prediction>, CycleError> {
        let predictions = self
            .forecaster
            .forecast(window)
            .await
            .map_err(CycleError::Forecast)?;
        info!(
            "Received {} predictions for {:?} window ending at {}",
            predictions.len(),
            window.origin(),
            window.end()
        );
        Ok(predictions)
    }

    /// One full fetch → assemble → forecast pass
    #[instrument(skip(self))]
    pub async fn run(&self, now: TimestampMs) -> Result<CycleOutcome, CycleError> {
        let window = match self.source.fetch_readings().await {
            Ok(readings) => {
                log_latest(&readings);
                self.assembler.assemble_readings(now, &readings)?
            }
            Err(e) => {
                warn!("Reading source {} failed: {}", self.source.name(), e);
                self.assembler.assemble_fallback(now)?
            }
        };

        let predictions = self.forecast(&window).await?;
        Ok(CycleOutcome {
            window,
            predictions,
        })
    }
}

fn log_latest(readings: &[RawReading]) {
    if let Some(latest) = LatestConditions::from_readings(readings) {
        info!(
            temperature = ?latest.temperature,
            humidity = ?latest.humidity,
            aqi = ?latest.aqi,
            co2 = ?latest.co2,
            pm25 = ?latest.pm25,
            pm10 = ?latest.pm10,
            "Latest conditions: {}",
            latest.category().label()
        );
    }
}
