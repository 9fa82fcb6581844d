//! Fetch and prediction scheduler

use std::time::Duration;

use airgrid_core::{CycleOutcome, DataPoint, PredictionCycle, Series, TimestampMs};
use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::sink::PredictionSink;

/// Refreshes readings and runs predictions on independent timers
pub struct Scheduler {
    cycle: PredictionCycle,
    sink: Option<PredictionSink>,
    fetch_interval: Duration,
    predict_interval: Duration,
    latest: Series,
}

impl Scheduler {
    pub fn new(
        cycle: PredictionCycle,
        sink: Option<PredictionSink>,
        fetch_interval: Duration,
        predict_interval: Duration,
    ) -> Self {
        Self {
            cycle,
            sink,
            fetch_interval,
            predict_interval,
            latest: Series::new(),
        }
    }

    /// Run until the surrounding task is cancelled
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Scheduler started: source={}, fetch every {:?}, predict every {:?}",
            self.cycle.source_name(),
            self.fetch_interval,
            self.predict_interval
        );

        let mut fetch = interval(self.fetch_interval);
        let mut predict = interval(self.predict_interval);
        fetch.set_missed_tick_behavior(MissedTickBehavior::Delay);
        predict.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = fetch.tick() => self.refresh().await,
                _ = predict.tick() => {
                    if let Err(e) = self.predict_once(now_ms()).await {
                        // Retried on the next tick
                        error!("Prediction run failed: {:#}", e);
                    }
                }
            }
        }
    }

    /// Replace the held series with a fresh fetch
    pub async fn refresh(&mut self) {
        self.latest = self.cycle.collect().await;
        if self.latest.is_empty() {
            warn!("No usable readings; next window will be synthetic");
        }
    }

    /// Assemble a window from the held series and forecast it
    pub async fn predict_once(&self, now: TimestampMs) -> Result<CycleOutcome> {
        let window = self
            .cycle
            .assemble(now, &self.latest)
            .context("Window assembly failed")?;
        let predictions = self
            .cycle
            .forecast(&window)
            .await
            .context("Forecast failed")?;
        let outcome = CycleOutcome {
            window,
            predictions,
        };

        if let Some(sink) = &self.sink {
            sink.write(now, &outcome)
                .with_context(|| format!("Failed to write {}", sink.path().display()))?;
        }
        Ok(outcome)
    }

    pub fn latest(&self) -> &[DataPoint] {
        &self.latest
    }
}

fn now_ms() -> TimestampMs {
    Utc::now().timestamp_millis()
}
