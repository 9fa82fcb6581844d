//! airgrid daemon
//!
//! This binary coordinates:
//! - Periodic reading fetches from the sensor backend (or the simulator)
//! - Window assembly with synthetic backfill
//! - Forecast requests and the prediction archive

mod config;
mod scheduler;
mod sink;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use airgrid_config::AppConfig;
use airgrid_core::{Forecaster, PredictionCycle, ReadingSource, SeedSource, WindowAssembler};
use airgrid_forecast::HttpForecaster;
use airgrid_ingest::{HttpReadingSource, JsonFileSeed, SimulatedSource};

use crate::config::{DaemonConfig, DriverKind};
use crate::scheduler::Scheduler;
use crate::sink::PredictionSink;

#[tokio::main]
async fn main() -> Result<()> {
    airgrid_obs::init("airgridd");

    info!("Starting airgrid daemon");

    let app = AppConfig::load().context("Failed to load configuration file")?;
    let config = DaemonConfig::from_env(&app)?;
    info!("Loaded configuration: {:?}", config);

    let source: Box<dyn ReadingSource> = match config.driver {
        DriverKind::Http => Box::new(
            HttpReadingSource::new(&config.ingest_url, config.ingest_limit, config.ingest_timeout)
                .context("Failed to create reading source")?,
        ),
        DriverKind::Simulator => Box::new(SimulatedSource::new(
            config.grid.point_count() / 4,
            config.grid.interval_ms(),
        )),
    };
    info!("Reading source ready: {}", source.name());

    let forecaster: Box<dyn Forecaster> = Box::new(
        HttpForecaster::new(&config.forecast_url, config.forecast_timeout)
            .context("Failed to create forecaster client")?,
    );

    let mut assembler = WindowAssembler::new(config.grid).with_policy(config.policy);
    if let Some(path) = &config.seed_path {
        let seed = JsonFileSeed::new(path);
        match seed.seed_sample().await {
            Ok(points) if !points.is_empty() => {
                info!("Seeding backfill from {} points in {}", points.len(), path.display());
                assembler = assembler.with_seed(&points);
            }
            Ok(_) => info!("Seed sample is empty; backfill uses defaults"),
            Err(e) => warn!("Ignoring seed file {}: {}", path.display(), e),
        }
    }

    let sink = config
        .output_dir
        .as_ref()
        .map(PredictionSink::new)
        .transpose()
        .context("Failed to prepare output directory")?;

    let cycle = PredictionCycle::new(source, forecaster, assembler);
    let mut scheduler = Scheduler::new(
        cycle,
        sink,
        config.fetch_interval,
        config.predict_interval,
    );

    info!("Daemon running - press Ctrl+C to stop");

    tokio::select! {
        result = scheduler.run() => {
            if let Err(e) = result {
                error!("Scheduler error: {:#}", e);
                return Err(e);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
    }

    info!("airgrid daemon stopped");
    Ok(())
}
