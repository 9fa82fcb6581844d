//! Daemon configuration: `airgrid.toml` with environment overrides

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use airgrid_config::AppConfig;
use airgrid_core::{AssemblyPolicy, GridSpec};
use anyhow::{bail, ensure, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Http,
    Simulator,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Where readings come from
    pub driver: DriverKind,

    /// Reading backend base URL
    pub ingest_url: String,
    pub ingest_limit: usize,
    pub ingest_timeout: Duration,

    /// Forecasting service base URL
    pub forecast_url: String,
    pub forecast_timeout: Duration,

    /// Optional `sensor_data.json` export for seeded backfill
    pub seed_path: Option<PathBuf>,

    pub fetch_interval: Duration,
    pub predict_interval: Duration,

    /// Directory receiving `predictions.jsonl`
    pub output_dir: Option<PathBuf>,

    pub grid: GridSpec,
    pub policy: AssemblyPolicy,
}

impl DaemonConfig {
    /// Resolve configuration from the file settings and process environment
    pub fn from_env(app: &AppConfig) -> Result<Self> {
        Self::resolve(app, |key| env::var(key).ok())
    }

    /// Resolve with an injectable variable lookup
    pub fn resolve<F>(app: &AppConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let driver = match lookup("INGEST_DRIVER")
            .unwrap_or_else(|| app.ingest_driver())
            .as_str()
        {
            "http" => DriverKind::Http,
            "simulator" => DriverKind::Simulator,
            other => bail!("Unknown INGEST_DRIVER '{}' (expected http or simulator)", other),
        };

        let ingest_url = lookup("INGEST_URL").unwrap_or_else(|| app.ingest_url());
        let forecast_url = lookup("FORECAST_URL").unwrap_or_else(|| app.forecast_url());
        let seed_path = lookup("SEED_PATH").map(PathBuf::from).or_else(|| app.seed_path());
        let output_dir = lookup("OUTPUT_DIR")
            .map(PathBuf::from)
            .or_else(|| app.output_dir());

        let fetch_secs = match lookup("FETCH_INTERVAL") {
            Some(v) => v.parse().context("Invalid FETCH_INTERVAL")?,
            None => app.fetch_interval_secs(),
        };
        let predict_secs = match lookup("PREDICT_INTERVAL") {
            Some(v) => v.parse().context("Invalid PREDICT_INTERVAL")?,
            None => app.predict_interval_secs(),
        };
        ensure!(fetch_secs > 0, "FETCH_INTERVAL must be positive");
        ensure!(predict_secs > 0, "PREDICT_INTERVAL must be positive");

        let grid = GridSpec::new(Duration::from_secs(app.interval_secs()), app.point_count())
            .context("Invalid [grid] settings")?;
        let policy = AssemblyPolicy {
            coincidence_tolerance_ms: secs_to_ms(app.coincidence_tolerance_secs())
                .context("Invalid coincidence_tolerance_secs")?,
            lookback_ms: secs_to_ms(app.lookback_secs()).context("Invalid lookback_secs")?,
            backfill: app.backfill(),
        };

        Ok(Self {
            driver,
            ingest_url,
            ingest_limit: app.ingest_limit(),
            ingest_timeout: Duration::from_secs(app.ingest_timeout_secs()),
            forecast_url,
            forecast_timeout: Duration::from_secs(app.forecast_timeout_secs()),
            seed_path,
            fetch_interval: Duration::from_secs(fetch_secs),
            predict_interval: Duration::from_secs(predict_secs),
            output_dir,
            grid,
            policy,
        })
    }
}

fn secs_to_ms(secs: u64) -> Result<i64> {
    let ms = secs.checked_mul(1000).context("value too large")?;
    Ok(i64::try_from(ms)?)
}
