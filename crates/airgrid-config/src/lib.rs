use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "AIRGRID_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "airgrid.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GridConfig {
    pub interval_secs: Option<u64>,
    pub point_count: Option<usize>,
    pub coincidence_tolerance_secs: Option<u64>,
    pub lookback_secs: Option<u64>,
    pub backfill: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IngestConfig {
    /// `http` or `simulator`
    pub driver: Option<String>,
    pub base_url: Option<String>,
    pub limit: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForecastConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    pub fetch_interval_secs: Option<u64>,
    pub predict_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub grid: Option<GridConfig>,
    pub ingest: Option<IngestConfig>,
    pub seed: Option<SeedConfig>,
    pub forecast: Option<ForecastConfig>,
    pub schedule: Option<ScheduleConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from the AIRGRID_CONFIG path (TOML) if present, with defaults otherwise
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<AppConfig>(s)?)
    }

    fn grid_cfg(&self) -> GridConfig {
        self.grid.clone().unwrap_or_default()
    }

    /// Resample cadence in seconds (default 30)
    pub fn interval_secs(&self) -> u64 {
        self.grid_cfg().interval_secs.unwrap_or(30)
    }

    /// Window size expected by the forecaster (default 240)
    pub fn point_count(&self) -> usize {
        self.grid_cfg().point_count.unwrap_or(240)
    }

    /// Real/synthetic coincidence tolerance in seconds (default 60)
    pub fn coincidence_tolerance_secs(&self) -> u64 {
        self.grid_cfg().coincidence_tolerance_secs.unwrap_or(60)
    }

    /// How far back real readings are accepted (default 2 hours)
    pub fn lookback_secs(&self) -> u64 {
        self.grid_cfg().lookback_secs.unwrap_or(2 * 60 * 60)
    }

    pub fn backfill(&self) -> bool {
        self.grid_cfg().backfill.unwrap_or(true)
    }

    /// Reading source driver (default "http")
    pub fn ingest_driver(&self) -> String {
        self.ingest
            .as_ref()
            .and_then(|i| i.driver.clone())
            .unwrap_or_else(|| "http".to_string())
    }

    /// Reading backend base URL (default http://127.0.0.1:5000)
    pub fn ingest_url(&self) -> String {
        self.ingest
            .as_ref()
            .and_then(|i| i.base_url.clone())
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
    }

    /// Maximum number of messages requested per fetch (default 1000)
    pub fn ingest_limit(&self) -> usize {
        self.ingest.as_ref().and_then(|i| i.limit).unwrap_or(1000)
    }

    pub fn ingest_timeout_secs(&self) -> u64 {
        self.ingest.as_ref().and_then(|i| i.timeout_secs).unwrap_or(10)
    }

    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed.as_ref().and_then(|s| s.path.clone())
    }

    /// Forecasting service base URL (default http://127.0.0.1:5001)
    pub fn forecast_url(&self) -> String {
        self.forecast
            .as_ref()
            .and_then(|f| f.url.clone())
            .unwrap_or_else(|| "http://127.0.0.1:5001".to_string())
    }

    pub fn forecast_timeout_secs(&self) -> u64 {
        self.forecast
            .as_ref()
            .and_then(|f| f.timeout_secs)
            .unwrap_or(30)
    }

    /// Seconds between reading fetches (default 300)
    pub fn fetch_interval_secs(&self) -> u64 {
        self.schedule
            .as_ref()
            .and_then(|s| s.fetch_interval_secs)
            .unwrap_or(300)
    }

    /// Seconds between prediction runs (default 300)
    pub fn predict_interval_secs(&self) -> u64 {
        self.schedule
            .as_ref()
            .and_then(|s| s.predict_interval_secs)
            .unwrap_or(300)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output.as_ref().and_then(|o| o.dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_forecast_contract() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.interval_secs(), 30);
        assert_eq!(cfg.point_count(), 240);
        assert_eq!(cfg.coincidence_tolerance_secs(), 60);
        assert_eq!(cfg.lookback_secs(), 7200);
        assert!(cfg.backfill());
        assert_eq!(cfg.ingest_driver(), "http");
        assert_eq!(cfg.ingest_limit(), 1000);
        assert_eq!(cfg.fetch_interval_secs(), 300);
        assert_eq!(cfg.predict_interval_secs(), 300);
        assert!(cfg.seed_path().is_none());
        assert!(cfg.output_dir().is_none());
    }

    #[test]
    fn test_partial_toml_overrides_selected_values() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [grid]
            interval_secs = 60
            backfill = false

            [ingest]
            base_url = "http://sensors.local:5000"

            [seed]
            path = "sensor_data.json"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.interval_secs(), 60);
        assert_eq!(cfg.point_count(), 240);
        assert!(!cfg.backfill());
        assert_eq!(cfg.ingest_url(), "http://sensors.local:5000");
        assert_eq!(cfg.seed_path(), Some(PathBuf::from("sensor_data.json")));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = AppConfig::from_toml_str("[grid]\npoint_count = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.point_count(), 240);
    }

    #[test]
    fn test_file_is_read_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airgrid.toml");
        fs::write(&path, "[schedule]\nfetch_interval_secs = 5\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.fetch_interval_secs(), 5);
    }
}
