//! Seed samples from a `sensor_data.json` style export

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use airgrid_core::{normalize_all, DataPoint, RawReading, SeedSource, UpstreamResult};
use tracing::{debug, info};

use crate::http::parse_readings;
use crate::IngestResult;

pub struct JsonFileSeed {
    path: PathBuf,
}

impl JsonFileSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized points from the file, oldest first. A missing file is an
    /// empty sample.
    pub async fn load(&self) -> IngestResult<Vec<DataPoint>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Seed file {} not found, using defaults", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let readings = parse_seed(&text)?;
        let points = normalize_all(&readings);
        debug!(
            "Loaded {} seed points from {} readings",
            points.len(),
            readings.len()
        );
        Ok(points)
    }
}

#[async_trait::async_trait]
impl SeedSource for JsonFileSeed {
    async fn seed_sample(&self) -> UpstreamResult<Vec<DataPoint>> {
        Ok(self.load().await?)
    }
}

/// Exports are either a JSON array or objects written back to back
/// (`{...}{...}`); the latter are wrapped into an array before parsing.
pub fn parse_seed(text: &str) -> IngestResult<Vec<RawReading>> {
    let trimmed = text.trim();
    match parse_readings(trimmed.as_bytes()) {
        Ok(readings) => Ok(readings),
        Err(err) => {
            let repaired = format!("[{}]", trimmed.replace("}{", "},{"));
            parse_readings(repaired.as_bytes()).map_err(|_| err)
        }
    }
}
