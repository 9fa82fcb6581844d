//! JSON-lines archive of prediction runs

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use airgrid_core::{format_timestamp, CycleOutcome, DataOrigin, Prediction, TimestampMs};
use anyhow::Result;
use serde::Serialize;

pub const PREDICTIONS_FILE: &str = "predictions.jsonl";

#[derive(Debug, Serialize)]
struct PredictionRecord<'a> {
    generated_at: Option<String>,
    origin: DataOrigin,
    real_points: usize,
    window_start: Option<String>,
    window_end: Option<String>,
    predictions: &'a [Prediction],
}

pub struct PredictionSink {
    file: PathBuf,
}

impl PredictionSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        create_dir_all(dir)?;
        Ok(Self {
            file: dir.join(PREDICTIONS_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Append one run as a single line
    pub fn write(&self, generated_at: TimestampMs, outcome: &CycleOutcome) -> Result<()> {
        let record = PredictionRecord {
            generated_at: format_timestamp(generated_at),
            origin: outcome.window.origin(),
            real_points: outcome.window.real_points(),
            window_start: format_timestamp(outcome.window.start()),
            window_end: format_timestamp(outcome.window.end()),
            predictions: &outcome.predictions,
        };
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        let line = serde_json::to_string(&record)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }
}
