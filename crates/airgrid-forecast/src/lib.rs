//! Client for the `/predict` forecasting service

pub mod client;
pub mod wire;

pub use client::*;
pub use wire::*;

use airgrid_core::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Forecaster rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid forecast response: {0}")]
    Format(String),

    #[error("Timestamp {0} cannot be encoded")]
    Timestamp(i64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL cannot carry a path: {0}")]
    UnsupportedUrl(String),
}

pub type ForecastResult<T> = Result<T, ForecastError>;

impl From<ForecastError> for UpstreamError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::Format(_) | ForecastError::Timestamp(_) => {
                UpstreamError::Format(err.to_string())
            }
            other => UpstreamError::Unavailable(other.to_string()),
        }
    }
}
