//! Reading source adapters
//!
//! Everything that supplies raw readings or seed samples to the core:
//! the HTTP `/messages` backend, a `sensor_data.json` style seed file and
//! a simulated sensor for running without hardware.

pub mod http;
pub mod seed;
pub mod simulator;

pub use http::*;
pub use seed::*;
pub use simulator::*;

use airgrid_core::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL cannot carry a path: {0}")]
    UnsupportedUrl(String),
}

pub type IngestResult<T> = Result<T, IngestError>;

impl From<IngestError> for UpstreamError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidPayload(_) => UpstreamError::Format(err.to_string()),
            other => UpstreamError::Unavailable(other.to_string()),
        }
    }
}
