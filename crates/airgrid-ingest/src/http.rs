//! HTTP reading backend (`GET /messages?limit=N`)

use std::time::Duration;

use airgrid_core::{RawReading, ReadingSource, UpstreamResult};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::{IngestError, IngestResult};

pub const DEFAULT_MESSAGE_LIMIT: usize = 1000;

pub struct HttpReadingSource {
    client: Client,
    endpoint: Url,
}

impl HttpReadingSource {
    pub fn new(base_url: &str, limit: usize, timeout: Duration) -> IngestResult<Self> {
        let endpoint = messages_url(base_url, limit)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch(&self) -> IngestResult<Vec<RawReading>> {
        let resp = self.client.get(self.endpoint.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IngestError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        let readings = parse_readings(&bytes)?;
        debug!("Fetched {} readings", readings.len());
        Ok(readings)
    }
}

#[async_trait::async_trait]
impl ReadingSource for HttpReadingSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_readings(&self) -> UpstreamResult<Vec<RawReading>> {
        Ok(self.fetch().await?)
    }
}

/// `{base}/messages?limit={limit}`, tolerating a trailing slash on the base
pub fn messages_url(base_url: &str, limit: usize) -> IngestResult<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|_| IngestError::UnsupportedUrl(base_url.to_string()))?
        .pop_if_empty()
        .push("messages");
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

/// Parse a JSON array of readings. Elements that are not reading objects
/// are dropped; a body that is not an array is an error.
pub fn parse_readings(body: &[u8]) -> IngestResult<Vec<RawReading>> {
    let values: Vec<Value> =
        serde_json::from_slice(body).map_err(|e| IngestError::InvalidPayload(e.to_string()))?;
    let total = values.len();
    let readings: Vec<RawReading> = values
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if readings.len() < total {
        debug!("Dropped {} malformed messages", total - readings.len());
    }
    Ok(readings)
}
