use std::time::Duration;

use airgrid_core::{Forecaster, Prediction, UpstreamResult, Window};
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use crate::wire::{error_message, parse_predictions, PredictRequest};
use crate::{ForecastError, ForecastResult};

/// Posts assembled windows to `{base}/predict`
pub struct HttpForecaster {
    client: Client,
    endpoint: Url,
}

impl HttpForecaster {
    pub fn new(base_url: &str, timeout: Duration) -> ForecastResult<Self> {
        let endpoint = predict_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(skip(self, window), fields(points = window.len(), origin = ?window.origin()))]
    pub async fn predict(&self, window: &Window) -> ForecastResult<Vec<Prediction>> {
        let request = PredictRequest::from_window(window)?;
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ForecastError::Rejected {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let body = resp.bytes().await?;
        debug!("Forecaster replied with {} bytes", body.len());
        let predictions = parse_predictions(&body)?;
        info!("Received {} predictions", predictions.len());
        Ok(predictions)
    }
}

#[async_trait::async_trait]
impl Forecaster for HttpForecaster {
    async fn forecast(&self, window: &Window) -> UpstreamResult<Vec<Prediction>> {
        Ok(self.predict(window).await?)
    }
}

pub fn predict_url(base_url: &str) -> ForecastResult<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|_| ForecastError::UnsupportedUrl(base_url.to_string()))?
        .pop_if_empty()
        .push("predict");
    Ok(url)
}
