//! HTTP client for the forecast data service.

use std::time::Duration;

use async_trait::async_trait;
use forecast_common::{CacheKey, FieldPayload, ForecastError, ForecastResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use storage::FieldSource;
use tracing::{debug, instrument};

/// Path of the field endpoint under the API base URL.
pub const FIELD_ENDPOINT: &str = "/api/test-grib/";

/// Fetches point sets with `GET {base}/api/test-grib/?domain=..&parameter=..&timestep=..`.
pub struct HttpFieldSource {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpFieldSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ForecastResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ForecastError::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn field_url(&self) -> String {
        format!("{}{}", self.base_url, FIELD_ENDPOINT)
    }
}

#[async_trait]
impl FieldSource for HttpFieldSource {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch_field(&self, key: &CacheKey) -> ForecastResult<FieldPayload> {
        let response = self
            .client
            .get(self.field_url())
            .query(&[
                ("domain", key.domain.slug().to_string()),
                ("parameter", key.parameter.slug().to_string()),
                ("timestep", key.time_step.index().to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let payload = FieldPayload::from_slice(&body)?;
        debug!(points = payload.points.len(), "Field response decoded");
        Ok(payload)
    }
}

/// Classify a transport-level failure.
pub fn request_error(e: reqwest::Error) -> ForecastError {
    if e.is_timeout() {
        ForecastError::Timeout(e.to_string())
    } else {
        ForecastError::Network(e.to_string())
    }
}

/// Error for a non-success response, using the body's `error` member when present.
pub fn status_error(status: StatusCode, body: &[u8]) -> ForecastError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    ForecastError::HttpStatus {
        status: status.as_u16(),
        message,
    }
}
