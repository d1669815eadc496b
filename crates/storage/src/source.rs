//! Source of forecast point sets.

use async_trait::async_trait;
use forecast_common::{CacheKey, FieldPayload, ForecastResult};

/// Fetches the point set for one (domain, parameter, time step).
///
/// Implementations report transport failures, non-success responses and
/// malformed payloads as errors. An empty point set is not an error.
#[async_trait]
pub trait FieldSource: Send + Sync {
    async fn fetch_field(&self, key: &CacheKey) -> ForecastResult<FieldPayload>;
}
