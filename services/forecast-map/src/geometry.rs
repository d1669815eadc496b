//! Boundary geometry sources.
//!
//! Resources are addressed by group and name and laid out as
//! `<base>/<group>/<name>.geojson`, whether served over HTTP or read from a
//! local directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use forecast_common::{BoundaryLayer, ForecastError, ForecastResult};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::client::{request_error, status_error};

/// Loads named boundary layers.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn load(&self, group: &str, name: &str) -> ForecastResult<BoundaryLayer>;
}

/// Geometry served over HTTP.
pub struct HttpGeometrySource {
    client: Client,
    base_url: String,
}

impl HttpGeometrySource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ForecastResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForecastError::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, group: &str, name: &str) -> String {
        format!("{}/{}/{}.geojson", self.base_url, group, name)
    }
}

#[async_trait]
impl GeometrySource for HttpGeometrySource {
    #[instrument(skip(self))]
    async fn load(&self, group: &str, name: &str) -> ForecastResult<BoundaryLayer> {
        let response = self
            .client
            .get(self.url(group, name))
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;
        if !status.is_success() {
            return Err(status_error(status, body.as_bytes()));
        }
        let layer = BoundaryLayer::from_geojson_str(name, &body)?;
        debug!(geometries = layer.geometries.len(), "Loaded boundary layer");
        Ok(layer)
    }
}

/// Geometry read from a local directory.
pub struct FileGeometrySource {
    root: PathBuf,
}

impl FileGeometrySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, group: &str, name: &str) -> PathBuf {
        self.root.join(group).join(format!("{}.geojson", name))
    }
}

#[async_trait]
impl GeometrySource for FileGeometrySource {
    #[instrument(skip(self))]
    async fn load(&self, group: &str, name: &str) -> ForecastResult<BoundaryLayer> {
        let path = self.path(group, name);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ForecastError::Geometry(format!("{}: {}", path.display(), e)))?;
        let layer = BoundaryLayer::from_geojson_str(name, &text)?;
        debug!(path = %path.display(), geometries = layer.geometries.len(), "Loaded boundary layer");
        Ok(layer)
    }
}

/// Pick a source for a base that is either an `http(s)://` URL or a directory.
pub fn geometry_source(base: &str, timeout: Duration) -> ForecastResult<Arc<dyn GeometrySource>> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(Arc::new(HttpGeometrySource::new(base, timeout)?))
    } else {
        Ok(Arc::new(FileGeometrySource::new(base)))
    }
}
