//! Service configuration.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, an optional YAML file, then environment variables.
//!
//! | env                        | field                  |
//! |----------------------------|------------------------|
//! | `FORECAST_API_URL`         | `api_base_url`         |
//! | `FORECAST_GEO_BASE`        | `geo_base`             |
//! | `FORECAST_REQUEST_TIMEOUT` | `request_timeout_secs` |
//! | `FORECAST_CACHE_CAPACITY`  | `cache_capacity`       |

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use renderer::{HeatFieldConfig, LabelConfig};
use serde::Deserialize;
use storage::{PrefetchConfig, DEFAULT_CAPACITY};
use tracing::debug;

use crate::state::Viewport;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Base URL of the forecast data service.
    pub api_base_url: String,
    /// Geometry root: a directory or an `http(s)://` URL.
    pub geo_base: String,
    pub request_timeout_secs: u64,
    pub cache_capacity: usize,
    pub prefetch: PrefetchConfig,
    pub resize_debounce_ms: u64,
    pub heat_field: HeatFieldConfig,
    pub labels: LabelConfig,
    pub viewport: Viewport,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            geo_base: "./public/geo".to_string(),
            request_timeout_secs: 30,
            cache_capacity: DEFAULT_CAPACITY,
            prefetch: PrefetchConfig::default(),
            resize_debounce_ms: 100,
            heat_field: HeatFieldConfig::default(),
            labels: LabelConfig::default(),
            viewport: Viewport::default(),
        }
    }
}

impl MapConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded map config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FORECAST_API_URL") {
            self.api_base_url = url;
        }
        if let Some(base) = lookup("FORECAST_GEO_BASE") {
            self.geo_base = base;
        }
        if let Some(secs) = lookup("FORECAST_REQUEST_TIMEOUT") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("FORECAST_REQUEST_TIMEOUT is not a number: {}", secs))?;
        }
        if let Some(capacity) = lookup("FORECAST_CACHE_CAPACITY") {
            self.cache_capacity = capacity
                .trim()
                .parse()
                .with_context(|| format!("FORECAST_CACHE_CAPACITY is not a number: {}", capacity))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        if self.cache_capacity == 0 {
            bail!("cache_capacity must be at least 1");
        }
        if self.viewport.is_empty() {
            bail!("viewport must not be empty (got {})", self.viewport);
        }
        self.heat_field.validate()?;
        self.labels.validate()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}
