//! In-memory field and geometry sources for service tests.

#![allow(dead_code)]

use async_trait::async_trait;
use forecast_common::{
    BoundaryLayer, Bounds, CacheKey, Domain, FieldPayload, ForecastError, ForecastResult,
    Parameter, TimeStep,
};
use forecast_map::{
    GeometrySource, MapStore, RenderOrchestrator, RenderRequest, RenderSettings, Viewport,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::{FieldSource, ForecastCache};
use test_utils::{rainfall_points, rect_layer, EAST_AFRICA_TERRITORIES};

pub const KENYA_BOUNDS: Bounds = Bounds {
    min_lon: 33.0,
    max_lon: 44.0,
    min_lat: -5.2,
    max_lat: 5.5,
};

// ============================================================================
// Field source
// ============================================================================

/// Serves a rainfall lattice for every key and records each request.
#[derive(Default)]
pub struct ScriptedFields {
    pub failing: HashSet<u8>,
    pub empty: bool,
    pub delay: Option<Duration>,
    calls: Mutex<Vec<CacheKey>>,
}

impl ScriptedFields {
    pub fn failing_at(steps: &[u8]) -> Self {
        Self {
            failing: steps.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Self::default()
        }
    }

    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CacheKey> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, key: &CacheKey) -> usize {
        self.calls().iter().filter(|k| *k == key).count()
    }
}

#[async_trait]
impl FieldSource for ScriptedFields {
    async fn fetch_field(&self, key: &CacheKey) -> ForecastResult<FieldPayload> {
        self.calls.lock().unwrap().push(*key);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let step = key.time_step.index();
        if self.failing.contains(&step) {
            return Err(ForecastError::Network(format!("step {} unavailable", step)));
        }
        let points = if self.empty {
            Vec::new()
        } else {
            rainfall_points(&KENYA_BOUNDS, 12, 12)
        };
        Ok(FieldPayload {
            points,
            metadata: None,
        })
    }
}

// ============================================================================
// Geometry source
// ============================================================================

/// Boundary layers keyed by `group/name`; anything else is a 404.
#[derive(Default)]
pub struct MemoryGeometry {
    layers: HashMap<String, BoundaryLayer>,
}

impl MemoryGeometry {
    pub fn with(mut self, group: &str, layer: BoundaryLayer) -> Self {
        self.layers.insert(format!("{}/{}", group, layer.name), layer);
        self
    }

    /// Ocean, lakes, counties and the national boundary.
    pub fn kenya() -> Self {
        Self::default()
            .with("kenya", rect_layer("kenya_ocean", 41.5, -5.2, 44.0, -1.5))
            .with("kenya", rect_layer("kenya_lakes", 33.6, -1.0, 34.4, 0.4))
            .with("kenya", rect_layer("kenya_counties", 36.0, -2.0, 38.0, 0.0))
            .with("kenya", rect_layer("kenya_boundary", 34.0, -4.7, 41.9, 4.6))
    }

    /// Kenya plus every territory, laid out side by side.
    pub fn east_africa() -> Self {
        EAST_AFRICA_TERRITORIES
            .iter()
            .enumerate()
            .fold(
                Self::default().with("kenya", rect_layer("kenya_boundary", 34.0, -4.7, 41.9, 4.6)),
                |geo, (i, name)| {
                    let west = 22.0 + i as f64 * 3.0;
                    geo.with("east_africa", rect_layer(name, west, -12.0, west + 2.5, 15.0))
                },
            )
    }
}

#[async_trait]
impl GeometrySource for MemoryGeometry {
    async fn load(&self, group: &str, name: &str) -> ForecastResult<BoundaryLayer> {
        self.layers
            .get(&format!("{}/{}", group, name))
            .cloned()
            .ok_or_else(|| ForecastError::HttpStatus {
                status: 404,
                message: format!("{}/{}.geojson not found", group, name),
            })
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn key(domain: Domain, step: u8) -> CacheKey {
    CacheKey::new(domain, Parameter::Precipitation, TimeStep::new(step).unwrap())
}

pub fn request(domain: Domain, step: u8) -> RenderRequest {
    RenderRequest {
        key: key(domain, step),
        viewport: Viewport::new(220, 214),
    }
}

pub fn orchestrator(
    fields: Arc<ScriptedFields>,
    geometry: MemoryGeometry,
) -> Arc<RenderOrchestrator> {
    let store = Arc::new(MapStore::new(ForecastCache::default()));
    Arc::new(RenderOrchestrator::new(
        store,
        fields,
        Arc::new(geometry),
        RenderSettings::default(),
    ))
}
