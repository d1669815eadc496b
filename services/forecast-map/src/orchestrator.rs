//! Render orchestrator.
//!
//! One call to [`RenderOrchestrator::render`] is one render cycle:
//!
//! ```text
//! Idle -> ResolvingBounds -> LoadingBaseLayers -> Compositing -> DrawingOverlays -> Done
//! ```
//!
//! Every await is followed by a cancellation check. A cancelled cycle stops
//! without publishing anything, so observers only ever see whole frames.
//! Failures end the cycle in `Error` with a status message; the cycle always
//! reaches a terminal phase.

use std::sync::Arc;
use std::time::Instant;

use forecast_common::{BoundaryLayer, ForecastError, ForecastResult};
use projection::{resolve_bounds, PixelProjection};
use renderer::{
    composite_heat_field, draw_coordinate_labels, draw_layer, Canvas, ClipRegion,
    HeatFieldConfig, LabelConfig,
};
use storage::{load_field, spawn_prefetch, FieldOrigin, FieldSource, PrefetchConfig, PrefetchReport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::MapConfig;
use crate::geometry::GeometrySource;
use crate::layers::{layers_for, LayerRole, LayerSpec, BACKGROUND};
use crate::metrics::{record_cycle, record_layer_failure, CycleOutcome};
use crate::state::{Frame, MapStore, RenderPhase, RenderRequest};

const NO_TERRITORIES: &str =
    "No countries loaded successfully. Check file paths and console for details.";

/// Drawing and look-ahead settings for every cycle.
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub heat_field: HeatFieldConfig,
    pub labels: LabelConfig,
    pub prefetch: PrefetchConfig,
}

impl From<&MapConfig> for RenderSettings {
    fn from(config: &MapConfig) -> Self {
        Self {
            heat_field: config.heat_field.clone(),
            labels: config.labels.clone(),
            prefetch: config.prefetch.clone(),
        }
    }
}

/// How a cycle ended.
#[derive(Debug)]
pub enum RenderOutcome {
    /// A frame was published. `field_error` is set when the map was drawn
    /// without forecast data.
    Done {
        frame: Arc<Frame>,
        field_error: Option<ForecastError>,
    },
    Failed(ForecastError),
    Cancelled,
}

impl RenderOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, RenderOutcome::Done { .. })
    }

    pub fn frame(&self) -> Option<&Arc<Frame>> {
        match self {
            RenderOutcome::Done { frame, .. } => Some(frame),
            _ => None,
        }
    }
}

/// Result of one cycle.
#[derive(Debug)]
pub struct RenderReport {
    pub cycle: u64,
    pub outcome: RenderOutcome,
    /// Look-ahead started after the field was fetched from the source.
    pub prefetch: Option<JoinHandle<PrefetchReport>>,
}

/// Boundary layers that loaded, with their catalogue entries.
#[derive(Default)]
struct LoadedLayers {
    specs: Vec<LayerSpec>,
    layers: Vec<BoundaryLayer>,
}

impl LoadedLayers {
    fn push(&mut self, spec: LayerSpec, layer: BoundaryLayer) {
        self.specs.push(spec);
        self.layers.push(layer);
    }

    fn len(&self) -> usize {
        self.layers.len()
    }

    fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&LayerSpec, &BoundaryLayer)> {
        self.specs.iter().zip(&self.layers)
    }
}

/// Drives render cycles against a shared [`MapStore`].
pub struct RenderOrchestrator {
    store: Arc<MapStore>,
    fields: Arc<dyn FieldSource>,
    geometry: Arc<dyn GeometrySource>,
    settings: RenderSettings,
}

impl RenderOrchestrator {
    pub fn new(
        store: Arc<MapStore>,
        fields: Arc<dyn FieldSource>,
        geometry: Arc<dyn GeometrySource>,
        settings: RenderSettings,
    ) -> Self {
        Self {
            store,
            fields,
            geometry,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<MapStore> {
        &self.store
    }

    /// Start a new cycle and run it to a terminal phase.
    pub async fn render(&self, request: RenderRequest, cancel: CancellationToken) -> RenderReport {
        let cycle = self.store.begin_cycle(request.key);
        self.render_cycle(cycle, request, cancel).await
    }

    /// Run a cycle already registered with [`MapStore::begin_cycle`].
    #[instrument(skip(self, cancel), fields(key = %request.key, viewport = %request.viewport))]
    pub async fn render_cycle(
        &self,
        cycle: u64,
        request: RenderRequest,
        cancel: CancellationToken,
    ) -> RenderReport {
        let started = Instant::now();
        let mut prefetch = None;

        let outcome = match self.run(cycle, request, &cancel, &mut prefetch).await {
            Ok(outcome) => outcome,
            Err(ForecastError::Cancelled) => RenderOutcome::Cancelled,
            Err(e) => RenderOutcome::Failed(e),
        };

        let metric = match &outcome {
            RenderOutcome::Done { field_error, .. } => {
                self.store.update_status(cycle, |s| {
                    s.phase = RenderPhase::Done;
                    s.loading = false;
                    if let Some(e) = field_error {
                        s.error = Some(e.user_message());
                    }
                });
                info!(
                    cycle,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    field_error = field_error.is_some(),
                    "Render cycle done"
                );
                CycleOutcome::Done
            }
            RenderOutcome::Failed(e) => {
                warn!(cycle, error = %e, "Render cycle failed");
                self.store.update_status(cycle, |s| {
                    s.phase = RenderPhase::Error;
                    s.loading = false;
                    s.error = Some(status_error(e));
                });
                CycleOutcome::Error
            }
            RenderOutcome::Cancelled => {
                debug!(cycle, "Render cycle cancelled");
                self.store.update_status(cycle, |s| {
                    s.phase = RenderPhase::Cancelled;
                    s.loading = false;
                });
                CycleOutcome::Cancelled
            }
        };
        self.store.refresh_cache_size();
        record_cycle(metric, started, self.store.cache().entry_count());

        RenderReport {
            cycle,
            outcome,
            prefetch,
        }
    }

    async fn run(
        &self,
        cycle: u64,
        request: RenderRequest,
        cancel: &CancellationToken,
        prefetch: &mut Option<JoinHandle<PrefetchReport>>,
    ) -> ForecastResult<RenderOutcome> {
        let key = request.key;
        let domain = key.domain;
        let viewport = request.viewport;

        let mut canvas = Canvas::new(viewport.width, viewport.height)?;
        canvas.clear(BACKGROUND);

        self.phase(cycle, RenderPhase::ResolvingBounds, "Loading map...");
        let catalogue = layers_for(domain);

        let (projection, loaded) = match domain.fixed_bounds() {
            Some(bounds) => {
                let projection = PixelProjection::new(bounds, viewport.width, viewport.height)?;
                self.phase(cycle, RenderPhase::LoadingBaseLayers, "Loading Kenya map...");
                let loaded = self
                    .load_and_draw(&catalogue, &mut canvas, &projection, cancel)
                    .await?;
                self.message(cycle, "Kenya map loaded");
                (projection, loaded)
            }
            None => {
                let loaded = self.load_territories(cycle, &catalogue, cancel).await?;
                let bounds = resolve_bounds(domain, &loaded.layers)?;
                let projection = PixelProjection::new(bounds, viewport.width, viewport.height)?;

                self.phase(
                    cycle,
                    RenderPhase::LoadingBaseLayers,
                    &format!("Loaded {}/{} countries. Drawing...", loaded.len(), catalogue.len()),
                );
                canvas.clear(BACKGROUND);
                for (spec, layer) in loaded.iter() {
                    if let Some(style) = &spec.base_style {
                        draw_layer(&mut canvas, &projection, layer, style);
                    }
                }
                self.message(
                    cycle,
                    &format!("East Africa map loaded ({} countries)", loaded.len()),
                );
                (projection, loaded)
            }
        };

        // === Field ===
        self.store
            .update_status(cycle, |s| s.phase = RenderPhase::Compositing);
        let field = load_field(self.store.cache(), self.fields.as_ref(), &key).await;
        ensure_active(cancel)?;

        let mut point_count = 0;
        let field_error = match field {
            Ok((points, origin)) => {
                if origin == FieldOrigin::Source {
                    let store = Arc::clone(&self.store);
                    *prefetch = Some(spawn_prefetch(
                        self.store.cache().clone(),
                        Arc::clone(&self.fields),
                        key,
                        self.settings.prefetch.clone(),
                        move |_| store.refresh_cache_size(),
                    ));
                }

                point_count = points.len();
                let clip = ClipRegion::from_layers(
                    loaded
                        .iter()
                        .filter(|(spec, _)| spec.role == LayerRole::Clip)
                        .map(|(_, layer)| layer),
                    &projection,
                );
                // The field is only ever drawn inside a boundary.
                if let Some(clip) = &clip {
                    let summary = composite_heat_field(
                        &mut canvas,
                        &projection,
                        &points,
                        key.parameter,
                        &self.settings.heat_field,
                        Some(clip),
                    )?;
                    debug!(
                        drawn = summary.points_drawn,
                        skipped = summary.points_skipped,
                        origin = ?origin,
                        "Field composited"
                    );
                } else {
                    warn!(domain = %domain, "No clip boundary available, field not drawn");
                }
                self.store.update_status(cycle, |s| {
                    s.point_count = point_count;
                    s.no_data = point_count == 0;
                });
                self.store.refresh_cache_size();
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Field unavailable, drawing map without data");
                Some(e)
            }
        };

        // === Overlays ===
        self.store
            .update_status(cycle, |s| s.phase = RenderPhase::DrawingOverlays);
        for (spec, layer) in loaded.iter() {
            if let Some(style) = &spec.overlay_style {
                draw_layer(&mut canvas, &projection, layer, style);
            }
        }
        draw_coordinate_labels(&mut canvas, &projection, &self.settings.labels);

        let frame = Frame {
            cycle,
            request,
            bounds: *projection.bounds(),
            point_count,
            canvas,
        };
        match self.store.publish_frame(frame) {
            Some(frame) => Ok(RenderOutcome::Done { frame, field_error }),
            // Superseded while drawing.
            None => Ok(RenderOutcome::Cancelled),
        }
    }

    /// Fetch each layer in order, drawing it as soon as it arrives.
    ///
    /// Missing layers are logged and skipped.
    async fn load_and_draw(
        &self,
        catalogue: &[LayerSpec],
        canvas: &mut Canvas,
        projection: &PixelProjection,
        cancel: &CancellationToken,
    ) -> ForecastResult<LoadedLayers> {
        let mut loaded = LoadedLayers::default();
        for spec in catalogue {
            let result = self.geometry.load(spec.group, spec.name).await;
            ensure_active(cancel)?;
            match result {
                Ok(layer) => {
                    if let Some(style) = &spec.base_style {
                        draw_layer(canvas, projection, &layer, style);
                    }
                    loaded.push(*spec, layer);
                }
                Err(e) => {
                    warn!(layer = spec.name, error = %e, "Boundary layer unavailable");
                    record_layer_failure(spec.name);
                }
            }
        }
        Ok(loaded)
    }

    /// Fetch every territory before anything is drawn; the bounds depend on all of them.
    async fn load_territories(
        &self,
        cycle: u64,
        catalogue: &[LayerSpec],
        cancel: &CancellationToken,
    ) -> ForecastResult<LoadedLayers> {
        self.message(cycle, "Loading East Africa countries...");
        let total = catalogue.len();
        let mut loaded = LoadedLayers::default();

        for spec in catalogue {
            let result = self.geometry.load(spec.group, spec.name).await;
            ensure_active(cancel)?;
            match result {
                Ok(layer) => {
                    loaded.push(*spec, layer);
                    self.message(
                        cycle,
                        &format!("Loading {}... ({}/{})", spec.name, loaded.len(), total),
                    );
                }
                Err(e) => {
                    warn!(layer = spec.name, error = %e, "Territory unavailable");
                    record_layer_failure(spec.name);
                }
            }
        }

        if loaded.is_empty() {
            return Err(ForecastError::Geometry(NO_TERRITORIES.to_string()));
        }
        Ok(loaded)
    }

    fn phase(&self, cycle: u64, phase: RenderPhase, message: &str) {
        self.store.update_status(cycle, |s| {
            s.phase = phase;
            s.message = message.to_string();
        });
    }

    fn message(&self, cycle: u64, message: &str) {
        self.store
            .update_status(cycle, |s| s.message = message.to_string());
    }
}

fn ensure_active(cancel: &CancellationToken) -> ForecastResult<()> {
    if cancel.is_cancelled() {
        Err(ForecastError::Cancelled)
    } else {
        Ok(())
    }
}

/// Status text for a failed cycle.
fn status_error(e: &ForecastError) -> String {
    match e {
        ForecastError::Geometry(message) if message == NO_TERRITORIES => message.clone(),
        ForecastError::BoundsResolution(_) => "Failed to compute valid bounds".to_string(),
        other => other.user_message(),
    }
}
