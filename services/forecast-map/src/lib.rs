//! Forecast map service.
//!
//! Renders scattered forecast points as a clipped heat field over boundary
//! maps for two domains. Field data is cached and the next steps are
//! prefetched; render cycles are driven by a view controller and observed
//! through a [`MapStore`].

pub mod client;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod layers;
pub mod metrics;
pub mod orchestrator;
pub mod state;
pub mod sweep;

pub use client::HttpFieldSource;
pub use config::MapConfig;
pub use controller::{ViewController, ViewEvent, ViewHandle};
pub use geometry::{geometry_source, FileGeometrySource, GeometrySource, HttpGeometrySource};
pub use orchestrator::{RenderOrchestrator, RenderOutcome, RenderReport, RenderSettings};
pub use state::{Frame, MapStore, RenderPhase, RenderRequest, RenderStatus, Viewport};
pub use sweep::{run_sweep, SweepPlan, SweepSummary};
