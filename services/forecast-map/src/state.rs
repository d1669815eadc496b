//! Shared view state: the forecast cache, render status and the latest frame.
//!
//! Everything a caller observes goes through [`MapStore`]. Render cycles
//! are numbered; only the newest cycle may change the status or publish a
//! frame, so a cycle that was superseded can never overwrite newer output.

use forecast_common::{Bounds, CacheKey};
use renderer::Canvas;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storage::ForecastCache;
use tokio::sync::watch;

/// Pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(768, 650)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Everything that determines a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderRequest {
    pub key: CacheKey,
    pub viewport: Viewport,
}

/// Stage of a render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPhase {
    #[default]
    Idle,
    ResolvingBounds,
    LoadingBaseLayers,
    Compositing,
    DrawingOverlays,
    Done,
    Error,
    Cancelled,
}

impl RenderPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RenderPhase::Done | RenderPhase::Error | RenderPhase::Cancelled
        )
    }
}

/// Observable status of the current render cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderStatus {
    pub cycle: u64,
    pub key: Option<CacheKey>,
    pub phase: RenderPhase,
    pub loading: bool,
    pub message: String,
    pub error: Option<String>,
    pub point_count: usize,
    pub cache_size: usize,
    /// The field loaded but holds no points.
    pub no_data: bool,
}

/// A finished frame.
pub struct Frame {
    pub cycle: u64,
    pub request: RenderRequest,
    pub bounds: Bounds,
    pub point_count: usize,
    pub canvas: Canvas,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("cycle", &self.cycle)
            .field("request", &self.request)
            .field("bounds", &self.bounds)
            .field("point_count", &self.point_count)
            .finish_non_exhaustive()
    }
}

/// Explicit store shared by the orchestrator, the controller and observers.
pub struct MapStore {
    cache: ForecastCache,
    status: watch::Sender<RenderStatus>,
    frame: watch::Sender<Option<Arc<Frame>>>,
    current_cycle: AtomicU64,
    frames_published: AtomicU64,
}

impl MapStore {
    pub fn new(cache: ForecastCache) -> Self {
        let (status, _) = watch::channel(RenderStatus::default());
        let (frame, _) = watch::channel(None);
        Self {
            cache,
            status,
            frame,
            current_cycle: AtomicU64::new(0),
            frames_published: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    /// Start a new cycle, superseding any cycle in flight.
    pub fn begin_cycle(&self, key: CacheKey) -> u64 {
        let cycle = self.current_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.send_modify(|status| {
            *status = RenderStatus {
                cycle,
                key: Some(key),
                phase: RenderPhase::Idle,
                loading: true,
                cache_size: status.cache_size,
                ..RenderStatus::default()
            };
        });
        cycle
    }

    pub fn current_cycle(&self) -> u64 {
        self.current_cycle.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, cycle: u64) -> bool {
        self.current_cycle() == cycle
    }

    /// Apply `f` to the status if `cycle` is still the newest. Returns whether it was applied.
    pub fn update_status<F>(&self, cycle: u64, f: F) -> bool
    where
        F: FnOnce(&mut RenderStatus),
    {
        self.status.send_if_modified(|status| {
            if status.cycle != cycle || !self.is_current(cycle) {
                return false;
            }
            f(status);
            true
        })
    }

    /// Copy the cache's entry count into the status.
    ///
    /// The cache outlives cycles, so this applies whichever cycle is current.
    pub fn refresh_cache_size(&self) {
        self.status.send_if_modified(|status| {
            let size = self.cache.entry_count();
            if status.cache_size == size {
                return false;
            }
            status.cache_size = size;
            true
        });
    }

    /// Publish a frame if its cycle is still the newest.
    pub fn publish_frame(&self, frame: Frame) -> Option<Arc<Frame>> {
        let frame = Arc::new(frame);
        let published = self.frame.send_if_modified(|slot| {
            if !self.is_current(frame.cycle) {
                return false;
            }
            *slot = Some(Arc::clone(&frame));
            true
        });
        if published {
            self.frames_published.fetch_add(1, Ordering::SeqCst);
            Some(frame)
        } else {
            None
        }
    }

    pub fn status(&self) -> RenderStatus {
        self.status.borrow().clone()
    }

    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.frame.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RenderStatus> {
        self.status.subscribe()
    }

    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frame.subscribe()
    }

    /// Number of frames published since the store was created.
    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::SeqCst)
    }
}
