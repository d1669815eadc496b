//! Time-step sweep: drive a [`ViewController`] through a range of steps and
//! hand each finished frame to the caller.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use forecast_common::{CacheKey, TimeStep};
use tracing::{info, warn};

use crate::controller::{ViewController, ViewEvent};
use crate::orchestrator::RenderOrchestrator;
use crate::state::{Frame, Viewport};

/// Steps `first.time_step..=last` for one domain and parameter.
#[derive(Debug, Clone, Copy)]
pub struct SweepPlan {
    pub first: CacheKey,
    pub last: TimeStep,
    pub viewport: Viewport,
    pub debounce: Duration,
}

/// What a sweep produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
    pub frames: usize,
    /// Steps whose cycle ended without a frame.
    pub missing: Vec<TimeStep>,
    pub cached: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Render every step of `plan` in order, calling `on_frame` for each frame.
pub async fn run_sweep<F>(
    orchestrator: Arc<RenderOrchestrator>,
    plan: SweepPlan,
    mut on_frame: F,
) -> Result<SweepSummary>
where
    F: FnMut(TimeStep, &Frame) -> Result<()>,
{
    let from = plan.first.time_step.index();
    let to = plan.last.index();
    if from > to {
        bail!("--from ({}) must not be after --to ({})", from, to);
    }

    let store = Arc::clone(orchestrator.store());
    let mut status = store.subscribe_status();
    let (handle, task) =
        ViewController::new(orchestrator, plan.first, plan.viewport, plan.debounce).spawn();

    let mut summary = SweepSummary::default();
    let mut last_cycle = 0;
    for index in from..=to {
        let step = TimeStep::new(index)?;
        let finished = status
            .wait_for(|s| {
                s.cycle > last_cycle
                    && s.phase.is_terminal()
                    && s.key.map(|k| k.time_step) == Some(step)
            })
            .await
            .context("Controller stopped")?
            .clone();
        last_cycle = finished.cycle;

        match store.latest_frame().filter(|f| f.cycle == finished.cycle) {
            Some(frame) => {
                on_frame(step, frame.as_ref())?;
                summary.frames += 1;
            }
            None => {
                warn!(
                    step = index,
                    error = finished.error.as_deref().unwrap_or("unknown"),
                    "No frame for step"
                );
                summary.missing.push(step);
            }
        }

        if index < to {
            handle.send(ViewEvent::StepForward).await?;
        }
    }

    handle.shutdown().await?;
    task.await?;

    let stats = store.cache().stats();
    summary.cached = store.cache().len().await;
    summary.hits = stats.hits.load(Ordering::Relaxed);
    summary.misses = stats.misses.load(Ordering::Relaxed);
    info!(
        frames = summary.frames,
        missing = summary.missing.len(),
        cached = summary.cached,
        hits = summary.hits,
        misses = summary.misses,
        "Sweep finished"
    );
    Ok(summary)
}
