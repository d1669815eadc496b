//! View controller: turns selection changes and resizes into render cycles.
//!
//! Each new cycle cancels the one before it. Resizes are debounced so a
//! burst of them produces a single redraw once the viewport stops changing.

use std::sync::Arc;
use std::time::Duration;

use forecast_common::{CacheKey, Domain, Parameter, TimeStep};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::orchestrator::{RenderOrchestrator, RenderReport};
use crate::state::{RenderRequest, Viewport};

/// Input from the chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    SelectDomain(Domain),
    SelectParameter(Parameter),
    SetStep(TimeStep),
    /// Next step, wrapping from the last step back to the first.
    StepForward,
    /// Previous step, stopping at the first.
    StepBack,
    Resize(Viewport),
    Shutdown,
}

/// Sending half of a running controller.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    events: mpsc::Sender<ViewEvent>,
}

impl ViewHandle {
    pub async fn send(&self, event: ViewEvent) -> Result<(), SendError<ViewEvent>> {
        self.events.send(event).await
    }

    pub async fn shutdown(&self) -> Result<(), SendError<ViewEvent>> {
        self.send(ViewEvent::Shutdown).await
    }
}

struct InFlight {
    cancel: CancellationToken,
    task: JoinHandle<RenderReport>,
}

/// Owns the current selection and viewport.
pub struct ViewController {
    orchestrator: Arc<RenderOrchestrator>,
    key: CacheKey,
    viewport: Viewport,
    debounce: Duration,
    in_flight: Option<InFlight>,
}

impl ViewController {
    pub fn new(
        orchestrator: Arc<RenderOrchestrator>,
        key: CacheKey,
        viewport: Viewport,
        debounce: Duration,
    ) -> Self {
        Self {
            orchestrator,
            key,
            viewport,
            debounce,
            in_flight: None,
        }
    }

    /// Run the controller on a background task.
    pub fn spawn(self) -> (ViewHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let task = tokio::spawn(self.run(rx));
        (ViewHandle { events: tx }, task)
    }

    /// Render the initial selection, then react to events until shutdown
    /// or until every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<ViewEvent>) {
        self.start_render();
        let mut pending_resize: Option<(Viewport, Instant)> = None;

        loop {
            let deadline = pending_resize.map(|(_, at)| at);
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        ViewEvent::Shutdown => break,
                        ViewEvent::Resize(viewport) => {
                            pending_resize = Some((viewport, Instant::now() + self.debounce));
                        }
                        other => {
                            if self.apply(other) {
                                self.start_render();
                            }
                        }
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((viewport, _)) = pending_resize.take() {
                        if viewport != self.viewport && !viewport.is_empty() {
                            debug!(from = %self.viewport, to = %viewport, "Viewport resized");
                            self.viewport = viewport;
                            self.start_render();
                        }
                    }
                }
            }
        }

        self.finish().await;
    }

    /// Apply a selection event. Returns whether the selection changed.
    fn apply(&mut self, event: ViewEvent) -> bool {
        let before = self.key;
        match event {
            ViewEvent::SelectDomain(domain) => self.key.domain = domain,
            ViewEvent::SelectParameter(parameter) => self.key.parameter = parameter,
            ViewEvent::SetStep(step) => self.key.time_step = step,
            ViewEvent::StepForward => self.key.time_step = self.key.time_step.next(),
            ViewEvent::StepBack => self.key.time_step = self.key.time_step.prev(),
            ViewEvent::Resize(_) | ViewEvent::Shutdown => {}
        }
        self.key != before
    }

    fn start_render(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel.cancel();
        }

        let request = RenderRequest {
            key: self.key,
            viewport: self.viewport,
        };
        // Numbered here so cycles order by request, not by task scheduling.
        let cycle = self.orchestrator.store().begin_cycle(request.key);
        let cancel = CancellationToken::new();
        let orchestrator = Arc::clone(&self.orchestrator);
        let token = cancel.clone();
        let task =
            tokio::spawn(async move { orchestrator.render_cycle(cycle, request, token).await });

        info!(cycle, key = %request.key, viewport = %request.viewport, "Render requested");
        self.in_flight = Some(InFlight { cancel, task });
    }

    /// Let the last cycle finish before returning.
    async fn finish(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            if let Err(e) = in_flight.task.await {
                debug!(error = %e, "Render task ended abnormally");
            }
        }
    }
}

