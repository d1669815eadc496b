//! Render cycle metrics.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// How a render cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Done,
    Error,
    Cancelled,
}

impl CycleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleOutcome::Done => "done",
            CycleOutcome::Error => "error",
            CycleOutcome::Cancelled => "cancelled",
        }
    }
}

/// Record the end of a cycle started at `started`.
pub fn record_cycle(outcome: CycleOutcome, started: Instant, cache_size: usize) {
    counter!("render_cycles_total", "outcome" => outcome.as_str()).increment(1);
    if outcome == CycleOutcome::Done {
        histogram!("render_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);
    }
    gauge!("forecast_cache_entries").set(cache_size as f64);
}

/// Record a boundary layer that could not be loaded.
pub fn record_layer_failure(name: &str) {
    counter!("boundary_layer_failures_total", "layer" => name.to_string()).increment(1);
}
