//! Cache-first loading and look-ahead prefetch.
//!
//! After the point set for step T is loaded, the next few steps are fetched
//! in the background so stepping forward is instant. Prefetch never retries:
//! the first failure ends the run, on the assumption that later steps will
//! fail the same way.

use forecast_common::{CacheKey, ForecastError, ForecastResult, TimeStep};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::forecast_cache::{CacheEntry, ForecastCache};
use crate::source::FieldSource;

/// Look-ahead settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Number of steps after the current one to fetch.
    pub depth: u8,
    /// Wait before starting, so the foreground render goes first.
    pub delay_ms: u64,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            delay_ms: 100,
        }
    }
}

impl PrefetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Where a loaded point set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    Cache,
    Source,
}

/// Outcome of one prefetch run.
#[derive(Debug, Clone, Default)]
pub struct PrefetchReport {
    /// Steps fetched and cached.
    pub fetched: Vec<TimeStep>,
    /// Steps that were already cached.
    pub skipped: Vec<TimeStep>,
    /// The step that failed, ending the run.
    pub failed: Option<(TimeStep, ForecastError)>,
}

impl PrefetchReport {
    /// Every step a fetch was attempted for, in order.
    pub fn attempted(&self) -> Vec<TimeStep> {
        let mut steps = self.fetched.clone();
        if let Some((step, _)) = &self.failed {
            steps.push(*step);
        }
        steps
    }
}

/// Steps after `base` to prefetch, stopping at the end of the horizon.
pub fn prefetch_steps(base: TimeStep, depth: u8) -> Vec<TimeStep> {
    (1..=depth).filter_map(|offset| base.checked_add(offset)).collect()
}

/// Return the cached point set for `key`, fetching and caching it on a miss.
///
/// A cached key never reaches the source.
pub async fn load_field(
    cache: &ForecastCache,
    source: &dyn FieldSource,
    key: &CacheKey,
) -> ForecastResult<(CacheEntry, FieldOrigin)> {
    if let Some(entry) = cache.get(key).await {
        debug!(key = %key, points = entry.len(), "Point set served from cache");
        return Ok((entry, FieldOrigin::Cache));
    }

    let payload = source.fetch_field(key).await?;
    debug!(
        key = %key,
        points = payload.points.len(),
        total_points = payload.total_points(),
        "Fetched point set"
    );
    let entry = cache.put(*key, payload.points).await;
    Ok((entry, FieldOrigin::Source))
}

/// Fetch the steps after `base` that are not cached yet, in order.
pub async fn prefetch_ahead(
    cache: &ForecastCache,
    source: &dyn FieldSource,
    base: &CacheKey,
    depth: u8,
) -> PrefetchReport {
    prefetch_ahead_with(cache, source, base, depth, |_| {}).await
}

/// [`prefetch_ahead`], calling `on_insert` with the cache size after each
/// fetched step is stored.
pub async fn prefetch_ahead_with<F>(
    cache: &ForecastCache,
    source: &dyn FieldSource,
    base: &CacheKey,
    depth: u8,
    mut on_insert: F,
) -> PrefetchReport
where
    F: FnMut(usize),
{
    let mut report = PrefetchReport::default();

    for step in prefetch_steps(base.time_step, depth) {
        let key = base.with_step(step);
        if cache.contains(&key).await {
            report.skipped.push(step);
            counter!("forecast_prefetch_total", "outcome" => "cached").increment(1);
            continue;
        }

        match source.fetch_field(&key).await {
            Ok(payload) => {
                cache.put(key, payload.points).await;
                on_insert(cache.entry_count());
                report.fetched.push(step);
                counter!("forecast_prefetch_total", "outcome" => "fetched").increment(1);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Prefetch failed, stopping look-ahead");
                counter!("forecast_prefetch_total", "outcome" => "failed").increment(1);
                report.failed = Some((step, e));
                break;
            }
        }
    }

    info!(
        base = %base,
        fetched = report.fetched.len(),
        skipped = report.skipped.len(),
        failed = report.failed.is_some(),
        "Prefetch finished"
    );
    report
}

/// Run [`prefetch_ahead_with`] on a background task after the configured delay.
pub fn spawn_prefetch<F>(
    cache: ForecastCache,
    source: Arc<dyn FieldSource>,
    base: CacheKey,
    config: PrefetchConfig,
    on_insert: F,
) -> JoinHandle<PrefetchReport>
where
    F: FnMut(usize) + Send + 'static,
{
    tokio::spawn(async move {
        if config.delay_ms > 0 {
            tokio::time::sleep(config.delay()).await;
        }
        prefetch_ahead_with(&cache, source.as_ref(), &base, config.depth, on_insert).await
    })
}
