//! Tests for cache-first loading and look-ahead prefetch.

use async_trait::async_trait;
use forecast_common::{
    CacheKey, Domain, FieldPayload, ForecastError, ForecastPoint, ForecastResult, Parameter,
    TimeStep,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::{
    load_field, prefetch_ahead, spawn_prefetch, FieldOrigin, FieldSource, ForecastCache,
    PrefetchConfig,
};

// ============================================================================
// Scripted source
// ============================================================================

/// Serves one point per step and records every request. Steps listed in
/// `failing` return a network error.
#[derive(Default)]
struct ScriptedSource {
    failing: HashSet<u8>,
    calls: Mutex<Vec<u8>>,
}

impl ScriptedSource {
    fn failing_at(steps: &[u8]) -> Self {
        Self {
            failing: steps.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<u8> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FieldSource for ScriptedSource {
    async fn fetch_field(&self, key: &CacheKey) -> ForecastResult<FieldPayload> {
        let step = key.time_step.index();
        self.calls.lock().unwrap().push(step);
        if self.failing.contains(&step) {
            return Err(ForecastError::Network(format!("step {} unavailable", step)));
        }
        Ok(FieldPayload {
            points: vec![ForecastPoint::new(0.0, 37.0, step as f64)],
            metadata: None,
        })
    }
}

fn key(step: u8) -> CacheKey {
    CacheKey::new(
        Domain::Kenya,
        Parameter::Precipitation,
        TimeStep::new(step).unwrap(),
    )
}

fn steps(list: &[u8]) -> Vec<TimeStep> {
    list.iter().map(|s| TimeStep::new(*s).unwrap()).collect()
}

// ============================================================================
// Foreground load
// ============================================================================

#[tokio::test]
async fn test_load_fetches_then_serves_from_cache() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::default();

    let (entry, origin) = load_field(&cache, &source, &key(4)).await.unwrap();
    assert_eq!(origin, FieldOrigin::Source);
    assert_eq!(entry[0].value, 4.0);

    let (entry, origin) = load_field(&cache, &source, &key(4)).await.unwrap();
    assert_eq!(origin, FieldOrigin::Cache);
    assert_eq!(entry[0].value, 4.0);
    assert_eq!(source.calls(), vec![4]);
}

#[tokio::test]
async fn test_prefetched_key_skips_network() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::default();

    prefetch_ahead(&cache, &source, &key(0), 3).await;
    assert_eq!(source.calls(), vec![1, 2, 3]);

    let (_, origin) = load_field(&cache, &source, &key(2)).await.unwrap();
    assert_eq!(origin, FieldOrigin::Cache);
    assert_eq!(source.calls(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_failed_load_is_not_cached() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::failing_at(&[6]);

    let err = load_field(&cache, &source, &key(6)).await.unwrap_err();
    assert!(matches!(err, ForecastError::Network(_)));
    assert!(cache.is_empty().await);
}

// ============================================================================
// Look-ahead
// ============================================================================

#[tokio::test]
async fn test_prefetch_from_23_only_attempts_24() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::default();

    let report = prefetch_ahead(&cache, &source, &key(23), 3).await;
    assert_eq!(source.calls(), vec![24]);
    assert_eq!(report.fetched, steps(&[24]));
    assert!(cache.contains(&key(24)).await);
}

#[tokio::test]
async fn test_prefetch_from_last_step_does_nothing() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::default();
    let report = prefetch_ahead(&cache, &source, &key(24), 3).await;
    assert!(source.calls().is_empty());
    assert!(report.attempted().is_empty());
}

#[tokio::test]
async fn test_prefetch_stops_at_first_failure() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::failing_at(&[5]);

    let report = prefetch_ahead(&cache, &source, &key(4), 3).await;
    assert_eq!(source.calls(), vec![5]);
    assert!(report.fetched.is_empty());
    assert_eq!(report.failed.as_ref().map(|(s, _)| *s), Some(TimeStep::new(5).unwrap()));
    assert!(!cache.contains(&key(6)).await);
}

#[tokio::test]
async fn test_prefetch_failure_mid_run_keeps_earlier_steps() {
    let cache = ForecastCache::default();
    let source = ScriptedSource::failing_at(&[3]);

    let report = prefetch_ahead(&cache, &source, &key(1), 3).await;
    assert_eq!(source.calls(), vec![2, 3]);
    assert_eq!(report.attempted(), steps(&[2, 3]));
    assert!(cache.contains(&key(2)).await);
}

#[tokio::test]
async fn test_prefetch_skips_cached_steps() {
    let cache = ForecastCache::default();
    cache.put(key(11), vec![]).await;
    let source = ScriptedSource::default();

    let report = prefetch_ahead(&cache, &source, &key(10), 3).await;
    assert_eq!(source.calls(), vec![12, 13]);
    assert_eq!(report.skipped, steps(&[11]));
}

// ============================================================================
// Background task
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_spawned_prefetch_waits_for_delay() {
    let cache = ForecastCache::default();
    let source = Arc::new(ScriptedSource::default());

    let sizes = Arc::new(Mutex::new(Vec::new()));

    let handle = spawn_prefetch(
        cache.clone(),
        source.clone(),
        key(0),
        PrefetchConfig {
            depth: 2,
            delay_ms: 100,
        },
        {
            let sizes = Arc::clone(&sizes);
            move |len| sizes.lock().unwrap().push(len)
        },
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(source.calls().is_empty());

    let report = handle.await.unwrap();
    assert_eq!(report.fetched, steps(&[1, 2]));
    assert_eq!(cache.len().await, 2);
    assert_eq!(*sizes.lock().unwrap(), vec![1, 2]);
}
