//! Tests for the forecast cache.

use forecast_common::{CacheKey, Domain, ForecastPoint, Parameter, TimeStep};
use std::sync::atomic::Ordering;
use storage::{ForecastCache, DEFAULT_CAPACITY};
use test_utils::rainfall_points;

fn key(domain: Domain, parameter: Parameter, step: u8) -> CacheKey {
    CacheKey::new(domain, parameter, TimeStep::new(step).unwrap())
}

/// 50 distinct keys followed by more, spread over domains and parameters.
fn distinct_keys(n: usize) -> Vec<CacheKey> {
    let mut keys = Vec::new();
    'outer: for domain in Domain::ALL {
        for parameter in Parameter::ALL {
            for step in TimeStep::all() {
                if keys.len() == n {
                    break 'outer;
                }
                keys.push(CacheKey::new(domain, parameter, step));
            }
        }
    }
    keys
}

// ============================================================================
// Round trip
// ============================================================================

#[tokio::test]
async fn test_put_then_get_returns_exact_points() {
    let cache = ForecastCache::default();
    let bounds = Domain::Kenya.fixed_bounds().unwrap();
    let points = rainfall_points(&bounds, 5, 4);
    let k = key(Domain::Kenya, Parameter::Precipitation, 3);

    cache.put(k, points.clone()).await;
    let entry = cache.get(&k).await.unwrap();
    assert_eq!(entry.as_slice(), points.as_slice());
}

#[tokio::test]
async fn test_keys_are_independent() {
    let cache = ForecastCache::default();
    let rain = key(Domain::Kenya, Parameter::Precipitation, 1);
    let tmax = key(Domain::Kenya, Parameter::TemperatureMax, 1);
    let other_domain = key(Domain::EastAfrica, Parameter::Precipitation, 1);

    cache.put(rain, vec![ForecastPoint::new(0.0, 0.0, 1.0)]).await;
    assert!(cache.get(&tmax).await.is_none());
    assert!(cache.get(&other_domain).await.is_none());
}

#[tokio::test]
async fn test_empty_point_set_is_cached() {
    let cache = ForecastCache::default();
    let k = key(Domain::EastAfrica, Parameter::RelativeHumidity, 0);
    cache.put(k, vec![]).await;
    assert!(cache.get(&k).await.unwrap().is_empty());
}

// ============================================================================
// Eviction
// ============================================================================

#[tokio::test]
async fn test_fifty_first_key_evicts_first_inserted() {
    let cache = ForecastCache::default();
    assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    let keys = distinct_keys(DEFAULT_CAPACITY + 1);

    for k in &keys[..DEFAULT_CAPACITY] {
        cache.put(*k, vec![]).await;
    }
    assert_eq!(cache.len().await, DEFAULT_CAPACITY);

    // Reading the first key does not protect it.
    assert!(cache.get(&keys[0]).await.is_some());

    cache.put(keys[DEFAULT_CAPACITY], vec![]).await;
    assert_eq!(cache.len().await, DEFAULT_CAPACITY);
    assert!(cache.get(&keys[0]).await.is_none());
    assert!(cache.get(&keys[1]).await.is_some());
    assert!(cache.get(&keys[DEFAULT_CAPACITY]).await.is_some());
    assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_eviction_follows_insertion_order() {
    let cache = ForecastCache::new(3);
    let keys = distinct_keys(6);
    for k in &keys {
        cache.put(*k, vec![]).await;
    }
    assert_eq!(cache.keys().await, keys[3..].to_vec());
}

#[tokio::test]
async fn test_clones_share_entries() {
    let cache = ForecastCache::new(5);
    let clone = cache.clone();
    let k = key(Domain::Kenya, Parameter::ConvectiveEnergy, 9);
    clone.put(k, vec![ForecastPoint::new(1.0, 1.0, 1.0)]).await;
    assert!(cache.contains(&k).await);
}
