//! In-memory cache of forecast point sets.
//!
//! One entry per (domain, parameter, time step). Entries are immutable once
//! stored and handed out as shared references.
//!
//! ## Eviction
//!
//! The cache holds a fixed number of entries. When an insert pushes it past
//! that number, the entry that was inserted first is dropped. Reads do not
//! change eviction order, so a frequently viewed step is still evicted when
//! it is the oldest.
//!
//! ## Metrics
//!
//! - `forecast_cache_hits_total` / `forecast_cache_misses_total`
//! - `forecast_cache_evictions_total`
//! - `forecast_cache_entries`

use forecast_common::{CacheKey, ForecastPoint};
use lru::LruCache;
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Default number of cached point sets.
pub const DEFAULT_CAPACITY: usize = 50;

/// A cached point set.
pub type CacheEntry = Arc<Vec<ForecastPoint>>;

/// Shared, bounded store of point sets.
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Clone)]
pub struct ForecastCache {
    // `LruCache` is used only for its ordered map: reads go through `peek`,
    // so the "least recent" end is always the oldest insert.
    entries: Arc<RwLock<LruCache<CacheKey, CacheEntry>>>,
    // Mirrors `entries.len()`; written only under the write lock.
    entry_count: Arc<AtomicUsize>,
    capacity: usize,
    stats: Arc<ForecastCacheStats>,
}

/// Counters for the forecast cache.
#[derive(Debug, Default)]
pub struct ForecastCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub inserts: AtomicU64,
}

impl ForecastCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    fn snapshot(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits.load(Ordering::Relaxed)),
            misses: AtomicU64::new(self.misses.load(Ordering::Relaxed)),
            evictions: AtomicU64::new(self.evictions.load(Ordering::Relaxed)),
            inserts: AtomicU64::new(self.inserts.load(Ordering::Relaxed)),
        }
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ForecastCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(LruCache::unbounded())),
            entry_count: Arc::new(AtomicUsize::new(0)),
            capacity: capacity.max(1),
            stats: Arc::new(ForecastCacheStats::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a point set.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        match entries.peek(key) {
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                counter!("forecast_cache_hits_total").increment(1);
                Some(Arc::clone(entry))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                counter!("forecast_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// True if the key is cached. Does not count as a hit or miss.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains(key)
    }

    /// Store a point set and return the shared entry.
    ///
    /// Storing an existing key replaces its points but keeps its original
    /// insertion position.
    pub async fn put(&self, key: CacheKey, points: Vec<ForecastPoint>) -> CacheEntry {
        let entry: CacheEntry = Arc::new(points);
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.peek_mut(&key) {
            *existing = Arc::clone(&entry);
            debug!(key = %key, "Replaced cached point set");
            return entry;
        }

        entries.put(key, Arc::clone(&entry));
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);

        while entries.len() > self.capacity {
            let Some((evicted, _)) = entries.pop_lru() else {
                break;
            };
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            counter!("forecast_cache_evictions_total").increment(1);
            debug!(evicted = %evicted, "Evicted oldest cached point set");
        }

        self.entry_count.store(entries.len(), Ordering::SeqCst);
        gauge!("forecast_cache_entries").set(entries.len() as f64);
        debug!(key = %key, points = entry.len(), entries = entries.len(), "Cached point set");
        entry
    }

    /// Current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Number of entries as of the last completed write, without locking.
    pub fn entry_count(&self) -> usize {
        self.entry_count.load(Ordering::SeqCst)
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Cached keys, oldest insert first.
    pub async fn keys(&self) -> Vec<CacheKey> {
        // `iter` walks most-recent first.
        let entries = self.entries.read().await;
        let mut keys: Vec<CacheKey> = entries.iter().map(|(k, _)| *k).collect();
        keys.reverse();
        keys
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.entry_count.store(0, Ordering::SeqCst);
        gauge!("forecast_cache_entries").set(0.0);
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> ForecastCacheStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_common::{Domain, Parameter, TimeStep};

    fn key(step: u8) -> CacheKey {
        CacheKey::new(
            Domain::Kenya,
            Parameter::Precipitation,
            TimeStep::new(step).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_cache_basic_operations() {
        let cache = ForecastCache::new(4);
        assert!(cache.is_empty().await);
        assert!(cache.get(&key(0)).await.is_none());

        cache.put(key(0), vec![ForecastPoint::new(1.0, 2.0, 3.0)]).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key(0)).await.unwrap()[0].value, 3.0);

        let stats = cache.stats();
        assert_eq!(stats.hits.load(Ordering::Relaxed), 1);
        assert_eq!(stats.misses.load(Ordering::Relaxed), 1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[tokio::test]
    async fn test_replace_keeps_insertion_position() {
        let cache = ForecastCache::new(2);
        cache.put(key(0), vec![]).await;
        cache.put(key(1), vec![]).await;
        cache.put(key(0), vec![ForecastPoint::new(0.0, 0.0, 9.0)]).await;
        assert_eq!(cache.keys().await, vec![key(0), key(1)]);

        cache.put(key(2), vec![]).await;
        assert!(!cache.contains(&key(0)).await);
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_entry_count_tracks_len() {
        let cache = ForecastCache::new(2);
        assert_eq!(cache.entry_count(), 0);
        for step in 0..3 {
            cache.put(key(step), vec![]).await;
            assert_eq!(cache.entry_count(), cache.len().await);
        }
        assert_eq!(cache.entry_count(), 2);

        cache.clear().await;
        assert_eq!(cache.entry_count(), 0);
    }
}
