//! Forecast data storage for the map service.
//!
//! Provides:
//! - A bounded in-memory cache of point sets keyed by domain, parameter and time step
//! - The `FieldSource` seam that fetches point sets from the data service
//! - Look-ahead prefetch of the next time steps

pub mod forecast_cache;
pub mod prefetch;
pub mod source;

pub use forecast_cache::{CacheEntry, ForecastCache, ForecastCacheStats, DEFAULT_CAPACITY};
pub use prefetch::{
    load_field, prefetch_ahead, prefetch_ahead_with, prefetch_steps, spawn_prefetch, FieldOrigin, PrefetchConfig,
    PrefetchReport,
};
pub use source::FieldSource;
