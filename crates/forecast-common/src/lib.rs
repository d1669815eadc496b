//! Common types shared across the forecast map crates.

pub mod bounds;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod point;
pub mod time;

pub use bounds::Bounds;
pub use domain::{Domain, Parameter};
pub use error::{ForecastError, ForecastResult};
pub use geometry::{BoundaryGeometry, BoundaryLayer, LonLat, Ring};
pub use point::{CacheKey, FieldPayload, FieldMetadata, ForecastPoint};
pub use time::TimeStep;
