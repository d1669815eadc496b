//! Geographic bounds in degrees.

use serde::{Deserialize, Serialize};

/// A lon/lat rectangle in degrees.
///
/// A usable bounds has finite edges and `min < max` on both axes; see
/// [`Bounds::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Create bounds from edge coordinates.
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// An inverted rectangle that any finite coordinate will extend.
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    /// Longitude span in degrees.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// True when every edge is finite.
    pub fn is_finite(&self) -> bool {
        self.min_lon.is_finite()
            && self.max_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lat.is_finite()
    }

    /// Finite and strictly ordered on both axes.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.min_lon < self.max_lon && self.min_lat < self.max_lat
    }

    /// Grow to include a coordinate. Non-finite coordinates are ignored.
    pub fn extend(&mut self, lon: f64, lat: f64) {
        if !lon.is_finite() || !lat.is_finite() {
            return;
        }
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
    }

    /// Expand every edge outward by `fraction` of the span on its axis.
    pub fn padded(&self, fraction: f64) -> Self {
        let lon_pad = self.lon_span() * fraction;
        let lat_pad = self.lat_span() * fraction;
        Self {
            min_lon: self.min_lon - lon_pad,
            max_lon: self.max_lon + lon_pad,
            min_lat: self.min_lat - lat_pad,
            max_lat: self.max_lat + lat_pad,
        }
    }

    /// Check if a coordinate lies within these bounds (edges inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_not_finite() {
        let b = Bounds::empty();
        assert!(!b.is_finite());
        assert!(!b.is_valid());
    }

    #[test]
    fn test_extend_skips_non_finite() {
        let mut b = Bounds::empty();
        b.extend(f64::NAN, 1.0);
        b.extend(2.0, f64::INFINITY);
        assert!(!b.is_finite());

        b.extend(10.0, -2.0);
        b.extend(12.0, 3.0);
        assert_eq!(b, Bounds::new(10.0, 12.0, -2.0, 3.0));
    }
}
