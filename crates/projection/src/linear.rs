//! Equirectangular projection of lon/lat onto a pixel viewport.
//!
//! The mapping is a plain linear stretch of the bounds onto the viewport:
//!
//! ```text
//! x = (lon - min_lon) / (max_lon - min_lon) * width
//! y = (max_lat - lat) / (max_lat - min_lat) * height
//! ```
//!
//! A projection is immutable. When the bounds or the viewport change a new
//! one is built, so a single frame never mixes two coordinate systems.

use forecast_common::{Bounds, ForecastError, ForecastResult, LonLat};

/// Lon/lat to pixel mapping for one bounds and viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelProjection {
    bounds: Bounds,
    width: f64,
    height: f64,
}

impl PixelProjection {
    /// Build a projection. Bounds must be valid and the viewport non-empty.
    pub fn new(bounds: Bounds, width: u32, height: u32) -> ForecastResult<Self> {
        if !bounds.is_valid() {
            return Err(ForecastError::BoundsResolution(format!(
                "cannot project with bounds {:?}",
                bounds
            )));
        }
        if width == 0 || height == 0 {
            return Err(ForecastError::Render(format!(
                "viewport has no size ({}x{})",
                width, height
            )));
        }
        Ok(Self {
            bounds,
            width: width as f64,
            height: height as f64,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Pixel column for a longitude.
    #[inline]
    pub fn x(&self, lon: f64) -> f64 {
        (lon - self.bounds.min_lon) / self.bounds.lon_span() * self.width
    }

    /// Pixel row for a latitude (north at the top).
    #[inline]
    pub fn y(&self, lat: f64) -> f64 {
        (self.bounds.max_lat - lat) / self.bounds.lat_span() * self.height
    }

    /// Project a vertex, returning `None` when either pixel coordinate is
    /// not finite as `f32`.
    #[inline]
    pub fn project(&self, coord: &LonLat) -> Option<(f32, f32)> {
        let x = self.x(coord[0]) as f32;
        let y = self.y(coord[1]) as f32;
        if x.is_finite() && y.is_finite() {
            Some((x, y))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> PixelProjection {
        PixelProjection::new(Bounds::new(30.0, 40.0, -5.0, 5.0), 100, 200).unwrap()
    }

    #[test]
    fn test_corners() {
        let p = unit();
        assert_eq!(p.x(30.0), 0.0);
        assert_eq!(p.x(40.0), 100.0);
        assert_eq!(p.y(5.0), 0.0);
        assert_eq!(p.y(-5.0), 200.0);
    }

    #[test]
    fn test_center() {
        let p = unit();
        assert_eq!(p.project(&[35.0, 0.0]), Some((50.0, 100.0)));
    }

    #[test]
    fn test_non_finite_is_none() {
        let p = unit();
        assert_eq!(p.project(&[f64::NAN, 0.0]), None);
        assert_eq!(p.project(&[35.0, f64::INFINITY]), None);
    }

    #[test]
    fn test_overflowing_f32_is_none() {
        let p = unit();
        // Finite as f64, beyond f32::MAX once scaled to pixels.
        assert_eq!(p.project(&[1e40, 0.0]), None);
        assert_eq!(p.project(&[35.0, -1e40]), None);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(PixelProjection::new(Bounds::empty(), 10, 10).is_err());
        assert!(PixelProjection::new(Bounds::new(0.0, 1.0, 0.0, 1.0), 0, 10).is_err());
    }
}
