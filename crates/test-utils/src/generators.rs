//! Synthetic forecast point generators.
//!
//! Values are deterministic so rendered frames can be compared byte for byte.

use forecast_common::{Bounds, ForecastPoint};

/// A regular `nx` x `ny` lattice of points covering `bounds`, with the value
/// at each node produced by `value_fn(col, row)`.
pub fn point_lattice<F>(bounds: &Bounds, nx: usize, ny: usize, value_fn: F) -> Vec<ForecastPoint>
where
    F: Fn(usize, usize) -> f64,
{
    let mut points = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            let fx = if nx > 1 { col as f64 / (nx - 1) as f64 } else { 0.5 };
            let fy = if ny > 1 { row as f64 / (ny - 1) as f64 } else { 0.5 };
            let lon = bounds.min_lon + fx * bounds.lon_span();
            let lat = bounds.max_lat - fy * bounds.lat_span();
            points.push(ForecastPoint::new(lat, lon, value_fn(col, row)));
        }
    }
    points
}

/// Rainfall-like values increasing west to east, 0mm to roughly 150mm.
pub fn rainfall_points(bounds: &Bounds, nx: usize, ny: usize) -> Vec<ForecastPoint> {
    point_lattice(bounds, nx, ny, |col, _| col as f64 * 150.0 / nx.max(1) as f64)
}

/// Every point carries the same value.
pub fn constant_points(bounds: &Bounds, nx: usize, ny: usize, value: f64) -> Vec<ForecastPoint> {
    point_lattice(bounds, nx, ny, |_, _| value)
}

/// A single point at the centre of `bounds`.
pub fn center_point(bounds: &Bounds, value: f64) -> Vec<ForecastPoint> {
    vec![ForecastPoint::new(
        (bounds.min_lat + bounds.max_lat) / 2.0,
        (bounds.min_lon + bounds.max_lon) / 2.0,
        value,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_corners() {
        let b = Bounds::new(0.0, 10.0, 0.0, 10.0);
        let points = point_lattice(&b, 3, 2, |c, r| (c * 10 + r) as f64);
        assert_eq!(points.len(), 6);
        assert_eq!((points[0].lon, points[0].lat), (0.0, 10.0));
        assert_eq!((points[5].lon, points[5].lat), (10.0, 0.0));
        assert_eq!(points[5].value, 21.0);
    }
}
