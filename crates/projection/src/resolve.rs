//! Bounds resolution for rendering domains.

use forecast_common::{BoundaryLayer, Bounds, Domain, ForecastError, ForecastResult};
use tracing::debug;

/// Fraction of the span added on each side of computed bounds.
pub const BOUNDS_PADDING: f64 = 0.05;

/// Tight lon/lat extent of every finite vertex in the given layers.
///
/// Returns [`Bounds::empty`] (non-finite) when no finite vertex exists.
pub fn union_extent<'a, I>(layers: I) -> Bounds
where
    I: IntoIterator<Item = &'a BoundaryLayer>,
{
    let mut extent = Bounds::empty();
    for layer in layers {
        for ring in layer.rings() {
            for [lon, lat] in ring.points() {
                extent.extend(*lon, *lat);
            }
        }
    }
    extent
}

/// Resolve the rectangle to project for a domain.
///
/// Fixed domains return their literal bounds and ignore `layers`. Computed
/// domains take the union extent of `layers` and pad it by
/// [`BOUNDS_PADDING`] of the span on each axis.
pub fn resolve_bounds(domain: Domain, layers: &[BoundaryLayer]) -> ForecastResult<Bounds> {
    if let Some(bounds) = domain.fixed_bounds() {
        return Ok(bounds);
    }

    let extent = union_extent(layers);
    if !extent.is_finite() {
        return Err(ForecastError::BoundsResolution(format!(
            "no finite coordinates in {} layer(s)",
            layers.len()
        )));
    }

    let padded = extent.padded(BOUNDS_PADDING);
    if !padded.is_valid() {
        return Err(ForecastError::BoundsResolution(format!(
            "degenerate extent {:?}",
            extent
        )));
    }

    debug!(
        domain = %domain,
        layers = layers.len(),
        min_lon = padded.min_lon,
        max_lon = padded.max_lon,
        min_lat = padded.min_lat,
        max_lat = padded.max_lat,
        "Resolved computed bounds"
    );
    Ok(padded)
}
