//! Clip regions built from boundary polygons.
//!
//! A clip is a compound path over every ring of the supplied layers,
//! rasterised into a coverage mask. It is passed explicitly to the draw call
//! it restricts, so nothing drawn afterwards is affected by it.

use forecast_common::BoundaryLayer;
use projection::PixelProjection;
use tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};
use tracing::debug;

use crate::boundary::{append_points, project_ring};

/// Pixel extent of the rings accepted so far.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl Extent {
    const EMPTY: Extent = Extent {
        min_x: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        min_y: f32::INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    /// Grow to include `points`, or `None` when the width or height would
    /// no longer be finite.
    fn including(self, points: &[(f32, f32)]) -> Option<Extent> {
        let grown = points.iter().fold(self, |e, &(x, y)| Extent {
            min_x: e.min_x.min(x),
            max_x: e.max_x.max(x),
            min_y: e.min_y.min(y),
            max_y: e.max_y.max(y),
        });
        let finite =
            (grown.max_x - grown.min_x).is_finite() && (grown.max_y - grown.min_y).is_finite();
        finite.then_some(grown)
    }
}

/// Build one compound path from all rings of all layers.
///
/// A ring that would push the path extent past what `f32` can hold is
/// skipped on its own; the other rings still clip. Returns `None` when no
/// ring has a drawable vertex.
pub fn build_clip_path<'a, I>(layers: I, projection: &PixelProjection) -> Option<Path>
where
    I: IntoIterator<Item = &'a BoundaryLayer>,
{
    let mut pb = PathBuilder::new();
    let mut extent = Extent::EMPTY;
    let mut rings = 0usize;
    for layer in layers {
        for geometry in &layer.geometries {
            for ring in geometry.rings() {
                let points = project_ring(ring, projection);
                if points.is_empty() {
                    continue;
                }
                let Some(grown) = extent.including(&points) else {
                    debug!(layer = %layer.name, "Skipped clip ring with unbounded extent");
                    continue;
                };
                extent = grown;
                append_points(&mut pb, &points);
                rings += 1;
            }
        }
    }
    if rings == 0 {
        return None;
    }
    pb.finish()
}

/// A rasterised clip covering the interior of a set of boundaries.
pub struct ClipRegion {
    mask: Mask,
}

impl ClipRegion {
    /// Rasterise the union of `layers` at the projection's viewport size.
    pub fn from_layers<'a, I>(layers: I, projection: &PixelProjection) -> Option<Self>
    where
        I: IntoIterator<Item = &'a BoundaryLayer>,
    {
        let path = build_clip_path(layers, projection)?;
        let mut mask = Mask::new(projection.width() as u32, projection.height() as u32)?;
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
        debug!(bounds = ?path.bounds(), "Built clip region");
        Some(Self { mask })
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Coverage at a pixel, 0 outside and 255 fully inside.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.mask.width() || y >= self.mask.height() {
            return 0;
        }
        self.mask.data()[(y * self.mask.width() + x) as usize]
    }
}
