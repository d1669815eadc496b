//! Polygon boundary drawing.

use forecast_common::{BoundaryGeometry, BoundaryLayer, Ring};
use projection::PixelProjection;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Stroke, Transform};

use crate::canvas::Canvas;
use crate::style::LayerStyle;

/// Pixel vertices of a ring, skipping any vertex that does not project.
pub fn project_ring(ring: &Ring, projection: &PixelProjection) -> Vec<(f32, f32)> {
    ring.points().iter().filter_map(|p| projection.project(p)).collect()
}

/// Append projected vertices to `pb` as a closed sub-path.
pub fn append_points(pb: &mut PathBuilder, points: &[(f32, f32)]) -> usize {
    let Some((&(x0, y0), rest)) = points.split_first() else {
        return 0;
    };
    pb.move_to(x0, y0);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();
    points.len()
}

/// Append one ring to `pb` as a closed sub-path.
///
/// The first finite projected vertex starts the sub-path and every later
/// finite vertex extends it. Returns the number of vertices used; zero means
/// nothing was appended.
pub fn append_ring(pb: &mut PathBuilder, ring: &Ring, projection: &PixelProjection) -> usize {
    append_points(pb, &project_ring(ring, projection))
}

/// Build the pixel path for a single ring, `None` when it has no drawable vertices.
pub fn ring_path(ring: &Ring, projection: &PixelProjection) -> Option<Path> {
    let mut pb = PathBuilder::new();
    if append_ring(&mut pb, ring, projection) == 0 {
        return None;
    }
    pb.finish()
}

/// Draw every ring of a geometry, fill first then stroke.
///
/// Returns how many rings were drawn. Rings without valid vertices are
/// skipped; the rest of the geometry still draws.
pub fn draw_geometry(
    canvas: &mut Canvas,
    projection: &PixelProjection,
    geometry: &BoundaryGeometry,
    style: &LayerStyle,
) -> usize {
    let mut stroke_paint = Paint::default();
    stroke_paint.set_color(style.stroke.to_skia());
    stroke_paint.anti_alias = true;

    let fill_paint = style.fill.map(|fill| {
        let mut paint = Paint::default();
        paint.set_color(fill.to_skia());
        paint.anti_alias = true;
        paint
    });

    let stroke = Stroke {
        width: style.line_width,
        ..Stroke::default()
    };

    let pixmap = canvas.pixmap_mut();
    let mut drawn = 0;
    for ring in geometry.rings() {
        let Some(path) = ring_path(ring, projection) else {
            continue;
        };
        if let Some(paint) = &fill_paint {
            pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
        }
        if style.line_width > 0.0 {
            pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), None);
        }
        drawn += 1;
    }
    drawn
}

/// Draw every geometry of a layer with one style.
pub fn draw_layer(
    canvas: &mut Canvas,
    projection: &PixelProjection,
    layer: &BoundaryLayer,
    style: &LayerStyle,
) -> usize {
    layer
        .geometries
        .iter()
        .map(|geometry| draw_geometry(canvas, projection, geometry, style))
        .sum()
}
