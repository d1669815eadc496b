//! Heat-field compositing of scattered forecast points.
//!
//! Each point contributes a radial blob of its classified colour, fading to
//! transparent at a fixed radius. Blobs are combined with a screen blend so
//! overlaps brighten, the layer is smoothed by a series of Gaussian blurs of
//! decreasing radius, and the result is drawn onto the map at a fixed
//! opacity, restricted to the clip region when one is given.

use forecast_common::{ForecastError, ForecastPoint, ForecastResult, Parameter};
use image::{imageops, RgbaImage};
use projection::PixelProjection;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    BlendMode, FilterQuality, GradientStop, IntSize, Paint, Pixmap, PixmapPaint, Point,
    RadialGradient, Rect, SpreadMode, Transform,
};
use tracing::debug;

use crate::canvas::Canvas;
use crate::clip::ClipRegion;
use crate::palette::ColorScale;
use crate::style::Color;

/// One stop of the per-point falloff, `offset` as a fraction of the radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FalloffStop {
    pub offset: f32,
    pub alpha: f32,
}

/// Tuning constants for the heat field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatFieldConfig {
    /// Falloff radius in pixels.
    pub radius: f32,
    pub stops: Vec<FalloffStop>,
    /// Blur standard deviations, applied in order.
    pub blur_passes: Vec<f32>,
    /// Opacity used when drawing the field onto the map.
    pub opacity: f32,
}

impl Default for HeatFieldConfig {
    fn default() -> Self {
        Self {
            radius: 70.0,
            stops: vec![
                FalloffStop { offset: 0.0, alpha: 0.8 },
                FalloffStop { offset: 0.3, alpha: 0.6 },
                FalloffStop { offset: 0.6, alpha: 0.3 },
                FalloffStop { offset: 1.0, alpha: 0.0 },
            ],
            blur_passes: vec![15.0, 10.0, 5.0],
            opacity: 0.85,
        }
    }
}

/// Largest falloff radius accepted, in pixels.
pub const MAX_RADIUS: f32 = 1000.0;

/// Largest blur standard deviation accepted, in pixels.
pub const MAX_BLUR_SIGMA: f32 = 100.0;

impl HeatFieldConfig {
    /// Reject settings that cannot be drawn in bounded time.
    pub fn validate(&self) -> ForecastResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 || self.radius > MAX_RADIUS {
            return Err(ForecastError::Config(format!(
                "heat_field.radius must be in (0, {}] (got {})",
                MAX_RADIUS, self.radius
            )));
        }
        if let Some(sigma) = self
            .blur_passes
            .iter()
            .find(|sigma| !sigma.is_finite() || **sigma < 0.0 || **sigma > MAX_BLUR_SIGMA)
        {
            return Err(ForecastError::Config(format!(
                "heat_field.blur_passes must be in [0, {}] (got {})",
                MAX_BLUR_SIGMA, sigma
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ForecastError::Config(format!(
                "heat_field.opacity must be in [0, 1] (got {})",
                self.opacity
            )));
        }
        if self
            .stops
            .iter()
            .any(|stop| !stop.offset.is_finite() || !stop.alpha.is_finite())
        {
            return Err(ForecastError::Config(
                "heat_field.stops must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Observed value range of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over the finite values, `None` if there are none.
    pub fn from_points(points: &[ForecastPoint]) -> Option<Self> {
        points
            .iter()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range. A zero-width range maps to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        (value - self.min) / span
    }
}

/// What a compositing pass did.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HeatFieldSummary {
    pub points_drawn: usize,
    pub points_skipped: usize,
    pub range: Option<ValueRange>,
}

/// Resolve the display colour of one point.
///
/// A parseable precomputed colour wins; otherwise the value is classified,
/// raw for banded parameters and normalised for continuous ones.
pub fn point_color(point: &ForecastPoint, scale: &ColorScale, range: Option<&ValueRange>) -> Color {
    if let Some(color) = point.color.as_deref().and_then(Color::parse) {
        return color;
    }
    if scale.is_continuous() {
        let normalized = range.map(|r| r.normalize(point.value)).unwrap_or(0.0);
        scale.color(normalized)
    } else {
        scale.color(point.value)
    }
}

/// Composite `points` onto `canvas`.
///
/// An empty dataset draws nothing and is not an error.
pub fn composite_heat_field(
    canvas: &mut Canvas,
    projection: &PixelProjection,
    points: &[ForecastPoint],
    parameter: Parameter,
    config: &HeatFieldConfig,
    clip: Option<&ClipRegion>,
) -> ForecastResult<HeatFieldSummary> {
    let mut summary = HeatFieldSummary::default();
    if points.is_empty() {
        return Ok(summary);
    }

    let range = ValueRange::from_points(points);
    summary.range = range;
    let scale = ColorScale::for_parameter(parameter);

    let mut layer = Pixmap::new(canvas.width(), canvas.height())
        .ok_or_else(|| ForecastError::Render("cannot allocate heat-field layer".to_string()))?;

    for point in points {
        let Some((x, y)) = projection.project(&[point.lon, point.lat]) else {
            summary.points_skipped += 1;
            continue;
        };
        let color = point_color(point, &scale, range.as_ref());
        if draw_falloff(&mut layer, x, y, color, config) {
            summary.points_drawn += 1;
        } else {
            summary.points_skipped += 1;
        }
    }

    let layer = progressive_blur(layer, &config.blur_passes)?;

    let paint = PixmapPaint {
        opacity: config.opacity.clamp(0.0, 1.0),
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Nearest,
    };
    canvas.pixmap_mut().draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &paint,
        Transform::identity(),
        clip.map(ClipRegion::mask),
    );

    debug!(
        parameter = %parameter,
        drawn = summary.points_drawn,
        skipped = summary.points_skipped,
        "Composited heat field"
    );
    Ok(summary)
}

/// Draw one radial blob. Returns false if it could not be drawn.
fn draw_falloff(layer: &mut Pixmap, x: f32, y: f32, color: Color, config: &HeatFieldConfig) -> bool {
    let radius = config.radius;
    if radius <= 0.0 {
        return false;
    }

    let stops = config
        .stops
        .iter()
        .map(|stop| {
            let alpha = (stop.alpha.clamp(0.0, 1.0) * color.a as f32).round() as u8;
            GradientStop::new(
                stop.offset.clamp(0.0, 1.0),
                color.with_alpha(alpha).to_skia(),
            )
        })
        .collect::<Vec<_>>();

    let center = Point::from_xy(x, y);
    let Some(shader) = RadialGradient::new(
        center,
        center,
        radius,
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    ) else {
        return false;
    };

    let Some(rect) = Rect::from_xywh(x - radius, y - radius, radius * 2.0, radius * 2.0) else {
        return false;
    };

    let paint = Paint {
        shader,
        blend_mode: BlendMode::Screen,
        anti_alias: true,
        ..Paint::default()
    };
    layer.fill_rect(rect, &paint, Transform::identity(), None);
    true
}

/// Blur the layer once per pass, each pass working on the previous output.
fn progressive_blur(layer: Pixmap, passes: &[f32]) -> ForecastResult<Pixmap> {
    if passes.iter().all(|sigma| *sigma <= 0.0) {
        return Ok(layer);
    }

    let (width, height) = (layer.width(), layer.height());
    let mut image = RgbaImage::from_raw(width, height, layer.take())
        .ok_or_else(|| ForecastError::Render("heat-field buffer size mismatch".to_string()))?;

    for &sigma in passes.iter().filter(|sigma| **sigma > 0.0) {
        image = imageops::blur(&image, sigma);
    }

    // Keep the buffer a valid premultiplied image after per-channel rounding.
    let mut data = image.into_raw();
    for px in data.chunks_exact_mut(4) {
        let alpha = px[3];
        px[0] = px[0].min(alpha);
        px[1] = px[1].min(alpha);
        px[2] = px[2].min(alpha);
    }

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| ForecastError::Render("heat-field layer has no size".to_string()))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| ForecastError::Render("cannot rebuild heat-field layer".to_string()))
}
