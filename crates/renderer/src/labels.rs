//! Coordinate tick labels along the bottom and right edges.
//!
//! Text is drawn as stroked line-segment glyphs, so no font asset is needed.
//! Only the characters that appear in coordinate labels are defined.

use forecast_common::{ForecastError, ForecastResult};
use projection::PixelProjection;
use serde::{Deserialize, Serialize};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::canvas::Canvas;
use crate::style::Color;

/// Label placement and appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Spacing between ticks in degrees.
    pub step_degrees: f64,
    /// Glyph height in pixels.
    pub font_size: f32,
    pub color: Color,
    /// Gap between the canvas edge and the text.
    pub margin: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            step_degrees: 4.0,
            font_size: 8.0,
            color: Color::rgb(0x47, 0x55, 0x69),
            margin: 4.0,
        }
    }
}

impl LabelConfig {
    /// Reject a tick spacing that would not advance.
    pub fn validate(&self) -> ForecastResult<()> {
        if !self.step_degrees.is_finite() || self.step_degrees < MIN_TICK_STEP {
            return Err(ForecastError::Config(format!(
                "labels.step_degrees must be at least {} (got {})",
                MIN_TICK_STEP, self.step_degrees
            )));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(ForecastError::Config(format!(
                "labels.font_size must be positive (got {})",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Text anchoring relative to the label position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Center,
    Right,
}

/// Longitude label, e.g. `36°E`.
pub fn format_longitude(lon: f64) -> String {
    if lon < 0.0 {
        format!("{}°W", -lon)
    } else {
        format!("{}°E", lon)
    }
}

/// Latitude label, e.g. `4°N`, `4°S`.
pub fn format_latitude(lat: f64) -> String {
    if lat < 0.0 {
        format!("{}°S", -lat)
    } else {
        format!("{}°N", lat)
    }
}

/// Smallest tick spacing accepted, in degrees.
pub const MIN_TICK_STEP: f64 = 0.01;

/// Upper bound on ticks per axis.
pub const MAX_TICKS: usize = 512;

/// Tick values from `ceil(min)` in steps of `step`, up to `max` inclusive.
///
/// Steps below [`MIN_TICK_STEP`] or not finite yield no ticks, and at most
/// [`MAX_TICKS`] are returned.
pub fn tick_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step < MIN_TICK_STEP || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let first = min.ceil();
    (0..MAX_TICKS)
        .map(|i| first + i as f64 * step)
        .take_while(|value| *value <= max)
        .collect()
}

/// Draw longitude labels along the bottom edge and latitude labels along the
/// right edge. Returns the number of labels drawn.
pub fn draw_coordinate_labels(
    canvas: &mut Canvas,
    projection: &PixelProjection,
    config: &LabelConfig,
) -> usize {
    let bounds = *projection.bounds();
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;

    let mut paint = Paint::default();
    paint.set_color(config.color.to_skia());
    paint.anti_alias = true;

    let pixmap = canvas.pixmap_mut();
    let mut drawn = 0;

    for lon in tick_values(bounds.min_lon, bounds.max_lon, config.step_degrees) {
        let x = projection.x(lon) as f32;
        // Baseline sits `margin` above the bottom edge.
        let y = height - config.margin - config.font_size / 2.0;
        draw_text(pixmap, x, y, &format_longitude(lon), config.font_size, Anchor::Center, &paint);
        drawn += 1;
    }

    for lat in tick_values(bounds.min_lat, bounds.max_lat, config.step_degrees) {
        let y = projection.y(lat) as f32 + 3.0 - config.font_size / 2.0;
        let x = width - config.margin;
        draw_text(pixmap, x, y, &format_latitude(lat), config.font_size, Anchor::Right, &paint);
        drawn += 1;
    }

    drawn
}

fn text_width(text: &str, font_size: f32) -> f32 {
    let (char_width, spacing) = glyph_metrics(font_size);
    let n = text.chars().count() as f32;
    (n * (char_width + spacing) - spacing).max(0.0)
}

fn glyph_metrics(font_size: f32) -> (f32, f32) {
    (font_size * 0.6, font_size * 0.15)
}

/// Draw `text` with its vertical centre at `y`.
fn draw_text(pixmap: &mut Pixmap, x: f32, y: f32, text: &str, font_size: f32, anchor: Anchor, paint: &Paint) {
    let (char_width, spacing) = glyph_metrics(font_size);
    let total = text_width(text, font_size);
    let start = match anchor {
        Anchor::Center => x - total / 2.0,
        Anchor::Right => x - total,
    };

    for (i, ch) in text.chars().enumerate() {
        let cx = start + i as f32 * (char_width + spacing) + char_width / 2.0;
        draw_glyph(pixmap, cx, y, ch, char_width, font_size, paint);
    }
}

type Segment = ((f32, f32), (f32, f32));

/// Stroke one character centred on `(x, y)`.
fn draw_glyph(pixmap: &mut Pixmap, x: f32, y: f32, ch: char, width: f32, height: f32, paint: &Paint) {
    let segments = glyph_segments(ch, width / 2.0, height / 2.0);
    if segments.is_empty() {
        return;
    }

    let stroke = Stroke {
        width: (width * 0.18).max(0.75),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut pb = PathBuilder::new();
    for ((x1, y1), (x2, y2)) in segments {
        pb.move_to(x + x1, y + y1);
        pb.line_to(x + x2, y + y2);
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}

/// Seven-segment style outlines, plus the letters used by hemisphere suffixes.
fn glyph_segments(ch: char, hw: f32, hh: f32) -> Vec<Segment> {
    let top = ((-hw, -hh), (hw, -hh));
    let middle = ((-hw, 0.0), (hw, 0.0));
    let bottom = ((-hw, hh), (hw, hh));
    let upper_left = ((-hw, -hh), (-hw, 0.0));
    let lower_left = ((-hw, 0.0), (-hw, hh));
    let upper_right = ((hw, -hh), (hw, 0.0));
    let lower_right = ((hw, 0.0), (hw, hh));
    let left = ((-hw, -hh), (-hw, hh));
    let right = ((hw, -hh), (hw, hh));

    match ch {
        '0' => vec![top, right, bottom, left],
        '1' => vec![((0.0, -hh), (0.0, hh))],
        '2' => vec![top, upper_right, middle, lower_left, bottom],
        '3' => vec![top, right, bottom, middle],
        '4' => vec![upper_left, middle, right],
        '5' => vec![top, upper_left, middle, lower_right, bottom],
        '6' => vec![top, left, bottom, lower_right, middle],
        '7' => vec![top, ((hw, -hh), (0.0, hh))],
        '8' => vec![top, right, bottom, left, middle],
        '9' => vec![middle, upper_right, top, upper_left, lower_right],
        '-' => vec![middle],
        '.' => vec![((0.0, hh * 0.7), (0.0, hh * 0.8))],
        'E' => vec![top, left, bottom, ((-hw, 0.0), (hw * 0.5, 0.0))],
        'N' => vec![left, ((-hw, -hh), (hw, hh)), right],
        'S' => vec![top, upper_left, middle, lower_right, bottom],
        'W' => vec![
            left,
            ((-hw, hh), (0.0, 0.0)),
            ((0.0, 0.0), (hw, hh)),
            right,
        ],
        // Small raised box.
        '°' => {
            let s = hw * 0.6;
            vec![
                ((-s, -hh), (s, -hh)),
                ((s, -hh), (s, -hh + s * 2.0)),
                ((s, -hh + s * 2.0), (-s, -hh + s * 2.0)),
                ((-s, -hh + s * 2.0), (-s, -hh)),
            ]
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_values_start_at_ceiling() {
        assert_eq!(tick_values(32.4, 44.6, 4.0), vec![33.0, 37.0, 41.0]);
        assert_eq!(tick_values(-5.2, 5.5, 4.0), vec![-5.0, -1.0, 3.0]);
        assert!(tick_values(0.0, 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_tiny_or_unbounded_steps_yield_nothing() {
        assert!(tick_values(33.0, 44.0, 1e-20).is_empty());
        assert!(tick_values(33.0, 44.0, f64::INFINITY).is_empty());
        assert!(tick_values(33.0, 44.0, f64::NAN).is_empty());
    }

    #[test]
    fn test_validate_step() {
        assert!(LabelConfig::default().validate().is_ok());
        for step in [1e-20, 0.0, -4.0, f64::NAN, f64::INFINITY] {
            let config = LabelConfig {
                step_degrees: step,
                ..LabelConfig::default()
            };
            assert!(config.validate().is_err(), "step {}", step);
        }
    }

    #[test]
    fn test_tick_count_is_capped() {
        let ticks = tick_values(-1e6, 1e6, MIN_TICK_STEP);
        assert_eq!(ticks.len(), MAX_TICKS);
        assert_eq!(ticks[0], -1e6);
    }

    #[test]
    fn test_format_hemispheres() {
        assert_eq!(format_longitude(37.0), "37°E");
        assert_eq!(format_latitude(-5.0), "5°S");
        assert_eq!(format_latitude(3.0), "3°N");
    }

    #[test]
    fn test_every_label_character_has_a_glyph() {
        for ch in "0123456789-.ENSW°".chars() {
            assert!(!glyph_segments(ch, 2.0, 4.0).is_empty(), "{}", ch);
        }
    }
}
