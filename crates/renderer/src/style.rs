//! Colours and layer styles.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#rrggbb`, `rrggbb` or `rgb(r, g, b)`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(inner) = text
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>());
            let r = channels.next()?.ok()?;
            let g = channels.next()?.ok()?;
            let b = channels.next()?.ok()?;
            if channels.next().is_some() {
                return None;
            }
            return Some(Self::rgb(r, g, b));
        }
        hex_to_rgb(text).map(|(r, g, b)| Self::rgb(r, g, b))
    }

    /// Same colour with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{}'", text)))
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Stroke and optional fill for a boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub stroke: Color,
    #[serde(default)]
    pub fill: Option<Color>,
    pub line_width: f32,
}

impl LayerStyle {
    pub const fn stroke(stroke: Color, line_width: f32) -> Self {
        Self {
            stroke,
            fill: None,
            line_width,
        }
    }

    pub const fn filled(fill: Color, stroke: Color, line_width: f32) -> Self {
        Self {
            stroke,
            fill: Some(fill),
            line_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_rgb() {
        assert_eq!(Color::parse("#cfe9f6"), Some(Color::rgb(0xcf, 0xe9, 0xf6)));
        assert_eq!(Color::parse("8B4513"), Some(Color::rgb(139, 69, 19)));
        assert_eq!(Color::parse("rgb(255, 0, 230)"), Some(Color::rgb(255, 0, 230)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Color::parse("#fff"), None);
        assert_eq!(Color::parse("rgb(300, 0, 0)"), None);
        assert_eq!(Color::parse("rgb(1, 2, 3, 4)"), None);
        assert_eq!(Color::parse("blue"), None);
    }

    #[test]
    fn test_style_deserializes_colour_strings() {
        let style: LayerStyle =
            serde_json::from_str(r##"{ "stroke": "#0ea5e9", "fill": "#bae6fd", "line_width": 0.5 }"##)
                .unwrap();
        assert_eq!(style.fill, Some(Color::rgb(0xba, 0xe6, 0xfd)));
        assert_eq!(style.line_width, 0.5);
    }
}
