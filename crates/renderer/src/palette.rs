//! Per-parameter colour classification.
//!
//! Rainfall, temperature and humidity use the operational contour table:
//! a fixed, ordered list of inclusive upper bounds, each mapped to one
//! colour, with a final band for everything above the last bound. These are
//! classified on raw values in the parameter's units.
//!
//! CAPE has no operational table and is drawn as a continuous ramp over the
//! value normalised against the dataset's observed range.

use forecast_common::Parameter;
use serde::Serialize;

use crate::style::Color;

/// How a parameter's values map to colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorScale {
    /// `colors[i]` covers values `<= upper_bounds[i]`; the extra last colour
    /// covers everything above the final bound.
    Banded {
        upper_bounds: &'static [f64],
        colors: &'static [Color],
    },
    /// Linear ramp over a normalised value in `[0, 1]`.
    Continuous,
}

const RAINFALL_BOUNDS: [f64; 7] = [1.0, 10.0, 20.0, 50.0, 70.0, 100.0, 120.0];
const RAINFALL_COLORS: [Color; 8] = [
    Color::rgb(255, 255, 255), // no rain
    Color::rgb(211, 255, 190),
    Color::rgb(85, 255, 0),
    Color::rgb(115, 223, 255),
    Color::rgb(0, 170, 223),
    Color::rgb(255, 170, 0),
    Color::rgb(255, 0, 0),
    Color::rgb(255, 0, 230),
];

const TEMP_MAX_BOUNDS: [f64; 5] = [15.0, 20.0, 25.0, 30.0, 35.0];
const TEMP_MAX_COLORS: [Color; 6] = [
    Color::rgb(0, 230, 0),
    Color::rgb(152, 230, 0),
    Color::rgb(230, 230, 0),
    Color::rgb(255, 170, 0),
    Color::rgb(255, 90, 0),
    Color::rgb(192, 0, 0),
];

const TEMP_MIN_BOUNDS: [f64; 5] = [5.0, 10.0, 15.0, 20.0, 25.0];
const TEMP_MIN_COLORS: [Color; 6] = [
    Color::rgb(0, 0, 107),
    Color::rgb(0, 48, 255),
    Color::rgb(0, 168, 168),
    Color::rgb(112, 168, 0),
    Color::rgb(152, 230, 0),
    Color::rgb(230, 230, 0),
];

const HUMIDITY_BOUNDS: [f64; 4] = [20.0, 40.0, 60.0, 80.0];
const HUMIDITY_COLORS: [Color; 5] = [
    Color::rgb(139, 69, 19),
    Color::rgb(210, 105, 30),
    Color::rgb(240, 230, 140),
    Color::rgb(144, 238, 144),
    Color::rgb(0, 206, 209),
];

const CAPE_LEGEND_COLORS: [Color; 6] = [
    Color::rgb(0xf0, 0xf0, 0xf0),
    Color::rgb(0xff, 0xff, 0x99),
    Color::rgb(0xff, 0xcc, 0x66),
    Color::rgb(0xff, 0x99, 0x33),
    Color::rgb(0xff, 0x33, 0x33),
    Color::rgb(0xcc, 0x00, 0x00),
];

impl ColorScale {
    pub fn for_parameter(parameter: Parameter) -> Self {
        match parameter {
            Parameter::Precipitation => ColorScale::Banded {
                upper_bounds: &RAINFALL_BOUNDS,
                colors: &RAINFALL_COLORS,
            },
            Parameter::TemperatureMax => ColorScale::Banded {
                upper_bounds: &TEMP_MAX_BOUNDS,
                colors: &TEMP_MAX_COLORS,
            },
            Parameter::TemperatureMin => ColorScale::Banded {
                upper_bounds: &TEMP_MIN_BOUNDS,
                colors: &TEMP_MIN_COLORS,
            },
            Parameter::RelativeHumidity => ColorScale::Banded {
                upper_bounds: &HUMIDITY_BOUNDS,
                colors: &HUMIDITY_COLORS,
            },
            Parameter::ConvectiveEnergy => ColorScale::Continuous,
        }
    }

    /// True when [`ColorScale::color`] expects a normalised value.
    pub fn is_continuous(&self) -> bool {
        matches!(self, ColorScale::Continuous)
    }

    /// Colour for a value: raw units for banded scales, `[0, 1]` for continuous.
    ///
    /// Total: NaN lands in the first band (or the start of the ramp) and
    /// out-of-range values clamp to the nearest end.
    pub fn color(&self, value: f64) -> Color {
        match self {
            ColorScale::Banded {
                upper_bounds,
                colors,
            } => {
                if value.is_nan() {
                    return colors[0];
                }
                let band = upper_bounds
                    .iter()
                    .position(|&upper| value <= upper)
                    .unwrap_or(upper_bounds.len());
                colors[band]
            }
            ColorScale::Continuous => continuous_color(value),
        }
    }
}

/// Purple to orange ramp used for CAPE and unknown fields.
fn continuous_color(normalized: f64) -> Color {
    let t = if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    };
    Color::rgb(
        (128.0 + t * 127.0).floor() as u8,
        (t * 100.0).floor() as u8,
        (128.0 - t * 128.0).floor() as u8,
    )
}

/// Classify a value for a parameter. See [`ColorScale::color`].
pub fn classify(parameter: Parameter, value: f64) -> Color {
    ColorScale::for_parameter(parameter).color(value)
}

/// One row of a legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: Color,
}

/// Legend for the map chrome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: &'static str,
    pub unit: &'static str,
    pub entries: Vec<LegendEntry>,
}

/// Legend rows for a parameter, in the same order as its bands.
pub fn legend(parameter: Parameter) -> Legend {
    let (title, labels, colors): (&'static str, &[&'static str], &[Color]) = match parameter {
        Parameter::Precipitation => (
            "Accumulated Rainfall",
            &["< 1", "2-10", "11-20", "21-50", "51-70", "71-100", "101-120", ">121"],
            &RAINFALL_COLORS,
        ),
        Parameter::TemperatureMax => (
            "Maximum Temperature",
            &["0-15", "16-20", "21-25", "26-30", "31-35", ">36"],
            &TEMP_MAX_COLORS,
        ),
        Parameter::TemperatureMin => (
            "Minimum Temperature",
            &["<5", "6-10", "11-15", "16-20", "21-25", ">26"],
            &TEMP_MIN_COLORS,
        ),
        Parameter::RelativeHumidity => (
            "Relative Humidity",
            &["0-20", "21-40", "41-60", "61-80", "81-100"],
            &HUMIDITY_COLORS,
        ),
        Parameter::ConvectiveEnergy => (
            "CAPE",
            &["0-500", "501-1000", "1001-2000", "2001-3000", "3001-5000", ">5000"],
            &CAPE_LEGEND_COLORS,
        ),
    };

    Legend {
        title,
        unit: parameter.units(),
        entries: labels
            .iter()
            .zip(colors.iter())
            .map(|(label, color)| LegendEntry {
                label,
                color: *color,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_tables_are_consistent() {
        for parameter in Parameter::ALL {
            if let ColorScale::Banded {
                upper_bounds,
                colors,
            } = ColorScale::for_parameter(parameter)
            {
                assert_eq!(colors.len(), upper_bounds.len() + 1, "{}", parameter);
                assert!(upper_bounds.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_legends_match_band_counts() {
        for parameter in Parameter::ALL {
            let legend = legend(parameter);
            if let ColorScale::Banded { colors, .. } = ColorScale::for_parameter(parameter) {
                assert_eq!(legend.entries.len(), colors.len());
            }
        }
    }
}
