//! Tests for per-parameter colour classification and legends.

use forecast_common::Parameter;
use renderer::{classify, legend, Color, ColorScale};

// ============================================================================
// Precipitation bands
// ============================================================================

#[test]
fn test_light_rain_is_no_rain_band() {
    assert_eq!(classify(Parameter::Precipitation, 0.5), Color::rgb(255, 255, 255));
    assert_eq!(classify(Parameter::Precipitation, 0.0), Color::rgb(255, 255, 255));
}

#[test]
fn test_fifteen_mm_is_eleven_to_twenty() {
    let color = classify(Parameter::Precipitation, 15.0);
    assert_eq!(color, Color::rgb(85, 255, 0));

    let legend = legend(Parameter::Precipitation);
    let entry = legend.entries.iter().find(|e| e.color == color).unwrap();
    assert_eq!(entry.label, "11-20");
}

#[test]
fn test_upper_bounds_are_inclusive() {
    assert_eq!(classify(Parameter::Precipitation, 10.0), Color::rgb(211, 255, 190));
    assert_eq!(classify(Parameter::Precipitation, 10.0001), Color::rgb(85, 255, 0));
    assert_eq!(classify(Parameter::Precipitation, 120.0), Color::rgb(255, 0, 0));
    assert_eq!(classify(Parameter::Precipitation, 500.0), Color::rgb(255, 0, 230));
}

// ============================================================================
// Other banded parameters
// ============================================================================

#[test]
fn test_temperature_bands() {
    assert_eq!(classify(Parameter::TemperatureMax, 12.0), Color::rgb(0, 230, 0));
    assert_eq!(classify(Parameter::TemperatureMax, 33.0), Color::rgb(255, 90, 0));
    assert_eq!(classify(Parameter::TemperatureMax, 40.0), Color::rgb(192, 0, 0));

    assert_eq!(classify(Parameter::TemperatureMin, -3.0), Color::rgb(0, 0, 107));
    assert_eq!(classify(Parameter::TemperatureMin, 18.0), Color::rgb(112, 168, 0));
}

#[test]
fn test_humidity_bands() {
    assert_eq!(classify(Parameter::RelativeHumidity, 20.0), Color::rgb(139, 69, 19));
    assert_eq!(classify(Parameter::RelativeHumidity, 95.0), Color::rgb(0, 206, 209));
}

#[test]
fn test_banded_classification_is_total() {
    for parameter in Parameter::ALL {
        for value in [f64::NAN, f64::NEG_INFINITY, -1e9, 0.0, 1e9, f64::INFINITY] {
            let color = classify(parameter, value);
            assert_eq!(color.a, 255, "{} {}", parameter, value);
        }
    }
    assert_eq!(classify(Parameter::Precipitation, f64::NAN), Color::rgb(255, 255, 255));
}

// ============================================================================
// Continuous scale
// ============================================================================

#[test]
fn test_cape_ramp_endpoints() {
    assert!(ColorScale::for_parameter(Parameter::ConvectiveEnergy).is_continuous());
    assert_eq!(classify(Parameter::ConvectiveEnergy, 0.0), Color::rgb(128, 0, 128));
    assert_eq!(classify(Parameter::ConvectiveEnergy, 1.0), Color::rgb(255, 100, 0));
    assert_eq!(classify(Parameter::ConvectiveEnergy, 0.5), Color::rgb(191, 50, 64));
}

#[test]
fn test_cape_ramp_clamps() {
    assert_eq!(
        classify(Parameter::ConvectiveEnergy, -4.0),
        classify(Parameter::ConvectiveEnergy, 0.0)
    );
    assert_eq!(
        classify(Parameter::ConvectiveEnergy, 7.0),
        classify(Parameter::ConvectiveEnergy, 1.0)
    );
}

// ============================================================================
// Legends
// ============================================================================

#[test]
fn test_legend_metadata() {
    let rain = legend(Parameter::Precipitation);
    assert_eq!(rain.unit, "mm");
    assert_eq!(rain.entries.first().unwrap().label, "< 1");
    assert_eq!(rain.entries.last().unwrap().label, ">121");

    let cape = legend(Parameter::ConvectiveEnergy);
    assert_eq!(cape.entries.len(), 6);
    assert_eq!(cape.entries[5].color, Color::rgb(0xcc, 0, 0));
}

#[test]
fn test_legend_serializes_hex_colours() {
    let json = serde_json::to_value(legend(Parameter::RelativeHumidity)).unwrap();
    assert_eq!(json["entries"][0]["color"], "#8b4513");
    assert_eq!(json["entries"][0]["label"], "0-20");
}
