//! Rendering domains and forecast parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bounds::Bounds;
use crate::error::ForecastError;

/// A named geographic rendering region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Single country at 3km, fixed bounds.
    Kenya,
    /// Multi-territory region at 9km, bounds computed from territory outlines.
    EastAfrica,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Kenya, Domain::EastAfrica];

    /// Identifier used by the field data service.
    pub fn slug(&self) -> &'static str {
        match self {
            Domain::Kenya => "kenya",
            Domain::EastAfrica => "east-africa",
        }
    }

    /// Label shown in the domain badge.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Kenya => "Kenya (3km)",
            Domain::EastAfrica => "East Africa (9km)",
        }
    }

    /// Model grid spacing in kilometres.
    pub fn resolution_km(&self) -> u32 {
        match self {
            Domain::Kenya => 3,
            Domain::EastAfrica => 9,
        }
    }

    /// Hard-coded bounds for fixed domains, `None` when computed from geometry.
    pub fn fixed_bounds(&self) -> Option<Bounds> {
        match self {
            Domain::Kenya => Some(Bounds::new(33.0, 44.0, -5.2, 5.5)),
            Domain::EastAfrica => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Domain {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kenya" => Ok(Domain::Kenya),
            "east-africa" | "east_africa" | "eastafrica" => Ok(Domain::EastAfrica),
            other => Err(ForecastError::Config(format!("unknown domain '{}'", other))),
        }
    }
}

/// A forecast field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "rainfall")]
    Precipitation,
    #[serde(rename = "temp-max")]
    TemperatureMax,
    #[serde(rename = "temp-min")]
    TemperatureMin,
    #[serde(rename = "rh")]
    RelativeHumidity,
    #[serde(rename = "cape")]
    ConvectiveEnergy,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::Precipitation,
        Parameter::TemperatureMax,
        Parameter::TemperatureMin,
        Parameter::RelativeHumidity,
        Parameter::ConvectiveEnergy,
    ];

    /// Identifier used by the field data service.
    pub fn slug(&self) -> &'static str {
        match self {
            Parameter::Precipitation => "rainfall",
            Parameter::TemperatureMax => "temp-max",
            Parameter::TemperatureMin => "temp-min",
            Parameter::RelativeHumidity => "rh",
            Parameter::ConvectiveEnergy => "cape",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Parameter::Precipitation => "mm",
            Parameter::TemperatureMax | Parameter::TemperatureMin => "°C",
            Parameter::RelativeHumidity => "%",
            Parameter::ConvectiveEnergy => "J/kg",
        }
    }

    /// Label with units, e.g. "Accumulated Rainfall (mm)".
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Precipitation => "Accumulated Rainfall (mm)",
            Parameter::TemperatureMax => "Maximum Temperature (°C)",
            Parameter::TemperatureMin => "Minimum Temperature (°C)",
            Parameter::RelativeHumidity => "Relative Humidity (%)",
            Parameter::ConvectiveEnergy => "CAPE (J/kg)",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Parameter {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rainfall" | "precipitation" => Ok(Parameter::Precipitation),
            "temp-max" | "tmax" => Ok(Parameter::TemperatureMax),
            "temp-min" | "tmin" => Ok(Parameter::TemperatureMin),
            "rh" | "humidity" => Ok(Parameter::RelativeHumidity),
            "cape" => Ok(Parameter::ConvectiveEnergy),
            other => Err(ForecastError::Config(format!("unknown parameter '{}'", other))),
        }
    }
}
