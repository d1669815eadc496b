//! Forecast samples and the field payload returned by the data service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::{Domain, Parameter};
use crate::error::{ForecastError, ForecastResult};
use crate::time::TimeStep;

/// One scattered sample of a scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
    pub value: f64,
    /// Colour precomputed by the data service (`#rrggbb` or `rgb(r, g, b)`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ForecastPoint {
    pub fn new(lat: f64, lon: f64, value: f64) -> Self {
        Self {
            lat,
            lon,
            value,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    #[serde(default)]
    pub total_points: Option<usize>,
}

/// Response body of a field data request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPayload {
    pub points: Vec<ForecastPoint>,
    #[serde(default)]
    pub metadata: Option<FieldMetadata>,
}

impl FieldPayload {
    /// Validate and decode a raw JSON body.
    ///
    /// A missing or non-array `points` member is rejected before the
    /// individual points are decoded, so the error names the actual problem.
    pub fn from_value(value: Value) -> ForecastResult<Self> {
        match value.get("points") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ForecastError::InvalidPayload(
                    "'points' is not an array".to_string(),
                ))
            }
            None => {
                return Err(ForecastError::InvalidPayload(
                    "response has no 'points' member".to_string(),
                ))
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_slice(body: &[u8]) -> ForecastResult<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// Point count as reported by the service, falling back to the array length.
    pub fn total_points(&self) -> usize {
        self.metadata
            .as_ref()
            .and_then(|m| m.total_points)
            .unwrap_or(self.points.len())
    }
}

/// Cache namespace for one field: (domain, parameter, time step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub domain: Domain,
    pub parameter: Parameter,
    pub time_step: TimeStep,
}

impl CacheKey {
    pub fn new(domain: Domain, parameter: Parameter, time_step: TimeStep) -> Self {
        Self {
            domain,
            parameter,
            time_step,
        }
    }

    /// Same domain and parameter at a different step.
    pub fn with_step(&self, time_step: TimeStep) -> Self {
        Self { time_step, ..*self }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.domain, self.parameter, self.time_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_decodes_points_and_metadata() {
        let body = json!({
            "points": [
                { "lat": -1.28, "lon": 36.82, "value": 12.5 },
                { "lat": 0.5, "lon": 35.0, "value": 0.0, "color": "#ffffff" }
            ],
            "metadata": { "total_points": 2 }
        });
        let payload = FieldPayload::from_value(body).unwrap();
        assert_eq!(payload.points.len(), 2);
        assert_eq!(payload.points[1].color.as_deref(), Some("#ffffff"));
        assert_eq!(payload.total_points(), 2);
    }

    #[test]
    fn test_payload_rejects_missing_points() {
        let err = FieldPayload::from_value(json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidPayload(_)));
    }

    #[test]
    fn test_payload_rejects_non_array_points() {
        let err = FieldPayload::from_value(json!({ "points": "nope" })).unwrap_err();
        assert!(err.to_string().contains("not an array"));
    }

    #[test]
    fn test_cache_key_display() {
        let key = CacheKey::new(
            Domain::EastAfrica,
            Parameter::Precipitation,
            TimeStep::new(7).unwrap(),
        );
        assert_eq!(key.to_string(), "east-africa-rainfall-7");
        assert_eq!(key.with_step(TimeStep::ZERO).time_step, TimeStep::ZERO);
    }
}
