//! Boundary geometry: polygons and multipolygons of lon/lat rings.
//!
//! GeoJSON documents arrive in several shapes (feature collections, single
//! features, bare geometries, geometry collections). They are flattened here
//! into a list of [`BoundaryGeometry`] values so renderers only ever deal with
//! the two polygonal variants.

use geojson::{GeoJson, Geometry, Value};
use tracing::debug;

use crate::error::{ForecastError, ForecastResult};

/// `[lon, lat]` in degrees. Malformed positions are carried as NaN so that
/// consumers can skip them like any other non-finite coordinate.
pub type LonLat = [f64; 2];

/// A closed sequence of vertices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring(pub Vec<LonLat>);

impl Ring {
    pub fn points(&self) -> &[LonLat] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Vertices with both coordinates finite.
    pub fn finite_points(&self) -> impl Iterator<Item = &LonLat> {
        self.0.iter().filter(|p| p[0].is_finite() && p[1].is_finite())
    }
}

impl From<Vec<LonLat>> for Ring {
    fn from(points: Vec<LonLat>) -> Self {
        Ring(points)
    }
}

/// A polygonal geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    /// Exterior ring followed by holes.
    Polygon(Vec<Ring>),
    /// One ring list per member polygon.
    MultiPolygon(Vec<Vec<Ring>>),
}

impl BoundaryGeometry {
    /// Every ring of the geometry, in document order.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            BoundaryGeometry::Polygon(rings) => Box::new(rings.iter()),
            BoundaryGeometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten()),
        }
    }
}

/// A named set of boundary geometries loaded from one resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryLayer {
    pub name: String,
    pub geometries: Vec<BoundaryGeometry>,
}

impl BoundaryLayer {
    pub fn new(name: impl Into<String>, geometries: Vec<BoundaryGeometry>) -> Self {
        Self {
            name: name.into(),
            geometries,
        }
    }

    /// Parse a GeoJSON document.
    pub fn from_geojson_str(name: impl Into<String>, text: &str) -> ForecastResult<Self> {
        let name = name.into();
        let geojson: GeoJson = text
            .parse()
            .map_err(|e| ForecastError::Geometry(format!("{}: {}", name, e)))?;
        Ok(Self::from_geojson(name, geojson))
    }

    pub fn from_geojson(name: impl Into<String>, geojson: GeoJson) -> Self {
        let name = name.into();
        let mut geometries = Vec::new();
        match geojson {
            GeoJson::FeatureCollection(collection) => {
                for feature in collection.features {
                    if let Some(geometry) = feature.geometry {
                        collect_geometry(&name, geometry, &mut geometries);
                    }
                }
            }
            GeoJson::Feature(feature) => {
                if let Some(geometry) = feature.geometry {
                    collect_geometry(&name, geometry, &mut geometries);
                }
            }
            GeoJson::Geometry(geometry) => collect_geometry(&name, geometry, &mut geometries),
        }
        Self { name, geometries }
    }

    /// Every ring of every geometry in the layer.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.geometries.iter().flat_map(|g| g.rings())
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}

fn collect_geometry(layer: &str, geometry: Geometry, out: &mut Vec<BoundaryGeometry>) {
    match geometry.value {
        Value::Polygon(polygon) => out.push(BoundaryGeometry::Polygon(convert_polygon(polygon))),
        Value::MultiPolygon(polygons) => out.push(BoundaryGeometry::MultiPolygon(
            polygons.into_iter().map(convert_polygon).collect(),
        )),
        Value::GeometryCollection(members) => {
            for member in members {
                collect_geometry(layer, member, out);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) | Value::LineString(_) | Value::MultiLineString(_) => {
            debug!(layer = layer, "Skipping non-polygonal geometry");
        }
    }
}

fn convert_polygon(rings: Vec<Vec<Vec<f64>>>) -> Vec<Ring> {
    rings
        .into_iter()
        .map(|ring| Ring(ring.iter().map(|p| convert_position(p)).collect()))
        .collect()
}

fn convert_position(position: &[f64]) -> LonLat {
    match position {
        [lon, lat, ..] => [*lon, *lat],
        _ => [f64::NAN, f64::NAN],
    }
}
