//! Common geometry fixtures.

use forecast_common::{BoundaryGeometry, BoundaryLayer, Ring};

/// Territory names loaded for the multi-territory domain, in load order.
pub const EAST_AFRICA_TERRITORIES: [&str; 7] = [
    "gadm36_TZA_0",
    "gadm36_UGA_0",
    "gadm36_RWA_0",
    "gadm36_BDI_0",
    "gadm36_SOM_0",
    "gadm36_ETH_0",
    "gadm36_SSD_0",
];

/// A closed axis-aligned rectangle ring, counter-clockwise.
pub fn rect_ring(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Ring {
    Ring(vec![
        [min_lon, min_lat],
        [max_lon, min_lat],
        [max_lon, max_lat],
        [min_lon, max_lat],
        [min_lon, min_lat],
    ])
}

/// A layer holding one rectangular polygon.
pub fn rect_layer(name: &str, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> BoundaryLayer {
    BoundaryLayer::new(
        name,
        vec![BoundaryGeometry::Polygon(vec![rect_ring(
            min_lon, min_lat, max_lon, max_lat,
        )])],
    )
}

/// GeoJSON FeatureCollection text holding one rectangular polygon.
pub fn rect_geojson(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> String {
    let ring = rect_ring(min_lon, min_lat, max_lon, max_lat);
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Polygon", "coordinates": [ring.0] }
        }]
    })
    .to_string()
}
