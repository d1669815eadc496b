//! Boundary layers drawn for each domain, with their styles and draw order.

use forecast_common::Domain;
use renderer::{Color, LayerStyle};

/// Canvas background.
pub const BACKGROUND: Color = Color::rgb(0xe8, 0xf4, 0xf8);

/// Colour of national and territory outlines.
pub const OUTLINE: Color = Color::rgb(0x02, 0x06, 0x17);

const WATER_STROKE: Color = Color::rgb(0x0e, 0xa5, 0xe9);

/// Territories of the multi-territory domain, in load order.
pub const EAST_AFRICA_TERRITORIES: [&str; 7] = [
    "gadm36_TZA_0",
    "gadm36_UGA_0",
    "gadm36_RWA_0",
    "gadm36_BDI_0",
    "gadm36_SOM_0",
    "gadm36_ETH_0",
    "gadm36_SSD_0",
];

/// What a layer is used for in a render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    /// Drawn under the field.
    Base,
    /// Confines the field and is stroked again on top of it.
    Clip,
}

/// One boundary resource and how to draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub group: &'static str,
    pub name: &'static str,
    pub role: LayerRole,
    /// Style for the pass under the field. `None` means the layer is not
    /// drawn before the field.
    pub base_style: Option<LayerStyle>,
    /// Style for the pass on top of the field.
    pub overlay_style: Option<LayerStyle>,
}

/// Layers for `domain`, in the order they are fetched and drawn.
pub fn layers_for(domain: Domain) -> Vec<LayerSpec> {
    match domain {
        Domain::Kenya => kenya_layers(),
        Domain::EastAfrica => east_africa_layers(),
    }
}

fn kenya_layers() -> Vec<LayerSpec> {
    vec![
        LayerSpec {
            group: "kenya",
            name: "kenya_ocean",
            role: LayerRole::Base,
            base_style: Some(LayerStyle::filled(
                Color::rgb(0xcf, 0xe9, 0xf6),
                WATER_STROKE,
                1.0,
            )),
            overlay_style: None,
        },
        LayerSpec {
            group: "kenya",
            name: "kenya_lakes",
            role: LayerRole::Base,
            base_style: Some(LayerStyle::filled(
                Color::rgb(0xba, 0xe6, 0xfd),
                WATER_STROKE,
                0.5,
            )),
            overlay_style: None,
        },
        LayerSpec {
            group: "kenya",
            name: "kenya_counties",
            role: LayerRole::Base,
            base_style: Some(LayerStyle::stroke(Color::rgb(0x64, 0x74, 0x8b), 1.0)),
            overlay_style: None,
        },
        LayerSpec {
            group: "kenya",
            name: "kenya_boundary",
            role: LayerRole::Clip,
            base_style: None,
            overlay_style: Some(LayerStyle::stroke(OUTLINE, 2.5)),
        },
    ]
}

fn east_africa_layers() -> Vec<LayerSpec> {
    let territory = LayerStyle::filled(BACKGROUND, OUTLINE, 1.5);
    let overlay = Some(LayerStyle::stroke(OUTLINE, 1.5));

    std::iter::once(LayerSpec {
        group: "kenya",
        name: "kenya_boundary",
        role: LayerRole::Clip,
        base_style: Some(territory),
        overlay_style: overlay,
    })
    .chain(EAST_AFRICA_TERRITORIES.iter().map(|name| LayerSpec {
        group: "east_africa",
        name,
        role: LayerRole::Clip,
        base_style: Some(territory),
        overlay_style: overlay,
    }))
    .collect()
}
