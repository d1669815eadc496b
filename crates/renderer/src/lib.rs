//! Raster rendering for forecast maps.
//!
//! Implements the layers of a map frame:
//! - Boundary polygons (fill and stroke)
//! - Clip regions built from boundary polygons
//! - Heat fields composited from scattered forecast points
//! - Coordinate tick labels
//! - PNG encoding of finished frames

pub mod boundary;
pub mod canvas;
pub mod clip;
pub mod heatfield;
pub mod labels;
pub mod palette;
pub mod png;
pub mod style;

pub use boundary::draw_layer;
pub use canvas::Canvas;
pub use clip::ClipRegion;
pub use heatfield::{composite_heat_field, HeatFieldConfig, HeatFieldSummary, ValueRange};
pub use labels::{draw_coordinate_labels, LabelConfig, MIN_TICK_STEP};
pub use png::encode_png;
pub use palette::{classify, legend, ColorScale, Legend, LegendEntry};
pub use style::{Color, LayerStyle};
