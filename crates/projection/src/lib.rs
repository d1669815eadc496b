//! Geographic to pixel transformations.
//!
//! - [`resolve`]: picks the lon/lat rectangle to draw for a domain
//! - [`linear`]: maps lon/lat into pixel space for a given viewport

pub mod linear;
pub mod resolve;

pub use linear::PixelProjection;
pub use resolve::{resolve_bounds, union_extent, BOUNDS_PADDING};
