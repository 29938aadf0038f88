#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// pixel color type.
pub mod color;

/// Error types for the raster module.
pub mod error;

/// raster representation in row-major order.
pub mod raster;

pub use crate::color::Color;
pub use crate::error::RasterError;
pub use crate::raster::{Raster, RasterSize, RasterView};
