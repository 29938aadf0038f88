#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// execution backends driving per-pixel kernels.
pub mod backend;

/// Error types for the transform module.
pub mod error;

/// target to source coordinate mappings.
pub mod mapping;

/// per-pixel random raster generation.
pub mod random;

/// utility functions for resizing rasters.
pub mod resize;

/// source pixel sampling policies.
pub mod sampler;

/// perspective warp module.
pub mod warp;

pub use crate::error::TransformError;
