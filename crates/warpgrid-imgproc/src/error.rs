use thiserror::Error;

use warpgrid_device::DeviceError;
use warpgrid_image::RasterError;

/// An error type for raster transforms.
///
/// Per-pixel conditions such as out-of-bounds or degenerate mappings are not
/// errors: they resolve to the black sentinel color.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// Invalid raster dimension or pixel count.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// Device allocation or kernel launch failure.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The perspective matrix has no inverse.
    #[error("cannot invert a singular perspective matrix (determinant {0})")]
    SingularMatrix(f64),
}
