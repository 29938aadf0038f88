/// An error type for the raster module.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RasterError {
    /// Error when width or height is zero.
    #[error("Invalid raster dimension {width}x{height}, both sides must be > 0")]
    InvalidDimension {
        /// requested width in pixels
        width: usize,
        /// requested height in pixels
        height: usize,
    },

    /// Error when the pixel count does not match the raster size.
    #[error("Data length ({0}) does not match the raster size ({1})")]
    InvalidPixelCount(usize, usize),

    /// Error when the pixel data of a size cannot be addressed.
    #[error("Raster dimension {width}x{height} overflows the addressable pixel count")]
    SizeOverflow {
        /// requested width in pixels
        width: usize,
        /// requested height in pixels
        height: usize,
    },

    /// Error when the pixel storage cannot be allocated.
    #[error("Failed to allocate {bytes} bytes of pixel storage")]
    AllocationFailed {
        /// requested size in bytes
        bytes: usize,
    },
}
