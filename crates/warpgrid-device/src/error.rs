use thiserror::Error;

/// An error type for device operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// Device memory could not be reserved.
    #[error("failed to allocate {bytes} bytes of device memory")]
    AllocationFailed {
        /// number of bytes requested
        bytes: usize,
    },

    /// A block dimension was zero.
    #[error("block dimensions must be > 0, got {x}x{y}")]
    InvalidBlockDim {
        /// block width
        x: usize,
        /// block height
        y: usize,
    },

    /// Source and destination buffers have different lengths.
    #[error("buffer length mismatch: got {0}, expected {1}")]
    BufferSizeMismatch(usize, usize),

    /// The worker thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    ThreadPoolBuild(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// A launched kernel did not complete.
    #[error("kernel launch failed: {0}")]
    LaunchFailed(String),
}
