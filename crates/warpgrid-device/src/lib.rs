#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! The device mirrors the host/device split of a GPU runtime on top of a rayon
//! thread pool:
//!
//! - **CpuDevice**: owns the worker pool and the bookkeeping for device memory
//! - **DeviceBuffer**: device-resident memory, released when dropped
//! - **Stream**: queues 2-D grid launches and runs them on `synchronize`
//!
//! ```rust
//! use warpgrid_device::{BlockDim, CpuDevice, LaunchConfig};
//!
//! let device = CpuDevice::new();
//! let mut out = device.alloc::<u32>(6).unwrap();
//! let config = LaunchConfig::for_extent(3, 2, BlockDim::new(2, 2)).unwrap();
//!
//! let mut stream = device.stream();
//! stream.launch(&config, &mut out, |x, y| (y * 3 + x) as u32).unwrap();
//! stream.synchronize().unwrap();
//!
//! assert_eq!(out.copy_to_host().unwrap(), vec![0, 1, 2, 3, 4, 5]);
//! ```

/// device-resident buffers.
pub mod buffer;

/// compute device and memory bookkeeping.
pub mod device;

/// Error types for the device module.
pub mod error;

/// grid geometry and kernel launches.
pub mod launch;

pub use crate::buffer::DeviceBuffer;
pub use crate::device::{CpuDevice, DeviceConfig};
pub use crate::error::DeviceError;
pub use crate::launch::{BlockDim, GridDim, LaunchConfig, Stream};
