use warpgrid_device::{BlockDim, CpuDevice, DeviceConfig, DeviceError, LaunchConfig};
use warpgrid_image::{Color, Raster, RasterSize, RasterView};

use super::{ExecutionBackend, PixelKernel, PixelSource};
use crate::error::TransformError;

/// Configuration of a [`GridParallel`] backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridConfig {
    /// Tile size of the launch grid. Defaults to 16x16.
    pub block: BlockDim,

    /// Worker pool and memory limit of the device.
    pub device: DeviceConfig,
}

/// Evaluates kernels on a 2-D grid of independent tiles.
///
/// Every call follows the same transfer protocol:
///
/// 1. copy the input pixels and the kernel parameters to the device
/// 2. launch the grid and wait for it
/// 3. copy the output back into a host raster
/// 4. release the device copies
///
/// Step 4 happens when the device buffers go out of scope, so it also runs when
/// any earlier step fails.
#[derive(Debug, Clone)]
pub struct GridParallel {
    device: CpuDevice,
    block: BlockDim,
}

impl GridParallel {
    /// Creates a backend on the global thread pool with 16x16 tiles.
    pub fn new() -> Self {
        Self::with_device(CpuDevice::new(), BlockDim::default())
    }

    /// Creates a backend from a configuration.
    ///
    /// # Errors
    ///
    /// Fails if the block size is empty or the device cannot be created.
    pub fn with_config(config: GridConfig) -> Result<Self, TransformError> {
        if config.block.x == 0 || config.block.y == 0 {
            return Err(DeviceError::InvalidBlockDim {
                x: config.block.x,
                y: config.block.y,
            }
            .into());
        }
        let device = CpuDevice::with_config(config.device)?;
        Ok(Self::with_device(device, config.block))
    }

    /// Creates a backend on an existing device.
    pub fn with_device(device: CpuDevice, block: BlockDim) -> Self {
        Self { device, block }
    }

    /// The device the grid runs on.
    pub fn device(&self) -> &CpuDevice {
        &self.device
    }

    /// The tile size of the grid.
    pub fn block(&self) -> BlockDim {
        self.block
    }
}

impl Default for GridParallel {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionBackend for GridParallel {
    fn transform<K: PixelKernel>(
        &self,
        src: &Raster,
        kernel: &K,
    ) -> Result<Raster, TransformError> {
        let dst_size = kernel.output_size(src.size());
        dst_size.validate()?;
        let config = LaunchConfig::for_extent(dst_size.width, dst_size.height, self.block)?;

        // host -> device
        let d_src = self.device.upload(src.as_slice())?;
        let d_kernel = self.device.upload_value(kernel)?;
        let mut d_dst = self.device.alloc::<Color>(dst_size.num_pixels())?;

        let src_view = RasterView::new(src.size(), d_src.as_slice())?;
        let params = &d_kernel.as_slice()[0];

        let mut stream = self.device.stream();
        stream.launch(&config, &mut d_dst, |x, y| params.pixel(src_view, x, y))?;
        stream.synchronize()?;

        // device -> host
        Ok(Raster::new(dst_size, d_dst.copy_to_host()?)?)
    }

    fn generate<G: PixelSource>(
        &self,
        size: RasterSize,
        source: &G,
    ) -> Result<Raster, TransformError> {
        size.validate()?;
        let config = LaunchConfig::for_extent(size.width, size.height, self.block)?;

        let d_source = self.device.upload_value(source)?;
        let mut d_dst = self.device.alloc::<Color>(size.num_pixels())?;
        let params = &d_source.as_slice()[0];

        let mut stream = self.device.stream();
        stream.launch(&config, &mut d_dst, |x, y| params.pixel(size, x, y))?;
        stream.synchronize()?;

        Ok(Raster::new(size, d_dst.copy_to_host()?)?)
    }
}
