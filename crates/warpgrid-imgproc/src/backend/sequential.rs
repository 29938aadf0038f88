use warpgrid_image::{Raster, RasterSize};

use super::{ExecutionBackend, PixelKernel, PixelSource};
use crate::error::TransformError;

/// Evaluates kernels on the calling thread, rows then columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequential;

impl ExecutionBackend for Sequential {
    fn transform<K: PixelKernel>(
        &self,
        src: &Raster,
        kernel: &K,
    ) -> Result<Raster, TransformError> {
        let dst_size = kernel.output_size(src.size());
        let view = src.view();
        Ok(Raster::from_fn(dst_size, |x, y| kernel.pixel(view, x, y))?)
    }

    fn generate<G: PixelSource>(
        &self,
        size: RasterSize,
        source: &G,
    ) -> Result<Raster, TransformError> {
        Ok(Raster::from_fn(size, |x, y| source.pixel(size, x, y))?)
    }
}
