use warpgrid_image::{Raster, RasterSize};

use super::{ExecutionBackend, GridConfig, GridParallel, PixelKernel, PixelSource, Sequential};
use crate::error::TransformError;

/// Selects an execution backend at runtime.
#[derive(Debug, Clone)]
pub enum ExecutionStrategy {
    /// Run on the calling thread.
    ///
    /// Useful for small rasters, debugging, or as the reference for the parallel path.
    Sequential(Sequential),

    /// Run on a grid of tiles on a parallel device.
    GridParallel(GridParallel),
}

impl ExecutionStrategy {
    /// Builds a grid-parallel strategy from a configuration.
    pub fn grid(config: GridConfig) -> Result<Self, TransformError> {
        Ok(Self::GridParallel(GridParallel::with_config(config)?))
    }

    /// Short name of the selected backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential(_) => "sequential",
            Self::GridParallel(_) => "grid",
        }
    }
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        Self::Sequential(Sequential)
    }
}

impl From<Sequential> for ExecutionStrategy {
    fn from(backend: Sequential) -> Self {
        Self::Sequential(backend)
    }
}

impl From<GridParallel> for ExecutionStrategy {
    fn from(backend: GridParallel) -> Self {
        Self::GridParallel(backend)
    }
}

impl ExecutionBackend for ExecutionStrategy {
    fn transform<K: PixelKernel>(
        &self,
        src: &Raster,
        kernel: &K,
    ) -> Result<Raster, TransformError> {
        match self {
            Self::Sequential(backend) => backend.transform(src, kernel),
            Self::GridParallel(backend) => backend.transform(src, kernel),
        }
    }

    fn generate<G: PixelSource>(
        &self,
        size: RasterSize,
        source: &G,
    ) -> Result<Raster, TransformError> {
        match self {
            Self::Sequential(backend) => backend.generate(size, source),
            Self::GridParallel(backend) => backend.generate(size, source),
        }
    }
}
