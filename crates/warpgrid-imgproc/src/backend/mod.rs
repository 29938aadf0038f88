//! Execution backends that evaluate a per-pixel kernel over a whole raster.
//!
//! What to compute per pixel lives in a [`PixelKernel`] (or a [`PixelSource`] when
//! there is no input raster). How the work is distributed lives in an
//! [`ExecutionBackend`]:
//!
//! - [`Sequential`]: row by row on the calling thread
//! - [`GridParallel`]: a 2-D grid of tiles on a [`warpgrid_device::CpuDevice`]
//!
//! Both backends evaluate the same kernel values, so for the same input they
//! produce identical rasters.
//!
//! # Examples
//!
//! ```
//! use warpgrid_image::{Color, Raster, RasterSize};
//! use warpgrid_imgproc::backend::{ExecutionBackend, GridParallel, MapSample, Sequential};
//! use warpgrid_imgproc::mapping::PerspectiveMap;
//! use warpgrid_imgproc::sampler::PointSampler;
//!
//! let src = Raster::from_fn(RasterSize::new(8, 8).unwrap(), |x, y| {
//!     Color::new(x as u8, y as u8, 0)
//! })
//! .unwrap();
//! let kernel = MapSample::new(PerspectiveMap::identity(), PointSampler, src.size());
//!
//! let a = Sequential.transform(&src, &kernel).unwrap();
//! let b = GridParallel::new().transform(&src, &kernel).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a, src);
//! ```

mod grid;
mod sequential;
mod strategy;

pub use grid::{GridConfig, GridParallel};
pub use sequential::Sequential;
pub use strategy::ExecutionStrategy;

use warpgrid_image::{Color, Raster, RasterSize, RasterView};

use crate::{error::TransformError, mapping::CoordinateMap, sampler::Sampler};

/// Computes one output pixel from a read-only input raster.
///
/// Implementations are plain parameters: they are copied to the device and
/// shared by every worker, so they must not hold mutable state.
pub trait PixelKernel: Clone + Send + Sync {
    /// The output size for an input of size `src`.
    fn output_size(&self, src: RasterSize) -> RasterSize;

    /// The output color at `(x, y)`.
    fn pixel(&self, src: RasterView<'_>, x: usize, y: usize) -> Color;
}

/// Computes one pixel of a raster that has no input.
pub trait PixelSource: Clone + Send + Sync {
    /// The color at `(x, y)` of a raster of `size`.
    fn pixel(&self, size: RasterSize, x: usize, y: usize) -> Color;
}

/// A kernel that maps each output pixel to a source coordinate and samples there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSample<M, S> {
    map: M,
    sampler: S,
    dst_size: RasterSize,
}

impl<M: CoordinateMap, S: Sampler> MapSample<M, S> {
    /// Create a kernel producing a `dst_size` raster.
    pub fn new(map: M, sampler: S, dst_size: RasterSize) -> Self {
        Self {
            map,
            sampler,
            dst_size,
        }
    }
}

impl<M: CoordinateMap, S: Sampler> PixelKernel for MapSample<M, S> {
    fn output_size(&self, _src: RasterSize) -> RasterSize {
        self.dst_size
    }

    #[inline]
    fn pixel(&self, src: RasterView<'_>, x: usize, y: usize) -> Color {
        self.sampler.sample(src, self.map.map(x, y))
    }
}

/// Drives a kernel over every pixel of a freshly allocated output raster.
pub trait ExecutionBackend {
    /// Applies `kernel` to `src`, returning a new raster.
    ///
    /// # Errors
    ///
    /// Fails on an empty output size, or if the backend cannot allocate or run the
    /// kernel. No partial output is returned.
    fn transform<K: PixelKernel>(&self, src: &Raster, kernel: &K)
        -> Result<Raster, TransformError>;

    /// Evaluates `source` at every pixel of a `size` raster.
    fn generate<G: PixelSource>(
        &self,
        size: RasterSize,
        source: &G,
    ) -> Result<Raster, TransformError>;
}
