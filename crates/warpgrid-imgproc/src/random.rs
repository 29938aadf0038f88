//! Rasters of pseudo-random colors with one independent stream per pixel.
//!
//! The color of a pixel depends only on the seed and the pixel's linear index, so
//! the raster is the same whatever the backend or the order workers run in.

use rand::{rngs::StdRng, Rng, SeedableRng};

use warpgrid_image::{Color, Raster, RasterSize};

use crate::{
    backend::{ExecutionBackend, PixelSource},
    error::TransformError,
};

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed of the stream for pixel `index` under `seed`.
///
/// Distinct indices give distinct stream seeds for a fixed `seed`.
pub fn pixel_seed(seed: u64, index: u64) -> u64 {
    mix64(seed ^ index.wrapping_mul(GOLDEN_GAMMA))
}

/// Generates uniformly distributed colors from a single seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomRaster {
    seed: u64,
}

impl RandomRaster {
    /// Create a generator for `seed`.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// The global seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The color of the pixel at linear index `index`.
    pub fn color_at(&self, index: u64) -> Color {
        let mut rng = StdRng::seed_from_u64(pixel_seed(self.seed, index));
        Color::new(rng.random(), rng.random(), rng.random())
    }
}

impl PixelSource for RandomRaster {
    #[inline]
    fn pixel(&self, size: RasterSize, x: usize, y: usize) -> Color {
        self.color_at(size.index(x, y) as u64)
    }
}

/// Create a raster of random colors.
///
/// # Arguments
///
/// * `size` - The size of the raster.
/// * `seed` - The global seed. The same seed always yields the same raster.
/// * `backend` - The backend that evaluates every pixel.
///
/// # Example
///
/// ```
/// use warpgrid_image::RasterSize;
/// use warpgrid_imgproc::backend::{GridParallel, Sequential};
/// use warpgrid_imgproc::random::random_raster;
///
/// let size = RasterSize::new(64, 48).unwrap();
/// let a = random_raster(size, 42, &Sequential).unwrap();
/// let b = random_raster(size, 42, &GridParallel::new()).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn random_raster<B: ExecutionBackend>(
    size: RasterSize,
    seed: u64,
    backend: &B,
) -> Result<Raster, TransformError> {
    size.validate()?;
    let source = RandomRaster::new(seed);
    log::debug!(
        "random raster {}x{} seed={}",
        size.width,
        size.height,
        source.seed()
    );
    backend.generate(size, &source)
}
