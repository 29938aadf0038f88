//! Projective warps with a nearest (truncated) source lookup.
//!
//! Output pixels whose source coordinate falls outside the input, or whose mapping
//! is degenerate, are set to [`warpgrid_image::Color::BLACK`].

use warpgrid_image::{Raster, RasterSize};

use crate::{
    backend::{ExecutionBackend, MapSample},
    error::TransformError,
    mapping::PerspectiveMap,
    sampler::PointSampler,
};

/// Applies a perspective transformation to a raster.
///
/// * `src` - The input raster.
/// * `m` - The row-major 3x3 matrix mapping output pixels to source pixels.
/// * `backend` - The backend that evaluates every output pixel.
///
/// # Returns
///
/// A new raster with the size of `src`.
///
/// # Example
///
/// ```
/// use warpgrid_image::{Color, Raster, RasterSize};
/// use warpgrid_imgproc::backend::GridParallel;
/// use warpgrid_imgproc::warp::warp_perspective;
///
/// let src = Raster::from_fn(RasterSize::new(4, 4).unwrap(), |x, y| {
///     Color::new((4 * y + x) as u8, 0, 0)
/// })
/// .unwrap();
///
/// // shift left by 1 pixel
/// let m = [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
/// let out = warp_perspective(&src, &m, &GridParallel::new()).unwrap();
///
/// assert_eq!(out.get(0, 0), Some(&Color::new(1, 0, 0)));
/// assert_eq!(out.get(3, 0), Some(&Color::BLACK));
/// ```
pub fn warp_perspective<B: ExecutionBackend>(
    src: &Raster,
    m: &[f64; 9],
    backend: &B,
) -> Result<Raster, TransformError> {
    warp_perspective_to(src, PerspectiveMap::new(*m), src.size(), backend)
}

/// Applies a perspective mapping, producing a raster of `dst_size`.
pub fn warp_perspective_to<B: ExecutionBackend>(
    src: &Raster,
    map: PerspectiveMap,
    dst_size: RasterSize,
    backend: &B,
) -> Result<Raster, TransformError> {
    dst_size.validate()?;
    log::debug!(
        "warp_perspective {}x{} -> {}x{} m={:?}",
        src.width(),
        src.height(),
        dst_size.width,
        dst_size.height,
        map.matrix()
    );

    let kernel = MapSample::new(map, PointSampler, dst_size);
    backend.transform(src, &kernel)
}
