use warpgrid_image::{Raster, RasterSize};

use crate::{
    backend::{ExecutionBackend, MapSample},
    error::TransformError,
    mapping::ResizeMap,
    sampler::BoxSampler,
};

/// Resize a raster to a new size.
///
/// Each output pixel `(x, y)` maps to the source pixel
/// `(trunc(x / new_width * width), trunc(y / new_height * height))` and takes the
/// 3x3 box average around it.
///
/// # Arguments
///
/// * `src` - The input raster.
/// * `new_size` - The size of the output raster.
/// * `sampler` - The box filter and its normalization policy.
/// * `backend` - The backend that evaluates every output pixel.
///
/// # Returns
///
/// A new raster of `new_size`.
///
/// # Example
///
/// ```
/// use warpgrid_image::{Color, Raster, RasterSize};
/// use warpgrid_imgproc::backend::Sequential;
/// use warpgrid_imgproc::resize::resize;
/// use warpgrid_imgproc::sampler::BoxSampler;
///
/// let src = Raster::from_size_val(RasterSize::new(4, 5).unwrap(), Color::new(9, 9, 9)).unwrap();
/// let new_size = RasterSize::new(2, 3).unwrap();
///
/// let resized = resize(&src, new_size, BoxSampler::default(), &Sequential).unwrap();
///
/// assert_eq!(resized.width(), 2);
/// assert_eq!(resized.height(), 3);
/// ```
pub fn resize<B: ExecutionBackend>(
    src: &Raster,
    new_size: RasterSize,
    sampler: BoxSampler,
    backend: &B,
) -> Result<Raster, TransformError> {
    new_size.validate()?;
    log::debug!(
        "resize {}x{} -> {}x{} ({:?})",
        src.width(),
        src.height(),
        new_size.width,
        new_size.height,
        sampler.normalization
    );

    let kernel = MapSample::new(ResizeMap::new(src.size(), new_size), sampler, new_size);
    backend.transform(src, &kernel)
}

/// Resize with the default box sampler, dividing every sum by 9.
pub fn resize_box<B: ExecutionBackend>(
    src: &Raster,
    new_size: RasterSize,
    backend: &B,
) -> Result<Raster, TransformError> {
    resize(src, new_size, BoxSampler::default(), backend)
}
