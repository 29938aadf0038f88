//! Raster resize and perspective warp on sequential or grid-parallel backends.
//!
//! ```
//! use warpgrid::image::RasterSize;
//! use warpgrid::imgproc::{backend::GridParallel, random::random_raster, warp::warp_perspective};
//!
//! let src = random_raster(RasterSize::new(32, 32).unwrap(), 1, &GridParallel::new()).unwrap();
//! let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
//! let out = warp_perspective(&src, &m, &GridParallel::new()).unwrap();
//! assert_eq!(out, src);
//! ```

#[doc(inline)]
pub use warpgrid_device as device;

#[doc(inline)]
pub use warpgrid_image as image;

#[doc(inline)]
pub use warpgrid_imgproc as imgproc;
