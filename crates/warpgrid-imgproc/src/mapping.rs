//! Coordinate mappings from an output pixel to its source pixel.
//!
//! Both mappings compute in `f64` and truncate toward zero. Truncation rather than
//! rounding biases sampling toward the top-left of the ideal fractional position.

use warpgrid_image::RasterSize;

use crate::error::TransformError;

/// Denominators with a magnitude below this value are treated as degenerate.
pub const DEGENERATE_EPS: f64 = 1e-12;

/// A pure function from a target pixel to a source coordinate.
pub trait CoordinateMap: Clone + Send + Sync {
    /// Maps the target pixel `(x, y)` to an integer source coordinate.
    ///
    /// Returns `None` when no source coordinate exists for the pixel.
    fn map(&self, x: usize, y: usize) -> Option<(i64, i64)>;
}

/// Scales target coordinates into a source raster of a different size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeMap {
    src: RasterSize,
    dst: RasterSize,
}

impl ResizeMap {
    /// Create a mapping from a `dst` sized raster into a `src` sized one.
    pub fn new(src: RasterSize, dst: RasterSize) -> Self {
        Self { src, dst }
    }
}

impl CoordinateMap for ResizeMap {
    #[inline]
    fn map(&self, x: usize, y: usize) -> Option<(i64, i64)> {
        let src_x = (x as f64 / self.dst.width as f64) * self.src.width as f64;
        let src_y = (y as f64 / self.dst.height as f64) * self.src.height as f64;
        Some((src_x as i64, src_y as i64))
    }
}

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

fn inverse_perspective_matrix(m: &[f64; 9]) -> Result<[f64; 9], TransformError> {
    let det = determinant3x3(m);

    if det == 0.0 || !det.is_finite() {
        return Err(TransformError::SingularMatrix(det));
    }

    let inv_det = 1.0 / det;
    Ok(adjugate3x3(m).map(|v| v * inv_det))
}

/// A homogeneous projective mapping from target to source pixels.
///
/// The coefficients form a row-major 3x3 matrix `m`, applied as
///
/// ```text
/// w     = m6 * x + m7 * y + m8
/// src_x = (m0 * x + m1 * y + m2) / w
/// src_y = (m3 * x + m4 * y + m5) / w
/// ```
///
/// A pixel whose `|w|` is below [`DEGENERATE_EPS`], or whose result is not finite,
/// has no source coordinate and samples as the black sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveMap {
    m: [f64; 9],
}

impl PerspectiveMap {
    /// Create a mapping from target-to-source coefficients.
    pub fn new(m: [f64; 9]) -> Self {
        Self { m }
    }

    /// The identity mapping.
    pub fn identity() -> Self {
        Self::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    /// Create a mapping from a source-to-target homography by inverting it.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SingularMatrix`] if the matrix has no inverse.
    pub fn from_forward(m: &[f64; 9]) -> Result<Self, TransformError> {
        Ok(Self::new(inverse_perspective_matrix(m)?))
    }

    /// The target-to-source coefficients.
    pub fn matrix(&self) -> &[f64; 9] {
        &self.m
    }
}

impl CoordinateMap for PerspectiveMap {
    #[inline]
    fn map(&self, x: usize, y: usize) -> Option<(i64, i64)> {
        let m = &self.m;
        let (x, y) = (x as f64, y as f64);

        let w = m[6] * x + m[7] * y + m[8];
        if w.is_nan() || w.abs() < DEGENERATE_EPS {
            return None;
        }

        let src_x = (m[0] * x + m[1] * y + m[2]) / w;
        let src_y = (m[3] * x + m[4] * y + m[5]) / w;
        if !src_x.is_finite() || !src_y.is_finite() {
            return None;
        }

        Some((src_x as i64, src_y as i64))
    }
}
