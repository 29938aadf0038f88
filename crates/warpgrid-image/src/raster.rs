use crate::{color::Color, error::RasterError};

/// Raster size in pixels
///
/// A struct to represent the size of a raster in pixels.
///
/// # Examples
///
/// ```
/// use warpgrid_image::RasterSize;
///
/// let size = RasterSize::new(10, 20).unwrap();
///
/// assert_eq!(size.width, 10);
/// assert_eq!(size.height, 20);
/// assert_eq!(size.num_pixels(), 200);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterSize {
    /// Width of the raster in pixels
    pub width: usize,
    /// Height of the raster in pixels
    pub height: usize,
}

impl RasterSize {
    /// Create a validated raster size.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidDimension`] if either side is zero and
    /// [`RasterError::SizeOverflow`] if the pixel data would not fit in memory.
    pub fn new(width: usize, height: usize) -> Result<Self, RasterError> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Check that both sides are non-zero and that the pixel data is addressable.
    pub fn validate(&self) -> Result<(), RasterError> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::InvalidDimension {
                width: self.width,
                height: self.height,
            });
        }
        // a Vec<Color> cannot hold more than isize::MAX bytes
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(std::mem::size_of::<Color>()))
            .filter(|bytes| *bytes <= isize::MAX as usize)
            .ok_or(RasterError::SizeOverflow {
                width: self.width,
                height: self.height,
            })?;
        Ok(())
    }

    /// Number of pixels, `width * height`.
    ///
    /// Only meaningful for a size that passed [`RasterSize::validate`].
    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Whether a signed coordinate lies inside `[0, width) x [0, height)`.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Row-major linear index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

impl std::fmt::Display for RasterSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "RasterSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for RasterSize {
    fn from(size: [usize; 2]) -> Self {
        RasterSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A borrowed, read-only view over row-major pixels.
///
/// Samplers read through a view so the same code serves host rasters and
/// device-resident copies.
#[derive(Clone, Copy, Debug)]
pub struct RasterView<'a> {
    size: RasterSize,
    pixels: &'a [Color],
}

impl<'a> RasterView<'a> {
    /// Create a view over `pixels` laid out with `size`.
    ///
    /// # Errors
    ///
    /// Fails if the size is empty or the slice length does not match.
    pub fn new(size: RasterSize, pixels: &'a [Color]) -> Result<Self, RasterError> {
        size.validate()?;
        if pixels.len() != size.num_pixels() {
            return Err(RasterError::InvalidPixelCount(
                pixels.len(),
                size.num_pixels(),
            ));
        }
        Ok(Self { size, pixels })
    }

    /// The size of the viewed raster.
    #[inline]
    pub fn size(&self) -> RasterSize {
        self.size
    }

    /// The pixel at a signed coordinate, or `None` outside the raster.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        if self.size.contains(x, y) {
            Some(self.pixels[self.size.index(x as usize, y as usize)])
        } else {
            None
        }
    }
}

/// An RGB raster stored as a flat row-major sequence of [`Color`], origin top-left.
///
/// A raster has no mutating API: transforms always allocate a fresh output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    size: RasterSize,
    pixels: Vec<Color>,
}

impl Raster {
    /// Create a new raster from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the raster in pixels.
    /// * `pixels` - The pixels in row-major order.
    ///
    /// # Errors
    ///
    /// If the size is empty or the number of pixels does not match the size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use warpgrid_image::{Color, Raster, RasterSize};
    ///
    /// let raster = Raster::new(
    ///     RasterSize { width: 2, height: 1 },
    ///     vec![Color::new(1, 2, 3), Color::BLACK],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(raster.get(0, 0), Some(&Color::new(1, 2, 3)));
    /// ```
    pub fn new(size: RasterSize, pixels: Vec<Color>) -> Result<Self, RasterError> {
        size.validate()?;
        if pixels.len() != size.num_pixels() {
            return Err(RasterError::InvalidPixelCount(
                pixels.len(),
                size.num_pixels(),
            ));
        }
        Ok(Self { size, pixels })
    }

    /// Create a raster where every pixel is `color`.
    pub fn from_size_val(size: RasterSize, color: Color) -> Result<Self, RasterError> {
        let mut pixels = Self::alloc_pixels(size)?;
        pixels.resize(size.num_pixels(), color);
        Ok(Self { size, pixels })
    }

    /// Create a raster by evaluating `f(x, y)` in row-major order.
    ///
    /// # Errors
    ///
    /// Fails on an invalid size, or with [`RasterError::AllocationFailed`] if the
    /// pixel storage cannot be reserved. `f` is not called in either case.
    pub fn from_fn(
        size: RasterSize,
        mut f: impl FnMut(usize, usize) -> Color,
    ) -> Result<Self, RasterError> {
        let mut pixels = Self::alloc_pixels(size)?;
        for y in 0..size.height {
            for x in 0..size.width {
                pixels.push(f(x, y));
            }
        }
        Ok(Self { size, pixels })
    }

    fn alloc_pixels(size: RasterSize) -> Result<Vec<Color>, RasterError> {
        size.validate()?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(size.num_pixels())
            .map_err(|_| RasterError::AllocationFailed {
                bytes: size.num_pixels() * std::mem::size_of::<Color>(),
            })?;
        Ok(pixels)
    }

    /// The size of the raster.
    #[inline]
    pub fn size(&self) -> RasterSize {
        self.size
    }

    /// The width of the raster in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the raster in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The pixel at `(x, y)`, or `None` if outside the raster.
    pub fn get(&self, x: usize, y: usize) -> Option<&Color> {
        if x < self.size.width && y < self.size.height {
            self.pixels.get(self.size.index(x, y))
        } else {
            None
        }
    }

    /// The pixels in row-major order.
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }

    /// A borrowed read-only view.
    pub fn view(&self) -> RasterView<'_> {
        RasterView {
            size: self.size,
            pixels: &self.pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_size_rejects_zero() {
        assert_eq!(
            RasterSize::new(0, 4),
            Err(RasterError::InvalidDimension {
                width: 0,
                height: 4
            })
        );
        assert!(RasterSize::new(3, 0).is_err());
        assert!(RasterSize::new(1, 1).is_ok());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn raster_size_rejects_overflow() {
        assert_eq!(
            RasterSize::new(1 << 40, 1 << 40),
            Err(RasterError::SizeOverflow {
                width: 1 << 40,
                height: 1 << 40
            })
        );
        // pixel count fits but the bytes do not
        assert!(RasterSize::new(usize::MAX / 2, 1).is_err());
        assert!(RasterSize::new(1 << 20, 1 << 20).is_ok());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn raster_from_fn_reports_allocation_failure() -> Result<(), RasterError> {
        // valid size, far beyond any address space
        let size = RasterSize::new(1 << 30, 1 << 30)?;
        let mut calls = 0;
        let res = Raster::from_fn(size, |_, _| {
            calls += 1;
            Color::BLACK
        });
        assert_eq!(res, Err(RasterError::AllocationFailed { bytes: 3 << 60 }));
        assert_eq!(calls, 0);
        assert!(matches!(
            Raster::from_size_val(size, Color::BLACK),
            Err(RasterError::AllocationFailed { .. })
        ));
        Ok(())
    }

    #[test]
    fn raster_new_checks_length() {
        let size = RasterSize {
            width: 2,
            height: 3,
        };
        let res = Raster::new(size, vec![Color::BLACK; 5]);
        assert_eq!(res, Err(RasterError::InvalidPixelCount(5, 6)));
    }

    #[test]
    fn raster_new_rejects_empty_size() {
        let size = RasterSize {
            width: 0,
            height: 0,
        };
        assert!(matches!(
            Raster::new(size, vec![]),
            Err(RasterError::InvalidDimension { .. })
        ));
        assert!(Raster::from_size_val(size, Color::BLACK).is_err());
    }

    #[test]
    fn raster_row_major_layout() -> Result<(), RasterError> {
        let size = RasterSize::new(3, 2)?;
        let raster = Raster::from_fn(size, |x, y| Color::new(x as u8, y as u8, 0))?;

        // (x=2, y=1) lives at 1 * 3 + 2
        assert_eq!(raster.as_slice()[5], Color::new(2, 1, 0));
        assert_eq!(raster.get(2, 1), Some(&Color::new(2, 1, 0)));
        assert_eq!(raster.get(3, 0), None);
        assert_eq!(raster.get(0, 2), None);

        Ok(())
    }

    #[test]
    fn view_signed_lookup() -> Result<(), RasterError> {
        let raster = Raster::from_size_val(RasterSize::new(2, 2)?, Color::new(9, 9, 9))?;
        let view = raster.view();
        assert_eq!(view.get(1, 1), Some(Color::new(9, 9, 9)));
        assert_eq!(view.get(-1, 0), None);
        assert_eq!(view.get(0, 2), None);
        assert_eq!(view.get(i64::MAX, 0), None);
        Ok(())
    }

    #[test]
    fn view_checks_length() -> Result<(), RasterError> {
        let pixels = vec![Color::BLACK; 3];
        let res = RasterView::new(RasterSize::new(2, 2)?, &pixels);
        assert!(matches!(res, Err(RasterError::InvalidPixelCount(3, 4))));
        Ok(())
    }

    #[test]
    fn size_from_array() {
        let size: RasterSize = [4, 5].into();
        assert_eq!(size.width, 4);
        assert_eq!(size.height, 5);
        assert_eq!(size.to_string(), "RasterSize { width: 4, height: 5 }");
    }
}
