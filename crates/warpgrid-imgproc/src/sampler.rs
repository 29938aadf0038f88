use warpgrid_image::{Color, RasterView};

/// Produces an output color from a mapped source coordinate.
pub trait Sampler: Clone + Send + Sync {
    /// Samples `src` at `at`. A `None` coordinate samples as [`Color::BLACK`].
    fn sample(&self, src: RasterView<'_>, at: Option<(i64, i64)>) -> Color;
}

/// How the 3x3 box filter divides its channel sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoxNormalization {
    /// Always divide by 9, whatever the number of in-bounds taps.
    ///
    /// Pixels whose neighborhood crosses the raster border come out darker than
    /// their neighbors. Kept as the default for output compatibility.
    #[default]
    FixedNine,

    /// Divide by the number of taps that fell inside the raster.
    InBoundsTaps,
}

/// Averages the 3x3 neighborhood centered on the mapped coordinate.
///
/// Taps outside the source raster are skipped. Channel averages use integer
/// division, truncating toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxSampler {
    /// division policy for the channel sums
    pub normalization: BoxNormalization,
}

impl BoxSampler {
    /// Create a box sampler with the given normalization.
    pub fn new(normalization: BoxNormalization) -> Self {
        Self { normalization }
    }
}

impl Sampler for BoxSampler {
    fn sample(&self, src: RasterView<'_>, at: Option<(i64, i64)>) -> Color {
        let Some((cx, cy)) = at else {
            return Color::BLACK;
        };

        let mut sum = [0u32; 3];
        let mut taps = 0u32;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(c) = src.get(cx.saturating_add(dx), cy.saturating_add(dy)) {
                    sum[0] += c.r as u32;
                    sum[1] += c.g as u32;
                    sum[2] += c.b as u32;
                    taps += 1;
                }
            }
        }

        let denom = match self.normalization {
            BoxNormalization::FixedNine => 9,
            BoxNormalization::InBoundsTaps => taps,
        };
        if denom == 0 {
            return Color::BLACK;
        }

        // every tap is <= 255, so each average fits in a byte
        Color::new(
            (sum[0] / denom) as u8,
            (sum[1] / denom) as u8,
            (sum[2] / denom) as u8,
        )
    }
}

/// Returns the single source pixel at the mapped coordinate, or the black sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointSampler;

impl Sampler for PointSampler {
    #[inline]
    fn sample(&self, src: RasterView<'_>, at: Option<(i64, i64)>) -> Color {
        at.and_then(|(x, y)| src.get(x, y)).unwrap_or(Color::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warpgrid_image::{Raster, RasterError, RasterSize};

    fn gradient(width: usize, height: usize) -> Result<Raster, RasterError> {
        Raster::from_fn(RasterSize::new(width, height)?, |x, y| {
            Color::new((10 * x) as u8, (10 * y) as u8, 90)
        })
    }

    #[test]
    fn point_sampler_in_bounds() -> Result<(), RasterError> {
        let raster = gradient(3, 3)?;
        let c = PointSampler.sample(raster.view(), Some((2, 1)));
        assert_eq!(c, Color::new(20, 10, 90));
        Ok(())
    }

    #[test]
    fn point_sampler_out_of_bounds_is_black() -> Result<(), RasterError> {
        let raster = gradient(3, 3)?;
        for at in [Some((-1, 0)), Some((0, 3)), Some((3, 0)), None] {
            assert_eq!(PointSampler.sample(raster.view(), at), Color::BLACK);
        }
        Ok(())
    }

    #[test]
    fn box_sampler_interior_average() -> Result<(), RasterError> {
        let raster = gradient(3, 3)?;
        // the mean of 0, 10, 20 on both axes is 10
        let c = BoxSampler::default().sample(raster.view(), Some((1, 1)));
        assert_eq!(c, Color::new(10, 10, 90));
        Ok(())
    }

    // Fixed denominator of 9: the corner sees 4 taps, so a uniform 90 comes
    // out as 4 * 90 / 9 = 40. Arbitrary but intended for compatibility.
    #[test]
    fn box_sampler_fixed_nine_darkens_corner() -> Result<(), RasterError> {
        let raster = Raster::from_size_val(RasterSize::new(3, 3)?, Color::new(90, 90, 90))?;
        let c = BoxSampler::default().sample(raster.view(), Some((0, 0)));
        assert_eq!(c, Color::new(40, 40, 40));

        // edge: 6 taps -> 60
        let c = BoxSampler::default().sample(raster.view(), Some((1, 0)));
        assert_eq!(c, Color::new(60, 60, 60));
        Ok(())
    }

    #[test]
    fn box_sampler_in_bounds_taps_keeps_corner() -> Result<(), RasterError> {
        let raster = Raster::from_size_val(RasterSize::new(3, 3)?, Color::new(90, 91, 92))?;
        let sampler = BoxSampler::new(BoxNormalization::InBoundsTaps);
        let c = sampler.sample(raster.view(), Some((0, 0)));
        assert_eq!(c, Color::new(90, 91, 92));
        Ok(())
    }

    #[test]
    fn box_sampler_truncates() -> Result<(), RasterError> {
        let raster = Raster::new(RasterSize::new(1, 1)?, vec![Color::new(255, 8, 17)])?;
        // one tap over 9
        let c = BoxSampler::default().sample(raster.view(), Some((0, 0)));
        assert_eq!(c, Color::new(28, 0, 1));
        Ok(())
    }

    #[test]
    fn box_sampler_far_outside_is_black() -> Result<(), RasterError> {
        let raster = gradient(2, 2)?;
        for normalization in [BoxNormalization::FixedNine, BoxNormalization::InBoundsTaps] {
            let sampler = BoxSampler::new(normalization);
            assert_eq!(sampler.sample(raster.view(), Some((10, 10))), Color::BLACK);
            assert_eq!(sampler.sample(raster.view(), Some((i64::MAX, 0))), Color::BLACK);
            assert_eq!(sampler.sample(raster.view(), None), Color::BLACK);
        }
        Ok(())
    }
}
