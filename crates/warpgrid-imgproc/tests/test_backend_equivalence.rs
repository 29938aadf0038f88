use warpgrid_device::{BlockDim, CpuDevice, DeviceConfig};
use warpgrid_image::RasterSize;
use warpgrid_imgproc::{
    backend::{GridConfig, GridParallel, Sequential},
    mapping::PerspectiveMap,
    random::random_raster,
    resize::{resize, resize_box},
    sampler::{BoxNormalization, BoxSampler},
    warp::{warp_perspective, warp_perspective_to},
    TransformError,
};

fn grids() -> Result<Vec<GridParallel>, TransformError> {
    let mut grids = vec![
        GridParallel::new(),
        GridParallel::with_device(CpuDevice::new(), BlockDim::new(1, 1)),
        GridParallel::with_device(CpuDevice::new(), BlockDim::new(7, 5)),
        GridParallel::with_device(CpuDevice::new(), BlockDim::new(128, 128)),
    ];
    grids.push(GridParallel::with_config(GridConfig {
        block: BlockDim::new(16, 16),
        device: DeviceConfig {
            num_threads: Some(3),
            memory_limit: None,
        },
    })?);
    Ok(grids)
}

#[test]
fn test_random_raster_equivalence() -> Result<(), TransformError> {
    let _ = env_logger::builder().is_test(true).try_init();

    let size = RasterSize::new(83, 41)?;
    let expected = random_raster(size, 0xdead_beef, &Sequential)?;
    for grid in grids()? {
        assert_eq!(random_raster(size, 0xdead_beef, &grid)?, expected);
    }
    Ok(())
}

#[test]
fn test_warp_perspective_equivalence() -> Result<(), TransformError> {
    let src = random_raster(RasterSize::new(96, 54)?, 3, &Sequential)?;
    let m = [1.0, 0.2, 0.0, 0.2, 1.0, 0.0, 0.0002, 0.0002, 1.0];

    let expected = warp_perspective(&src, &m, &Sequential)?;
    for grid in grids()? {
        assert_eq!(warp_perspective(&src, &m, &grid)?, expected);
    }
    Ok(())
}

#[test]
fn test_warp_with_degenerate_line_equivalence() -> Result<(), TransformError> {
    let src = random_raster(RasterSize::new(40, 30)?, 8, &Sequential)?;
    // the denominator crosses zero along x = 20
    let map = PerspectiveMap::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -0.05, 0.0, 1.0]);
    let dst_size = RasterSize::new(50, 30)?;

    let expected = warp_perspective_to(&src, map, dst_size, &Sequential)?;
    for grid in grids()? {
        assert_eq!(warp_perspective_to(&src, map, dst_size, &grid)?, expected);
    }
    Ok(())
}

#[test]
fn test_resize_equivalence() -> Result<(), TransformError> {
    let src = random_raster(RasterSize::new(64, 48)?, 21, &Sequential)?;
    let sampler = BoxSampler::new(BoxNormalization::InBoundsTaps);

    for new_size in [RasterSize::new(31, 17)?, RasterSize::new(150, 99)?] {
        let expected_fixed = resize_box(&src, new_size, &Sequential)?;
        let expected_taps = resize(&src, new_size, sampler, &Sequential)?;
        for grid in grids()? {
            assert_eq!(resize_box(&src, new_size, &grid)?, expected_fixed);
            assert_eq!(resize(&src, new_size, sampler, &grid)?, expected_taps);
            assert_eq!(grid.device().live_buffers(), 0);
        }
    }
    Ok(())
}
