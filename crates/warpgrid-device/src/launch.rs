use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::{buffer::DeviceBuffer, device::CpuDevice, error::DeviceError};

/// Size of a tile of workers in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDim {
    /// tile width
    pub x: usize,
    /// tile height
    pub y: usize,
}

impl BlockDim {
    /// Create a block dimension.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Default for BlockDim {
    fn default() -> Self {
        Self::new(16, 16)
    }
}

/// Number of tiles along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDim {
    /// tiles along x
    pub x: usize,
    /// tiles along y
    pub y: usize,
}

/// Geometry of a 2-D kernel launch over a `width x height` extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    /// number of tiles
    pub grid: GridDim,
    /// tile size
    pub block: BlockDim,
    /// extent width in elements
    pub width: usize,
    /// extent height in elements
    pub height: usize,
}

impl LaunchConfig {
    /// Builds the smallest grid of `block` tiles covering `width x height`.
    ///
    /// Tiles on the right and bottom edges are clipped to the extent.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidBlockDim`] if a block side is zero.
    pub fn for_extent(width: usize, height: usize, block: BlockDim) -> Result<Self, DeviceError> {
        if block.x == 0 || block.y == 0 {
            return Err(DeviceError::InvalidBlockDim {
                x: block.x,
                y: block.y,
            });
        }
        Ok(Self {
            grid: GridDim {
                x: width.div_ceil(block.x),
                y: height.div_ceil(block.y),
            },
            block,
            width,
            height,
        })
    }

    /// Number of elements covered by the launch.
    pub fn num_elements(&self) -> usize {
        self.width * self.height
    }

    /// Number of tiles in the grid.
    pub fn num_tiles(&self) -> usize {
        self.grid.x * self.grid.y
    }
}

// One worker's exclusive share of the output: a row segment per tile row.
struct Tile<'a, T> {
    x0: usize,
    y0: usize,
    rows: Vec<&'a mut [T]>,
}

impl<T> Tile<'_, T> {
    fn run<F: Fn(usize, usize) -> T>(self, kernel: &F) {
        let Tile { x0, y0, rows } = self;
        for (dy, row) in rows.into_iter().enumerate() {
            for (dx, px) in row.iter_mut().enumerate() {
                *px = kernel(x0 + dx, y0 + dy);
            }
        }
    }
}

// Split a row-major buffer into disjoint tiles, ordered by (tile_y, tile_x).
fn split_tiles<'a, T>(data: &'a mut [T], config: &LaunchConfig) -> Vec<Tile<'a, T>> {
    let (bw, bh) = (config.block.x, config.block.y);
    let mut tiles: Vec<Tile<'a, T>> = Vec::with_capacity(config.num_tiles());

    for (ty, band) in data.chunks_mut(config.width * bh).enumerate() {
        let first = tiles.len();
        tiles.extend((0..config.grid.x).map(|tx| Tile {
            x0: tx * bw,
            y0: ty * bh,
            rows: Vec::with_capacity(bh),
        }));
        for row in band.chunks_mut(config.width) {
            for (tx, segment) in row.chunks_mut(bw).enumerate() {
                tiles[first + tx].rows.push(segment);
            }
        }
    }

    tiles
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

type Job<'a> = Box<dyn FnOnce() + Send + 'a>;

/// An ordered queue of kernel launches on a [`CpuDevice`].
///
/// [`Stream::launch`] only checks and records a launch; the work runs when the
/// stream is synchronized, which is the only point where the host waits on the
/// device. Output buffers stay borrowed by the stream until then.
pub struct Stream<'a> {
    device: &'a CpuDevice,
    pending: Vec<Job<'a>>,
    launches: usize,
}

impl<'a> Stream<'a> {
    pub(crate) fn new(device: &'a CpuDevice) -> Self {
        Self {
            device,
            pending: Vec::new(),
            launches: 0,
        }
    }

    /// Number of kernels launched on this stream.
    pub fn num_launches(&self) -> usize {
        self.launches
    }

    /// Number of launches not yet executed.
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// Queues `kernel` to run once per element of the grid, writing `out[y * width + x]`.
    ///
    /// Every tile is an independent worker. Workers share only `kernel`, which must
    /// not mutate state, and write only their own elements of `out`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::BufferSizeMismatch`] immediately if `out` does not
    /// match the launch extent. Failures while the kernel runs are reported by
    /// [`Stream::synchronize`].
    pub fn launch<T, F>(
        &mut self,
        config: &LaunchConfig,
        out: &'a mut DeviceBuffer<T>,
        kernel: F,
    ) -> Result<(), DeviceError>
    where
        T: Send + 'a,
        F: Fn(usize, usize) -> T + Send + Sync + 'a,
    {
        if out.len() != config.num_elements() {
            return Err(DeviceError::BufferSizeMismatch(
                out.len(),
                config.num_elements(),
            ));
        }

        self.launches += 1;
        log::debug!(
            "launch {}: extent {}x{} grid {}x{} block {}x{} on {}",
            self.launches,
            config.width,
            config.height,
            config.grid.x,
            config.grid.y,
            config.block.x,
            config.block.y,
            self.device
        );

        if config.num_elements() == 0 {
            return Ok(());
        }

        let tiles = split_tiles(out.as_mut_slice(), config);
        self.pending.push(Box::new(move || {
            tiles.into_par_iter().for_each(|tile| tile.run(&kernel));
        }));

        Ok(())
    }

    /// Runs every queued launch in order and waits for all of them.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::LaunchFailed`] for the first launch whose kernel
    /// panicked. Launches queued after it are not run.
    pub fn synchronize(mut self) -> Result<(), DeviceError> {
        let device = self.device;
        let pending = std::mem::take(&mut self.pending);
        let total = pending.len();

        for (i, job) in pending.into_iter().enumerate() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| device.install(job)));
            if let Err(payload) = result {
                let msg = panic_message(payload);
                log::warn!("queued launch {}/{total} failed: {msg}", i + 1);
                return Err(DeviceError::LaunchFailed(msg));
            }
        }

        Ok(())
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            log::warn!(
                "stream dropped with {} launches never synchronized",
                self.pending.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_launch_config_covers_extent() -> Result<(), DeviceError> {
        let config = LaunchConfig::for_extent(33, 16, BlockDim::default())?;
        assert_eq!(config.grid, GridDim { x: 3, y: 1 });
        assert_eq!(config.num_tiles(), 3);
        assert_eq!(config.num_elements(), 33 * 16);
        Ok(())
    }

    #[test]
    fn test_launch_config_invalid_block() {
        let res = LaunchConfig::for_extent(4, 4, BlockDim::new(0, 16));
        assert_eq!(res, Err(DeviceError::InvalidBlockDim { x: 0, y: 16 }));
    }

    #[test]
    fn test_split_tiles_disjoint_cover() {
        let config = LaunchConfig::for_extent(5, 3, BlockDim::new(2, 2)).unwrap();
        let mut data = vec![0usize; 15];
        let tiles = split_tiles(&mut data, &config);
        assert_eq!(tiles.len(), config.num_tiles());

        let origins: Vec<_> = tiles.iter().map(|t| (t.x0, t.y0)).collect();
        assert_eq!(origins, vec![(0, 0), (2, 0), (4, 0), (0, 2), (2, 2), (4, 2)]);

        // clipped edge tiles
        assert_eq!(tiles[2].rows.len(), 2);
        assert_eq!(tiles[2].rows[0].len(), 1);
        assert_eq!(tiles[3].rows.len(), 1);

        for (i, tile) in tiles.into_iter().enumerate() {
            tile.run(&|_, _| i + 1);
        }
        assert!(data.iter().all(|&v| v > 0));
        assert_eq!(data[0..5], [1, 1, 2, 2, 3]);
        assert_eq!(data[10..15], [4, 4, 5, 5, 6]);
    }

    #[test]
    fn test_launch_writes_every_index() -> Result<(), DeviceError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let device = CpuDevice::new();
        let (w, h) = (37, 21);
        let mut out = device.alloc::<usize>(w * h)?;

        let config = LaunchConfig::for_extent(w, h, BlockDim::new(8, 4))?;
        let mut stream = device.stream();
        stream.launch(&config, &mut out, |x, y| y * w + x)?;
        assert_eq!(stream.num_launches(), 1);
        stream.synchronize()?;

        let expected: Vec<usize> = (0..w * h).collect();
        assert_eq!(out.copy_to_host()?, expected);
        Ok(())
    }

    #[test]
    fn test_launch_runs_on_synchronize() -> Result<(), DeviceError> {
        let device = CpuDevice::new();
        let mut out = device.alloc::<u8>(4)?;
        let config = LaunchConfig::for_extent(2, 2, BlockDim::new(1, 1))?;
        let calls = AtomicUsize::new(0);

        let mut stream = device.stream();
        stream.launch(&config, &mut out, |_, _| {
            calls.fetch_add(1, Ordering::Relaxed);
            1u8
        })?;

        // queued, nothing executed yet
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert_eq!(stream.num_pending(), 1);

        stream.synchronize()?;
        assert_eq!(calls.load(Ordering::Relaxed), 4);
        assert_eq!(out.copy_to_host()?, vec![1; 4]);
        Ok(())
    }

    #[test]
    fn test_launch_size_mismatch() -> Result<(), DeviceError> {
        let device = CpuDevice::new();
        let mut out = device.alloc::<u8>(3)?;
        let config = LaunchConfig::for_extent(2, 2, BlockDim::default())?;
        let mut stream = device.stream();
        let res = stream.launch(&config, &mut out, |_, _| 0);
        assert_eq!(res, Err(DeviceError::BufferSizeMismatch(3, 4)));
        assert_eq!(stream.num_pending(), 0);
        Ok(())
    }

    #[test]
    fn test_launch_panic_reported_on_synchronize() -> Result<(), DeviceError> {
        let device = CpuDevice::new();
        let mut out = device.alloc::<u8>(16)?;
        let mut after = device.alloc::<u8>(16)?;
        let config = LaunchConfig::for_extent(4, 4, BlockDim::new(2, 2))?;

        let mut stream = device.stream();
        stream.launch(&config, &mut out, |x, y| {
            if (x, y) == (3, 3) {
                panic!("bad pixel");
            }
            1u8
        })?;
        stream.launch(&config, &mut after, |_, _| 7u8)?;

        assert_eq!(
            stream.synchronize(),
            Err(DeviceError::LaunchFailed("bad pixel".to_string()))
        );
        // the launch queued behind the failure never ran
        assert_eq!(after.copy_to_host()?, vec![0; 16]);

        drop(out);
        drop(after);
        assert_eq!(device.live_buffers(), 0);
        Ok(())
    }
}
