use argh::FromArgs;
use std::str::FromStr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use warpgrid::{
    device::{BlockDim, DeviceConfig},
    image::{Raster, RasterSize},
    imgproc::{
        backend::{ExecutionStrategy, GridConfig, Sequential},
        random::random_raster,
        resize::resize,
        sampler::{BoxNormalization, BoxSampler},
        warp::warp_perspective,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Warp,
    Resize,
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warp" => Ok(Self::Warp),
            "resize" => Ok(Self::Resize),
            _ => Err(format!("unknown operation '{s}', expected warp or resize")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Sequential,
    Grid,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "grid" => Ok(Self::Grid),
            _ => Err(format!("unknown backend '{s}', expected sequential or grid")),
        }
    }
}

/// Generate a random raster and time a perspective warp or a resize on it.
#[derive(FromArgs)]
struct Args {
    /// width of the generated raster
    #[argh(option, default = "3840")]
    width: usize,

    /// height of the generated raster
    #[argh(option, default = "2160")]
    height: usize,

    /// seed of the generator, defaults to the current time
    #[argh(option)]
    seed: Option<u64>,

    /// operation to run: warp or resize
    #[argh(option, default = "Operation::Warp")]
    op: Operation,

    /// execution backend: sequential or grid
    #[argh(option, default = "BackendKind::Grid")]
    backend: BackendKind,

    /// tile side of the grid backend
    #[argh(option, default = "16")]
    block: usize,

    /// worker threads of the grid backend, defaults to all cores
    #[argh(option)]
    threads: Option<usize>,

    /// output width for resize
    #[argh(option, default = "2000")]
    new_width: usize,

    /// output height for resize
    #[argh(option, default = "2000")]
    new_height: usize,

    /// divide box sums by the in-bounds tap count instead of 9
    #[argh(switch)]
    in_bounds_taps: bool,
}

fn print_corner(raster: &Raster) {
    for y in 0..raster.height().min(10) {
        let row = (0..raster.width().min(10))
            .filter_map(|x| raster.get(x, y))
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{row}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };

    let backend = match args.backend {
        BackendKind::Sequential => ExecutionStrategy::from(Sequential),
        BackendKind::Grid => ExecutionStrategy::grid(GridConfig {
            block: BlockDim::new(args.block, args.block),
            device: DeviceConfig {
                num_threads: args.threads,
                memory_limit: None,
            },
        })?,
    };

    if let ExecutionStrategy::GridParallel(grid) = &backend {
        let block = grid.block();
        log::info!("grid tiles {}x{} on {}", block.x, block.y, grid.device());
    }

    log::info!(
        "{:?} on {} backend, {}x{} seed={seed}",
        args.op,
        backend.name(),
        args.width,
        args.height
    );

    let start = Instant::now();

    let src = random_raster(RasterSize::new(args.width, args.height)?, seed, &backend)?;
    let generated = start.elapsed();

    let output = match args.op {
        Operation::Warp => {
            let m = [1.0, 0.2, 0.0, 0.2, 1.0, 0.0, 0.0002, 0.0002, 1.0];
            warp_perspective(&src, &m, &backend)?
        }
        Operation::Resize => {
            let normalization = if args.in_bounds_taps {
                BoxNormalization::InBoundsTaps
            } else {
                BoxNormalization::FixedNine
            };
            resize(
                &src,
                RasterSize::new(args.new_width, args.new_height)?,
                BoxSampler::new(normalization),
                &backend,
            )?
        }
    };

    let total = start.elapsed();
    log::debug!("generation took {} ms", generated.as_millis());
    println!("Time taken: {} milliseconds", total.as_millis());

    print_corner(&output);

    Ok(())
}
