use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::{buffer::DeviceBuffer, error::DeviceError, launch::Stream};

/// Configuration of a [`CpuDevice`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Number of worker threads. `None` shares the global rayon pool.
    pub num_threads: Option<usize>,

    /// Upper bound on live device memory in bytes. `None` is unbounded.
    pub memory_limit: Option<usize>,
}

/// Tracks live device allocations.
#[derive(Debug, Default)]
pub(crate) struct MemoryLedger {
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
    limit: Option<usize>,
}

impl MemoryLedger {
    fn reserve(&self, bytes: usize) -> Result<(), DeviceError> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.live_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|total| *total <= limit)
            })
            .map_err(|_| DeviceError::AllocationFailed { bytes })?;
        self.live_buffers.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    pub(crate) fn release(&self, bytes: usize) {
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
        self.live_buffers.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A parallel compute device backed by a rayon thread pool.
///
/// Memory handed out by the device lives in [`DeviceBuffer`]s, separate from any
/// host allocation, and is accounted until the buffer is dropped. Cloning the
/// device shares the pool and the accounting.
#[derive(Debug, Clone)]
pub struct CpuDevice {
    pool: Option<Arc<rayon::ThreadPool>>,
    ledger: Arc<MemoryLedger>,
}

impl CpuDevice {
    /// Creates a device on the global rayon pool without a memory limit.
    pub fn new() -> Self {
        Self {
            pool: None,
            ledger: Arc::new(MemoryLedger::default()),
        }
    }

    /// Creates a device from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread count is zero or the pool fails to build.
    pub fn with_config(config: DeviceConfig) -> Result<Self, DeviceError> {
        let pool = match config.num_threads {
            Some(0) => return Err(DeviceError::InvalidThreadCount(0)),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("warpgrid-worker-{i}"))
                    .build()
                    .map_err(|e| DeviceError::ThreadPoolBuild(e.to_string()))?;
                Some(Arc::new(pool))
            }
            None => None,
        };

        log::debug!(
            "created cpu device: threads={:?} memory_limit={:?}",
            config.num_threads,
            config.memory_limit
        );

        Ok(Self {
            pool,
            ledger: Arc::new(MemoryLedger {
                limit: config.memory_limit,
                ..Default::default()
            }),
        })
    }

    /// Number of worker threads available to a launch.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Number of device buffers currently alive.
    pub fn live_buffers(&self) -> usize {
        self.ledger.live_buffers.load(Ordering::Acquire)
    }

    /// Bytes of device memory currently alive.
    pub fn live_bytes(&self) -> usize {
        self.ledger.live_bytes.load(Ordering::Acquire)
    }

    /// Allocates a buffer of `len` default-initialized elements.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::AllocationFailed`] if the memory cannot be reserved.
    pub fn alloc<T: Clone + Default>(&self, len: usize) -> Result<DeviceBuffer<T>, DeviceError> {
        self.alloc_with(len, |data| data.resize(len, T::default()))
    }

    /// Allocates a buffer and copies `host` into it (host to device).
    pub fn upload<T: Clone>(&self, host: &[T]) -> Result<DeviceBuffer<T>, DeviceError> {
        self.alloc_with(host.len(), |data| data.extend_from_slice(host))
    }

    /// Allocates a single-element buffer holding a copy of `value`.
    ///
    /// Used to broadcast read-only launch parameters to every worker.
    pub fn upload_value<T: Clone>(&self, value: &T) -> Result<DeviceBuffer<T>, DeviceError> {
        self.alloc_with(1, |data| data.push(value.clone()))
    }

    /// Creates a stream to launch kernels on this device.
    pub fn stream(&self) -> Stream<'_> {
        Stream::new(self)
    }

    pub(crate) fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn alloc_with<T>(
        &self,
        len: usize,
        fill: impl FnOnce(&mut Vec<T>),
    ) -> Result<DeviceBuffer<T>, DeviceError> {
        let bytes = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(DeviceError::AllocationFailed { bytes: usize::MAX })?;

        self.ledger.reserve(bytes)?;

        let mut data = Vec::new();
        if data.try_reserve_exact(len).is_err() {
            self.ledger.release(bytes);
            return Err(DeviceError::AllocationFailed { bytes });
        }
        fill(&mut data);

        log::trace!("device alloc: {len} elements ({bytes} bytes)");

        Ok(DeviceBuffer::new(data, bytes, self.ledger.clone()))
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CpuDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cpu:{}", self.num_threads())
    }
}
