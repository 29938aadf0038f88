use std::sync::Arc;

use crate::{device::MemoryLedger, error::DeviceError};

/// Device-resident memory owned by a [`crate::CpuDevice`].
///
/// The memory is returned to the device when the buffer is dropped, on every
/// exit path of the code holding it.
pub struct DeviceBuffer<T> {
    data: Vec<T>,
    bytes: usize,
    ledger: Arc<MemoryLedger>,
}

impl<T> DeviceBuffer<T> {
    pub(crate) fn new(data: Vec<T>, bytes: usize, ledger: Arc<MemoryLedger>) -> Self {
        Self {
            data,
            bytes,
            ledger,
        }
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the allocation in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.bytes
    }

    /// Read-only access for kernels running on the device.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Clone> DeviceBuffer<T> {
    /// Copies the buffer back into host memory (device to host).
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::AllocationFailed`] if the host memory cannot be reserved.
    pub fn copy_to_host(&self) -> Result<Vec<T>, DeviceError> {
        let mut host = Vec::new();
        host.try_reserve_exact(self.data.len())
            .map_err(|_| DeviceError::AllocationFailed { bytes: self.bytes })?;
        host.extend_from_slice(&self.data);
        Ok(host)
    }

    /// Overwrites the buffer with `host` (host to device).
    pub fn copy_from_host(&mut self, host: &[T]) -> Result<(), DeviceError> {
        if host.len() != self.data.len() {
            return Err(DeviceError::BufferSizeMismatch(host.len(), self.data.len()));
        }
        self.data.clone_from_slice(host);
        Ok(())
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        self.ledger.release(self.bytes);
        log::trace!(
            "device release: {} elements ({} bytes)",
            self.data.len(),
            self.bytes
        );
    }
}

impl<T> std::fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("len", &self.data.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}
