//! Target compute device of an ensemble.
//!
//! Every estimator runs on the same device, one after another. Only the CPU
//! backend exists; placing a batch on it is free because `ndarray` buffers
//! already live in host memory.

use crate::core::error::{BaggingError, Result};
use crate::core::types::DeviceType;
use crate::dataset::Batch;

/// Handle to the device estimators train and predict on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    device_type: DeviceType,
}

impl Device {
    /// Open a device of the requested type
    pub fn new(device_type: DeviceType) -> Result<Self> {
        match device_type {
            DeviceType::Cpu => Ok(Device { device_type }),
            DeviceType::Gpu => Err(BaggingError::not_implemented(
                "GPU execution of bagging ensembles",
            )),
        }
    }

    /// The host CPU
    pub fn cpu() -> Self {
        Device {
            device_type: DeviceType::Cpu,
        }
    }

    /// Kind of device
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Move `batch` to this device
    pub fn place<T>(&self, batch: Batch<T>) -> Batch<T> {
        batch
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::cpu()
    }
}
