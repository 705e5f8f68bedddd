use candle_core::Device;
use tracing::{info, warn};

use super::error::BackendError;

type DeviceCtor = fn() -> candle_core::Result<Device>;

/// GPU backends compiled into this build, in preference order.
const GPU_BACKENDS: &[(&str, DeviceCtor)] = &[
    #[cfg(feature = "cuda")]
    ("cuda", || Device::new_cuda(0)),
    #[cfg(feature = "metal")]
    ("metal", || Device::new_metal(0)),
];

/// Picks the first GPU backend that opens device 0, otherwise the CPU.
pub fn select_device() -> Result<Device, BackendError> {
    Ok(first_available(GPU_BACKENDS))
}

fn first_available(backends: &[(&str, DeviceCtor)]) -> Device {
    let mut failures = Vec::with_capacity(backends.len());

    for (name, open) in backends {
        match open() {
            Ok(device) => {
                info!(backend = name, "Scoring on GPU");
                return device;
            }
            Err(e) => {
                warn!(backend = name, error = %e, "GPU backend unavailable");
                failures.push(format!("{name}: {e}"));
            }
        }
    }

    let reason = if backends.is_empty() {
        "no GPU backend compiled".to_string()
    } else {
        failures.join("; ")
    };
    warn!(reason = %reason, "Scoring on CPU");
    Device::Cpu
}

/// Waits for queued device work so freed buffers return to the allocator.
///
/// A no-op on CPU.
pub fn release_device_cache(device: &Device) -> Result<(), BackendError> {
    if device.is_cpu() {
        return Ok(());
    }
    device.synchronize().map_err(BackendError::from)
}
