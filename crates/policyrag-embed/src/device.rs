//! Compute device for the sentence encoder.

use candle_core::Device;

/// A Metal GPU when built with the `metal` feature and one is present,
/// otherwise the CPU.
pub fn select_device() -> Device {
    let device = gpu().unwrap_or(Device::Cpu);
    tracing::info!(device = describe(&device), "embedding device selected");
    device
}

#[cfg(feature = "metal")]
fn gpu() -> Option<Device> {
    Device::new_metal(0)
        .map_err(|e| tracing::debug!(error = %e, "metal device unavailable"))
        .ok()
}

#[cfg(not(feature = "metal"))]
fn gpu() -> Option<Device> {
    None
}

pub fn describe(device: &Device) -> &'static str {
    if device.is_metal() {
        "metal"
    } else if device.is_cuda() {
        "cuda"
    } else {
        "cpu"
    }
}
