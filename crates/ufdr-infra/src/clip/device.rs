//! Compute device selection for the ONNX sessions.
//!
//! The device is resolved once, before the model loads, and the resulting
//! execution-provider list is handed to both fastembed sessions so text and
//! image inference always run on the same device.

use ort::ep::{
    CPU as CPUExecutionProvider, CUDA as CUDAExecutionProvider, ExecutionProvider,
    ExecutionProviderDispatch,
};

use ufdr_types::embedding::{ComputeDevice, DevicePreference};
use ufdr_types::error::EmbeddingError;

/// Whether the ONNX runtime can use CUDA in this process.
pub fn cuda_available() -> bool {
    match CUDAExecutionProvider::default().is_available() {
        Ok(available) => available,
        Err(e) => {
            tracing::debug!("CUDA availability check failed: {e}");
            false
        }
    }
}

/// Resolve a preference against what the host offers.
pub fn resolve_device(
    preference: DevicePreference,
    cuda_available: bool,
) -> Result<ComputeDevice, EmbeddingError> {
    match (preference, cuda_available) {
        (DevicePreference::Auto, true) | (DevicePreference::Cuda, true) => Ok(ComputeDevice::Cuda),
        (DevicePreference::Auto, false) | (DevicePreference::Cpu, _) => Ok(ComputeDevice::Cpu),
        (DevicePreference::Cuda, false) => Err(EmbeddingError::ModelLoad(
            "CUDA was requested but no CUDA execution provider is available".to_string(),
        )),
    }
}

/// Probe the host and resolve `preference`.
pub fn select_device(preference: DevicePreference) -> Result<ComputeDevice, EmbeddingError> {
    let available = match preference {
        DevicePreference::Cpu => false,
        DevicePreference::Auto | DevicePreference::Cuda => cuda_available(),
    };
    let device = resolve_device(preference, available)?;
    tracing::info!(?preference, %device, "selected compute device");
    Ok(device)
}

/// Execution providers for `device`, in priority order.
pub fn execution_providers(device: ComputeDevice) -> Vec<ExecutionProviderDispatch> {
    match device {
        ComputeDevice::Cuda => vec![
            CUDAExecutionProvider::default().build(),
            CPUExecutionProvider::default().build(),
        ],
        ComputeDevice::Cpu => vec![CPUExecutionProvider::default().build()],
    }
}
