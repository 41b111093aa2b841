//! Backend selection
//!
//! The crate trains on the CPU `ndarray` backend by default; the `wgpu`
//! feature switches every entry point to the GPU without touching the
//! pipeline code.

use burn::backend::Autodiff;

#[cfg(feature = "wgpu")]
pub type DefaultBackend = burn::backend::Wgpu<f32, i32>;

#[cfg(not(feature = "wgpu"))]
pub type DefaultBackend = burn::backend::NdArray<f32>;

/// The autodiff backend used for training
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// Version of the Burn engine this crate is built against
pub const BURN_VERSION: &str = "0.16";

/// Get the default device for the selected backend
pub fn default_device() -> <DefaultBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}

/// Human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "wgpu")]
    {
        "wgpu (GPU)"
    }
    #[cfg(not(feature = "wgpu"))]
    {
        "ndarray (CPU)"
    }
}

/// Whether a GPU backend was compiled in
pub fn gpu_available() -> bool {
    cfg!(feature = "wgpu")
}
