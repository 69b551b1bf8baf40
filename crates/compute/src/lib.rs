#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # Sphere tracing compute kernel
//!
//! This crate owns the per-pixel sphere tracing kernel and the buffer contract
//! it is dispatched against. A [`Kernel`] is dispatched on a
//! [`ComputeBackend`] with a slice of [`BufferView`] bindings laid out as
//! described in [`layout`].
//!
//! Two backends implement the same contract:
//!
//! -   [`CpuBackend`] runs the reference kernel in [`trace`] on the host,
//!     one row of the image per `rayon` task.
//! -   `WgpuBackend` (feature `gpu`) dispatches `shaders/sphere_trace.wgsl`
//!     on a headless `wgpu` device and reads the output texture back.
//!
//! [`default_backend`] picks the GPU when one is available and falls back to
//! the CPU otherwise.

use std::sync::Arc;
use thiserror::Error;

pub mod backend;
pub mod cpu_backend;
pub mod kernels;
pub mod layout;
pub mod trace;
pub mod types;
#[cfg(feature = "gpu")]
pub mod wgpu_backend;

pub use backend::ComputeBackend;
pub use cpu_backend::CpuBackend;
pub use types::{CameraUniform, SphereGpu, SpheresHeader};
#[cfg(feature = "gpu")]
pub use wgpu_backend::WgpuBackend;

#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("buffer shape mismatch: {0}")]
    ShapeMismatch(&'static str),
    #[error("backend not available")]
    BackendUnavailable,
    #[error("gpu error: {0}")]
    Gpu(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Renders analytic spheres into an RGBA8 image, one invocation per pixel.
    SphereTrace,
}

impl Kernel {
    #[must_use]
    pub const fn binding_count(&self) -> u32 {
        layout::binding_count(self)
    }
}

#[derive(Clone, Debug)]
pub struct BufferView {
    pub data: Arc<[u8]>,
    pub shape: Vec<usize>, // Number of elements per dimension
    pub element_size_in_bytes: usize, // Size of a single element described by the innermost dimension of shape
}

impl BufferView {
    #[must_use]
    pub fn new(data: Arc<[u8]>, shape: Vec<usize>, element_size_in_bytes: usize) -> Self {
        Self { data, shape, element_size_in_bytes }
    }

    /// Wraps a slice of `Pod` records as a one-dimensional view.
    #[must_use]
    pub fn from_pod_slice<T: bytemuck::Pod>(items: &[T]) -> Self {
        let bytes: Arc<[u8]> = bytemuck::cast_slice(items).to_vec().into();
        Self::new(bytes, vec![items.len()], std::mem::size_of::<T>())
    }

    /// Wraps raw bytes whose internal layout the kernel decodes itself.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self::new(bytes.into(), vec![len], 1)
    }

    /// Returns `true` if the data length agrees with `shape` and element size.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let expected_elements = self.shape.iter().product::<usize>();
        self.data.len() == expected_elements * self.element_size_in_bytes
    }
}

/// Returns a compute backend if available, falling back to the CPU implementation.
///
/// With the `gpu` feature enabled this will attempt to create a
/// `WgpuBackend`. If no adapter can be found, a [`CpuBackend`] is returned.
#[must_use]
pub fn default_backend() -> Arc<dyn ComputeBackend> {
    #[cfg(feature = "gpu")]
    {
        match WgpuBackend::new() {
            Ok(gpu) => {
                tracing::info!("Using wgpu backend.");
                return Arc::new(gpu);
            }
            Err(e) => tracing::warn!("wgpu backend initialization failed ({e}), falling back..."),
        }
    }

    tracing::info!("Using CPU backend.");
    Arc::new(CpuBackend::new())
}
