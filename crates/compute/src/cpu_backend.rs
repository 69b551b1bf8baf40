use crate::{kernels, BufferView, ComputeBackend, ComputeError, Kernel};

#[derive(Default, Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for CpuBackend {
    fn dispatch(
        &self,
        shader: &Kernel,
        binds: &[BufferView],
        workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError> {
        if binds.len() != shader.binding_count() as usize {
            return Err(ComputeError::ShapeMismatch(
                "Binding count does not match the kernel's layout",
            ));
        }
        if !binds.iter().all(BufferView::is_consistent) {
            return Err(ComputeError::ShapeMismatch(
                "Buffer data length does not match product of shape dimensions and element size",
            ));
        }
        match shader {
            Kernel::SphereTrace => kernels::handle_sphere_trace(binds, workgroups),
        }
    }
}
