use crate::{BufferView, ComputeError, Kernel};

pub trait ComputeBackend: Send + Sync + 'static {
    /// Dispatches a kernel with the given bindings and workgroup configuration.
    ///
    /// # Arguments
    /// * `shader`: The kernel to dispatch.
    /// * `binds`: One `BufferView` per binding slot, in the order given by
    ///            [`crate::layout`]. The output image slot carries the image's
    ///            prior content; pixels the dispatch does not reach keep it.
    /// * `workgroups`: The number of workgroups to dispatch. Each workgroup
    ///            covers a `16 x 16` tile of the output image.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Vec<Vec<u8>>)` holding one buffer per written binding, in
    /// binding order. For [`Kernel::SphereTrace`] that is the tightly packed
    /// RGBA8 image, row-major from the top-left pixel.
    /// Returns `ComputeError::ShapeMismatch` if any input buffers are invalid.
    /// May return other `ComputeError` variants depending on the backend implementation.
    fn dispatch(
        &self,
        shader: &Kernel,
        binds: &[BufferView],
        workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError>;
}
