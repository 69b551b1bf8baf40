//! Frame rendering on a compute backend
//!
//! [`FrameRenderer`] is the host side of the kernel: it validates the scene,
//! lays out the three bindings, dispatches one workgroup per `16 x 16` tile
//! and turns the returned bytes into an image.

use std::sync::Arc;
use std::time::Instant;

use compute::layout::{workgroup_count, PIXEL_SIZE};
use compute::{BufferView, ComputeBackend, Kernel};
use image::RgbaImage;

use crate::camera::Camera;
use crate::config::{validate_frame, FrameConfig};
use crate::scene::SceneSpheres;
use crate::RenderError;

pub struct FrameRenderer {
    backend: Arc<dyn ComputeBackend>,
}

impl FrameRenderer {
    #[must_use]
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self { backend }
    }

    /// Renderer on [`compute::default_backend`].
    #[must_use]
    pub fn with_default_backend() -> Self {
        Self::new(compute::default_backend())
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn ComputeBackend> {
        &self.backend
    }

    /// Renders `spheres` as seen by `camera` into a `width` x `height` image.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty image size, an invalid camera or sphere,
    /// or a failed dispatch.
    pub fn render(
        &self,
        camera: &Camera,
        spheres: &SceneSpheres,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidFrame(format!(
                "image size {width}x{height} must be non-zero"
            )));
        }
        camera.validate()?;
        spheres.validate()?;

        let start = Instant::now();
        let pixels = width as usize * height as usize;
        let binds = [
            BufferView::new(
                vec![0u8; pixels * PIXEL_SIZE].into(),
                vec![height as usize, width as usize],
                PIXEL_SIZE,
            ),
            BufferView::from_pod_slice(&[camera.to_uniform()]),
            BufferView::from_bytes(spheres.to_bytes()),
        ];
        let workgroups = workgroup_count(width, height);

        let mut outputs = self.backend.dispatch(&Kernel::SphereTrace, &binds, workgroups)?;
        let bytes = if outputs.is_empty() { Vec::new() } else { outputs.swap_remove(0) };
        let actual = bytes.len();
        let image = RgbaImage::from_raw(width, height, bytes)
            .ok_or(RenderError::OutputSize { width, height, actual })?;

        tracing::info!(
            width,
            height,
            spheres = spheres.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "rendered frame"
        );
        Ok(image)
    }

    /// Renders a frame description.
    ///
    /// # Errors
    ///
    /// As [`validate_frame`] and [`Self::render`].
    pub fn render_frame(&self, frame: &FrameConfig) -> Result<RgbaImage, RenderError> {
        validate_frame(frame)?;
        self.render(&frame.camera(), &frame.spheres(), frame.width, frame.height)
    }
}
