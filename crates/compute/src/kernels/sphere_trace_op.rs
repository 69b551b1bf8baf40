use crate::layout::{CAMERA, OUTPUT_IMAGE, PIXEL_SIZE, SPHERES, WORKGROUP_SIZE};
use crate::trace::{self, Sphere, TraceCamera};
use crate::types::{decode_spheres, CameraUniform};
use crate::{BufferView, ComputeError};
use glam::UVec2;
use rayon::prelude::*;

/// CPU implementation of the sphere tracing kernel.
///
/// Expects the bindings from [`crate::layout`]: the prior output image
/// (`[height, width]` RGBA8 pixels), one [`CameraUniform`], and the raw
/// spheres buffer. Every invocation of the `workgroups` grid that falls
/// inside the image writes its pixel; pixels the grid does not reach keep
/// their prior value. Returns the image bytes as the single output buffer.
pub fn handle_sphere_trace(
    binds: &[BufferView],
    workgroups: [u32; 3],
) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 3 {
        return Err(ComputeError::ShapeMismatch(
            "SphereTrace kernel expects 3 buffers (output image, camera, spheres)",
        ));
    }

    if !binds.iter().all(BufferView::is_consistent) {
        return Err(ComputeError::ShapeMismatch(
            "Buffer data length does not match its shape and element size",
        ));
    }

    let image_view = &binds[OUTPUT_IMAGE as usize];
    let camera_view = &binds[CAMERA as usize];
    let spheres_view = &binds[SPHERES as usize];

    if image_view.element_size_in_bytes != PIXEL_SIZE || image_view.shape.len() != 2 {
        return Err(ComputeError::ShapeMismatch(
            "Output image must be a [height, width] grid of RGBA8 pixels",
        ));
    }
    let (height, width) = (image_view.shape[0], image_view.shape[1]);
    if width == 0 || height == 0 {
        return Err(ComputeError::ShapeMismatch("Output image must not be empty"));
    }
    let size = UVec2::new(
        u32::try_from(width).map_err(|_| ComputeError::ShapeMismatch("Output image is too wide"))?,
        u32::try_from(height).map_err(|_| ComputeError::ShapeMismatch("Output image is too tall"))?,
    );

    if camera_view.element_size_in_bytes != std::mem::size_of::<CameraUniform>()
        || camera_view.shape != vec![1]
    {
        return Err(ComputeError::ShapeMismatch(
            "Camera buffer must contain a single CameraUniform",
        ));
    }
    let camera_uniform: CameraUniform = bytemuck::pod_read_unaligned(&camera_view.data);
    let camera = TraceCamera::from(&camera_uniform);

    if spheres_view.element_size_in_bytes != 1 {
        return Err(ComputeError::ShapeMismatch(
            "Spheres buffer must be bound as raw bytes",
        ));
    }
    let spheres: Vec<Sphere> = decode_spheres(&spheres_view.data)?
        .iter()
        .map(Sphere::from)
        .collect();

    let grid = UVec2::new(
        workgroups[0].saturating_mul(WORKGROUP_SIZE[0]),
        workgroups[1].saturating_mul(WORKGROUP_SIZE[1]),
    );
    let row_len = width.min(grid.x as usize);
    tracing::debug!(
        width,
        height,
        spheres = spheres.len(),
        ?workgroups,
        "dispatching sphere trace on CPU"
    );

    let mut pixels = image_view.data.to_vec();
    if workgroups[2] == 0 {
        return Ok(vec![pixels]);
    }
    pixels
        .par_chunks_mut(width * PIXEL_SIZE)
        .enumerate()
        .take(height.min(grid.y as usize))
        .for_each(|(y, row)| {
            #[allow(clippy::cast_possible_truncation)]
            let y = y as u32;
            for (x, pixel) in row.chunks_exact_mut(PIXEL_SIZE).take(row_len).enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let coord = UVec2::new(x as u32, y);
                if let Some(rgba) = trace::invoke(coord, size, &camera, &spheres) {
                    pixel.copy_from_slice(&rgba);
                }
            }
        });

    Ok(vec![pixels])
}
