//! GPU implementation of [`ComputeBackend`] built on [`wgpu`].
//!
//! The `WgpuBackend` compiles `shaders/sphere_trace.wgsl` once per kernel and
//! dispatches it on a headless device. It mirrors the CPU backend's behavior:
//! the prior image is uploaded into the storage texture before the dispatch,
//! so pixels the grid does not reach read back unchanged. Initialization will
//! fail if no compatible adapter is found.

use crate::layout::{CAMERA, OUTPUT_IMAGE, PIXEL_SIZE, SPHERES};
use crate::types::{decode_spheres, CameraUniform};
use crate::{BufferView, ComputeBackend, ComputeError, Kernel};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;
use wgpu::util::DeviceExt;

const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct CachedPipeline {
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

/// GPU-backed implementation of [`ComputeBackend`] built on `wgpu`.
///
/// Pipelines are built lazily on first dispatch and reused afterwards.
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipelines: Mutex<HashMap<Kernel, Arc<CachedPipeline>>>,
}

impl WgpuBackend {
    /// Creates a new backend using the system's default high-performance GPU.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::BackendUnavailable`] if no adapter is found and
    /// [`ComputeError::Gpu`] if the device request fails.
    pub fn new() -> Result<Self, ComputeError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or(ComputeError::BackendUnavailable)?;

        let info = adapter.get_info();
        tracing::debug!(name = %info.name, backend = ?info.backend, "selected adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sphere trace device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(|e| ComputeError::Gpu(e.to_string()))?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            pipelines: Mutex::new(HashMap::new()),
        })
    }

    fn pipeline(&self, kernel: &Kernel) -> Arc<CachedPipeline> {
        let mut cache = self.pipelines.lock();
        Arc::clone(
            cache
                .entry(*kernel)
                .or_insert_with(|| Arc::new(self.build_pipeline(kernel))),
        )
    }

    fn build_pipeline(&self, kernel: &Kernel) -> CachedPipeline {
        tracing::debug!(kernel = kernel_name(kernel), "building compute pipeline");
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kernel_name(kernel)),
                source: wgpu::ShaderSource::Wgsl(to_shader_source(kernel).into()),
            });

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Sphere Trace Bind Group Layout"),
                    entries: &layout_entries(kernel),
                });

        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Sphere Trace Pipeline Layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });

        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(kernel_name(kernel)),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: "main",
            });

        CachedPipeline { bind_group_layout, pipeline }
    }
}

/// Returns the label used for a given [`Kernel`]'s shader and pipeline.
fn kernel_name(kernel: &Kernel) -> &'static str {
    match kernel {
        Kernel::SphereTrace => "sphere_trace",
    }
}

/// Provides the WGSL shader source associated with the kernel.
fn to_shader_source(kernel: &Kernel) -> &'static str {
    match kernel {
        Kernel::SphereTrace => include_str!("../../../shaders/sphere_trace.wgsl"),
    }
}

fn layout_entries(kernel: &Kernel) -> Vec<wgpu::BindGroupLayoutEntry> {
    match kernel {
        Kernel::SphereTrace => vec![
            wgpu::BindGroupLayoutEntry {
                binding: OUTPUT_IMAGE,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: OUTPUT_FORMAT,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: CAMERA,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SPHERES,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    }
}

/// Row pitch of a texture-to-buffer copy, padded to the copy alignment.
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * PIXEL_SIZE as u32;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

impl ComputeBackend for WgpuBackend {
    #[allow(clippy::too_many_lines)]
    fn dispatch(
        &self,
        kernel: &Kernel,
        bindings: &[BufferView],
        workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError> {
        if bindings.len() != kernel.binding_count() as usize {
            return Err(ComputeError::ShapeMismatch(
                "Binding count does not match the kernel's layout",
            ));
        }
        if !bindings.iter().all(BufferView::is_consistent) {
            return Err(ComputeError::ShapeMismatch(
                "Buffer data length does not match product of shape dimensions and element size",
            ));
        }

        let image_view = &bindings[OUTPUT_IMAGE as usize];
        let camera_view = &bindings[CAMERA as usize];
        let spheres_view = &bindings[SPHERES as usize];
        if image_view.element_size_in_bytes != PIXEL_SIZE || image_view.shape.len() != 2 {
            return Err(ComputeError::ShapeMismatch(
                "Output image must be a [height, width] grid of RGBA8 pixels",
            ));
        }
        let height = u32::try_from(image_view.shape[0])
            .map_err(|_| ComputeError::ShapeMismatch("Output image is too tall"))?;
        let width = u32::try_from(image_view.shape[1])
            .map_err(|_| ComputeError::ShapeMismatch("Output image is too wide"))?;
        if width == 0 || height == 0 {
            return Err(ComputeError::ShapeMismatch("Output image must not be empty"));
        }
        if camera_view.data.len() != std::mem::size_of::<CameraUniform>() {
            return Err(ComputeError::ShapeMismatch(
                "Camera buffer must contain a single CameraUniform",
            ));
        }
        // Same checks the CPU kernel applies; the shader trusts `count`.
        decode_spheres(&spheres_view.data)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let cached = self.pipeline(kernel);

        let extent = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Output Image"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image_view.data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * PIXEL_SIZE as u32),
                rows_per_image: Some(height),
            },
            extent,
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let camera_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera"),
                contents: &camera_view.data,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let spheres_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Spheres"),
                contents: &spheres_view.data,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sphere Trace Bind Group"),
            layout: &cached.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: OUTPUT_IMAGE,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: CAMERA,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: SPHERES,
                    resource: spheres_buffer.as_entire_binding(),
                },
            ],
        });

        let padded_row = padded_bytes_per_row(width);
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Output Staging Buffer"),
            size: u64::from(padded_row) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Sphere Trace Pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&cached.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            cpass.dispatch_workgroups(workgroups[0], workgroups[1], workgroups[2]);
        }
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            extent,
        );
        self.queue.submit(Some(encoder.finish()));

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ComputeError::Gpu(error.to_string()));
        }

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| ComputeError::Gpu(e.to_string()))?
            .map_err(|e| ComputeError::Gpu(e.to_string()))?;

        let row_len = width as usize * PIXEL_SIZE;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        {
            let mapped = buffer_slice.get_mapped_range();
            for row in mapped.chunks_exact(padded_row as usize) {
                pixels.extend_from_slice(&row[..row_len]);
            }
        }
        staging_buffer.unmap();

        tracing::trace!(width, height, ?workgroups, "sphere trace read back");
        Ok(vec![pixels])
    }
}
