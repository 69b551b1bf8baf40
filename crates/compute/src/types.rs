//! GPU-compatible record layouts
//!
//! These are the flat records the host uploads and the kernel reads. Field
//! order and padding follow the WGSL uniform/storage layout rules for the
//! structs declared in `shaders/sphere_trace.wgsl`: a `vec3<f32>` is
//! 16-byte aligned and 12 bytes wide, so a trailing scalar may pack into its
//! last lane.

use bytemuck::{Pod, Zeroable};

use crate::ComputeError;

/// Camera record bound as a uniform buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub position: [f32; 3],
    pub _pad0: f32,
    /// Unit view direction
    pub forward: [f32; 3],
    pub _pad1: f32,
    pub right: [f32; 3],
    pub _pad2: f32,
    pub up: [f32; 3],
    pub _pad3: f32,
    pub up_sky_color: [f32; 3],
    pub _pad4: f32,
    pub down_sky_color: [f32; 3],
    /// Hit epsilon, also the finite-difference step for normals
    pub min_distance: f32,
    /// Travel budget for a single march
    pub max_distance: f32,
    pub _pad5: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<CameraUniform>() == 112);

/// One sphere as stored in the scene buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereGpu {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

const _: () = assert!(std::mem::size_of::<SphereGpu>() == 32);

/// Header preceding the runtime-sized sphere array.
///
/// `count` is the number of live spheres; the array may be allocated with
/// more records than that so the buffer does not have to be recreated every
/// time a sphere is added.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct SpheresHeader {
    pub count: u32,
    pub _pad: [u32; 3],
}

pub const SPHERES_HEADER_SIZE: usize = std::mem::size_of::<SpheresHeader>();
pub const SPHERE_STRIDE: usize = std::mem::size_of::<SphereGpu>();

impl SphereGpu {
    #[must_use]
    pub const fn new(position: [f32; 3], radius: f32, color: [f32; 3]) -> Self {
        Self { position, radius, color, _pad: 0.0 }
    }
}

/// Serializes `spheres` into the scene buffer layout.
///
/// The array is zero-filled up to `capacity` records and always holds at least
/// one record, since a storage binding cannot be empty.
#[must_use]
pub fn encode_spheres(spheres: &[SphereGpu], capacity: usize) -> Vec<u8> {
    let capacity = capacity.max(spheres.len()).max(1);
    let header = SpheresHeader {
        count: u32::try_from(spheres.len()).unwrap_or(u32::MAX),
        _pad: [0; 3],
    };

    let mut bytes = Vec::with_capacity(SPHERES_HEADER_SIZE + capacity * SPHERE_STRIDE);
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    bytes.extend_from_slice(bytemuck::cast_slice(spheres));
    bytes.resize(SPHERES_HEADER_SIZE + capacity * SPHERE_STRIDE, 0);
    bytes
}

/// Reads the live spheres out of a scene buffer.
///
/// # Errors
///
/// Returns [`ComputeError::ShapeMismatch`] if the header is truncated, the
/// array is not a whole number of records, or `count` exceeds the allocated
/// records.
pub fn decode_spheres(bytes: &[u8]) -> Result<Vec<SphereGpu>, ComputeError> {
    if bytes.len() < SPHERES_HEADER_SIZE {
        return Err(ComputeError::ShapeMismatch(
            "Spheres buffer is shorter than its header",
        ));
    }
    let (header_bytes, array_bytes) = bytes.split_at(SPHERES_HEADER_SIZE);
    if array_bytes.len() % SPHERE_STRIDE != 0 {
        return Err(ComputeError::ShapeMismatch(
            "Spheres buffer must hold a whole number of sphere records",
        ));
    }

    let header: SpheresHeader = bytemuck::pod_read_unaligned(header_bytes);
    let capacity = array_bytes.len() / SPHERE_STRIDE;
    let count = header.count as usize;
    if count > capacity {
        return Err(ComputeError::ShapeMismatch(
            "Sphere count exceeds the allocated sphere records",
        ));
    }

    // The Arc<[u8]> backing a BufferView only guarantees byte alignment.
    Ok(array_bytes[..count * SPHERE_STRIDE]
        .chunks_exact(SPHERE_STRIDE)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}
