//! CPU reference implementation of the sphere tracing kernel
//!
//! The kernel is a fixed pipeline of pure functions evaluated once per pixel:
//!
//! 1.  [`primary_ray`] builds a camera ray for the pixel,
//! 2.  [`march`] steps the ray through the distance field given by [`sdf`],
//! 3.  [`shade`] turns the result into a color, casting a shadow ray through
//!     [`does_hit`] on a hit,
//! 4.  [`invoke`] applies the bounds guard and quantizes to RGBA8.
//!
//! Nothing here holds state between calls; the scene and camera are passed in
//! by reference and the ray being marched is a local copy. The WGSL kernel in
//! `shaders/sphere_trace.wgsl` mirrors these functions one for one.

use glam::Vec3;

use crate::types::{CameraUniform, SphereGpu};

mod dispatch;
mod march;
mod sdf;
mod shade;

pub use dispatch::{invoke, pixel_to_ndc, primary_ray, to_rgba8};
pub use march::{does_hit, march, March};
pub use sdf::{estimate_normal, sdf, Nearest};
pub use shade::{light_amount, shade, sky_color, AMBIENT_LIGHT, LIGHT_DIRECTION, SHADOW_BIAS_SCALE};

/// A ray being marched; `direction` is expected to be unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    /// Linear RGB in `[0, 1]`
    pub color: Vec3,
}

impl Sphere {
    #[must_use]
    pub const fn new(position: Vec3, radius: f32, color: Vec3) -> Self {
        Self { position, radius, color }
    }
}

impl Default for Sphere {
    /// Unit white sphere at the origin.
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0, Vec3::ONE)
    }
}

impl From<&SphereGpu> for Sphere {
    fn from(sphere: &SphereGpu) -> Self {
        Self {
            position: Vec3::from_array(sphere.position),
            radius: sphere.radius,
            color: Vec3::from_array(sphere.color),
        }
    }
}

impl From<&Sphere> for SphereGpu {
    fn from(sphere: &Sphere) -> Self {
        SphereGpu::new(sphere.position.to_array(), sphere.radius, sphere.color.to_array())
    }
}

/// Decoded camera record.
///
/// `forward`, `right` and `up` are taken as given; the kernel does not
/// re-orthonormalize them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceCamera {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub up_sky_color: Vec3,
    pub down_sky_color: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl From<&CameraUniform> for TraceCamera {
    fn from(camera: &CameraUniform) -> Self {
        Self {
            position: Vec3::from_array(camera.position),
            forward: Vec3::from_array(camera.forward),
            right: Vec3::from_array(camera.right),
            up: Vec3::from_array(camera.up),
            up_sky_color: Vec3::from_array(camera.up_sky_color),
            down_sky_color: Vec3::from_array(camera.down_sky_color),
            min_distance: camera.min_distance,
            max_distance: camera.max_distance,
        }
    }
}

impl From<&TraceCamera> for CameraUniform {
    fn from(camera: &TraceCamera) -> Self {
        Self {
            position: camera.position.to_array(),
            forward: camera.forward.to_array(),
            right: camera.right.to_array(),
            up: camera.up.to_array(),
            up_sky_color: camera.up_sky_color.to_array(),
            down_sky_color: camera.down_sky_color.to_array(),
            min_distance: camera.min_distance,
            max_distance: camera.max_distance,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Sphere, TraceCamera};
    use glam::Vec3;

    /// Axis-aligned camera at `(0, 0, -3)` looking down +Z.
    pub fn camera() -> TraceCamera {
        TraceCamera {
            position: Vec3::new(0.0, 0.0, -3.0),
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            up_sky_color: Vec3::ONE,
            down_sky_color: Vec3::new(0.5, 0.7, 1.0),
            min_distance: 0.001,
            max_distance: 1000.0,
        }
    }

    pub fn white_sphere(position: Vec3, radius: f32) -> Sphere {
        Sphere::new(position, radius, Vec3::ONE)
    }
}
