use glam::{UVec2, Vec2, Vec3};

use super::{shade, Ray, Sphere, TraceCamera};

/// Maps a pixel to the view plane.
///
/// `x` spans `[-aspect, aspect)` left to right and `y` spans `(-1, 1]` bottom
/// to top, so pixel `(0, 0)` at the top-left maps to `(-aspect, 1)`.
#[must_use]
pub fn pixel_to_ndc(coord: UVec2, size: UVec2) -> Vec2 {
    let aspect = size.x as f32 / size.y as f32;
    let uv = coord.as_vec2() / size.as_vec2() * 2.0 - 1.0;
    Vec2::new(uv.x * aspect, -uv.y)
}

/// Camera ray through pixel `coord` of an image of `size` pixels.
#[must_use]
pub fn primary_ray(camera: &TraceCamera, coord: UVec2, size: UVec2) -> Ray {
    let ndc = pixel_to_ndc(coord, size);
    let direction = (camera.right * ndc.x + camera.up * ndc.y + camera.forward).normalize();
    Ray::new(camera.position, direction)
}

/// Quantizes a linear color to RGBA8 with opaque alpha, as an `rgba8unorm`
/// store does.
#[must_use]
pub fn to_rgba8(color: Vec3) -> [u8; 4] {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), u8::MAX]
}

/// One kernel invocation.
///
/// Returns `None` when `coord` lies outside the image, which happens for the
/// overshooting part of the last row and column of tiles; nothing may be
/// written for those invocations.
#[must_use]
pub fn invoke(coord: UVec2, size: UVec2, camera: &TraceCamera, spheres: &[Sphere]) -> Option<[u8; 4]> {
    if coord.x >= size.x || coord.y >= size.y {
        return None;
    }
    let ray = primary_ray(camera, coord, size);
    Some(to_rgba8(shade(camera, spheres, ray)))
}
