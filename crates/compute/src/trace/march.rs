use glam::Vec3;

use super::{sdf, Ray, Sphere};

/// Outcome of marching one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum March {
    Hit {
        /// Where the ray stopped, within `min_distance` of a surface.
        position: Vec3,
        /// Sphere nearest to `position` on the final step.
        sphere: usize,
        /// Sum of all steps taken.
        traveled: f32,
    },
    Miss,
}

/// Sphere-traces `ray` until it is within `min_distance` of a surface or has
/// traveled `max_distance`.
///
/// There is no step cap; only the travel budget ends a march that keeps
/// taking small steps. A non-finite travel distance ends the march as a miss,
/// and so does a step too small to change the origin or the traveled sum in
/// `f32`, since every later step would repeat it. An empty scene is reported
/// as a miss.
#[must_use]
pub fn march(spheres: &[Sphere], mut ray: Ray, min_distance: f32, max_distance: f32) -> March {
    let mut traveled = 0.0_f32;
    loop {
        let nearest = sdf(spheres, ray.origin);
        let Some(sphere) = nearest.index else {
            return March::Miss;
        };
        let advanced = ray.origin + ray.direction * nearest.distance;
        let next_traveled = traveled + nearest.distance;
        if nearest.distance < min_distance {
            return March::Hit { position: advanced, sphere, traveled: next_traveled };
        }
        if advanced == ray.origin || next_traveled == traveled {
            return March::Miss;
        }
        ray.origin = advanced;
        traveled = next_traveled;
        // also catches NaN
        if !(traveled < max_distance) {
            return March::Miss;
        }
    }
}

/// Same march as [`march`], keeping only whether anything was hit.
#[must_use]
pub fn does_hit(spheres: &[Sphere], ray: Ray, min_distance: f32, max_distance: f32) -> bool {
    matches!(march(spheres, ray, min_distance, max_distance), March::Hit { .. })
}
