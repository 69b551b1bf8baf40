use glam::Vec3;

use super::Sphere;

/// Result of one distance field evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// Signed distance to the closest surface, negative inside a sphere.
    pub distance: f32,
    /// Index of the sphere that produced `distance`; `None` for an empty scene.
    pub index: Option<usize>,
}

/// Signed distance from `point` to the union of `spheres`.
///
/// Linear scan; on an exact tie the earlier sphere wins. An empty scene
/// reports a distance of `0.0` with no index, so callers must rule out the
/// empty case before reading that as a surface contact.
#[must_use]
pub fn sdf(spheres: &[Sphere], point: Vec3) -> Nearest {
    let mut nearest = Nearest { distance: 0.0, index: None };
    for (index, sphere) in spheres.iter().enumerate() {
        let distance = point.distance(sphere.position) - sphere.radius;
        if nearest.index.is_none() || distance < nearest.distance {
            nearest = Nearest { distance, index: Some(index) };
        }
    }
    nearest
}

/// Surface normal at `point` from central differences of [`sdf`].
///
/// Only meaningful close to a surface. Far from every sphere, or for an empty
/// scene, the gradient may be zero and the result is not a unit vector.
#[must_use]
pub fn estimate_normal(spheres: &[Sphere], point: Vec3, epsilon: f32) -> Vec3 {
    let dx = Vec3::new(epsilon, 0.0, 0.0);
    let dy = Vec3::new(0.0, epsilon, 0.0);
    let dz = Vec3::new(0.0, 0.0, epsilon);
    Vec3::new(
        sdf(spheres, point + dx).distance - sdf(spheres, point - dx).distance,
        sdf(spheres, point + dy).distance - sdf(spheres, point - dy).distance,
        sdf(spheres, point + dz).distance - sdf(spheres, point - dz).distance,
    )
    .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::fixtures::white_sphere;

    #[test]
    fn empty_scene_reports_zero_without_index() {
        let nearest = sdf(&[], Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(nearest, Nearest { distance: 0.0, index: None });
    }

    #[test]
    fn distance_is_negative_inside_and_zero_on_surface() {
        let spheres = [white_sphere(Vec3::ZERO, 2.0)];
        assert!((sdf(&spheres, Vec3::ZERO).distance + 2.0).abs() < 1e-6);
        let on_surface = Vec3::new(2.0, 0.0, 0.0);
        assert!(sdf(&spheres, on_surface).distance.abs() < 0.001);
        let diagonal = Vec3::new(1.0, 1.0, 1.0).normalize() * 2.0;
        assert!(sdf(&spheres, diagonal).distance.abs() < 0.001);
    }

    #[test]
    fn nearest_sphere_is_selected() {
        let spheres = [
            white_sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0),
            white_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0),
        ];
        let nearest = sdf(&spheres, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(nearest.index, Some(1));
        assert!((nearest.distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn first_sphere_wins_exact_ties() {
        let spheres = [
            white_sphere(Vec3::new(-2.0, 0.0, 0.0), 1.0),
            white_sphere(Vec3::new(2.0, 0.0, 0.0), 1.0),
        ];
        assert_eq!(sdf(&spheres, Vec3::ZERO).index, Some(0));
    }

    #[test]
    fn normal_points_radially_outward() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let epsilon = 0.001;
        let spheres = [white_sphere(center, 10.0 * epsilon * 50.0)];
        for dir in [Vec3::X, Vec3::NEG_Y, Vec3::new(1.0, 2.0, -3.0).normalize()] {
            let point = center + dir * spheres[0].radius;
            let normal = estimate_normal(&spheres, point, epsilon);
            assert!(normal.dot(dir) > 0.99, "normal {normal} vs {dir}");
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn normal_is_accurate_at_smallest_supported_radius() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let epsilon = 0.001;
        let spheres = [white_sphere(center, 10.0 * epsilon)];
        for dir in [Vec3::X, Vec3::NEG_Z, Vec3::new(-1.0, 1.0, 2.0).normalize()] {
            let point = center + dir * spheres[0].radius;
            let normal = estimate_normal(&spheres, point, epsilon);
            assert!(normal.dot(dir) > 0.99, "normal {normal} vs {dir}");
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }
}
