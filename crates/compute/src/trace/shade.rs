use glam::Vec3;

use super::{does_hit, estimate_normal, march, March, Ray, Sphere, TraceCamera};

/// Direction the light travels, from the light toward the scene.
///
/// `normalize(0.3, -1.0, 0.4)`, written out so it can be a constant.
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(0.268_328_16, -0.894_427_2, 0.357_770_88);

/// Light floor so surfaces facing away from the light, or in shadow, are
/// never fully black.
pub const AMBIENT_LIGHT: f32 = 0.05;

/// Shadow rays start this many `min_distance`s off the surface along the normal.
pub const SHADOW_BIAS_SCALE: f32 = 2.0;

/// Vertical gradient returned for rays that hit nothing.
#[must_use]
pub fn sky_color(camera: &TraceCamera, direction: Vec3) -> Vec3 {
    let t = direction.y * 0.5 + 0.5;
    camera.up_sky_color * (1.0 - t) + camera.down_sky_color * t
}

/// Diffuse light reaching `point`, whose surface normal is `normal`.
///
/// Zero direct light when the shadow ray toward the light hits any sphere,
/// otherwise the cosine term; never below [`AMBIENT_LIGHT`].
#[must_use]
pub fn light_amount(spheres: &[Sphere], camera: &TraceCamera, point: Vec3, normal: Vec3) -> f32 {
    let to_light = -LIGHT_DIRECTION;
    let shadow_ray = Ray::new(
        point + normal * camera.min_distance * SHADOW_BIAS_SCALE,
        to_light,
    );
    let in_shadow = does_hit(spheres, shadow_ray, camera.min_distance, camera.max_distance);
    let visibility = if in_shadow { 0.0 } else { 1.0 };
    (visibility * normal.dot(to_light)).max(AMBIENT_LIGHT)
}

/// Color seen along a primary ray.
#[must_use]
pub fn shade(camera: &TraceCamera, spheres: &[Sphere], ray: Ray) -> Vec3 {
    // The empty-scene distance of 0.0 would otherwise read as a hit at the origin.
    if spheres.is_empty() {
        return sky_color(camera, ray.direction);
    }

    match march(spheres, ray, camera.min_distance, camera.max_distance) {
        March::Miss => sky_color(camera, ray.direction),
        March::Hit { position, sphere, .. } => {
            let normal = estimate_normal(spheres, position, camera.min_distance);
            spheres[sphere].color * light_amount(spheres, camera, position, normal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::fixtures::{camera, white_sphere};

    #[test]
    fn light_direction_is_normalized_reference_vector() {
        let expected = Vec3::new(0.3, -1.0, 0.4).normalize();
        assert!(LIGHT_DIRECTION.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn empty_scene_is_sky_for_every_direction() {
        let camera = camera();
        for direction in [
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::new(0.3, -0.2, 0.9).normalize(),
            Vec3::new(-1.0, 0.7, -0.1).normalize(),
        ] {
            let ray = Ray::new(camera.position, direction);
            assert_eq!(shade(&camera, &[], ray), sky_color(&camera, direction));
        }
    }

    #[test]
    fn sky_gradient_endpoints() {
        let camera = camera();
        assert_eq!(sky_color(&camera, Vec3::NEG_Y), camera.up_sky_color);
        assert_eq!(sky_color(&camera, Vec3::Y), camera.down_sky_color);
    }

    #[test]
    fn unoccluded_point_gets_cosine_term() {
        let camera = camera();
        let spheres = [white_sphere(Vec3::ZERO, 1.0)];
        let normal = -LIGHT_DIRECTION;
        let point = normal * 1.0;
        let amount = light_amount(&spheres, &camera, point, normal);
        assert_eq!(amount, normal.dot(-LIGHT_DIRECTION).max(AMBIENT_LIGHT));
        assert!(amount > 0.99);
    }

    #[test]
    fn surface_facing_away_gets_ambient_floor() {
        let camera = camera();
        let spheres = [white_sphere(Vec3::ZERO, 1.0)];
        let normal = LIGHT_DIRECTION;
        let point = normal * 1.0;
        assert_eq!(light_amount(&spheres, &camera, point, normal), AMBIENT_LIGHT);
    }

    #[test]
    fn occluder_toward_light_leaves_only_ambient() {
        let camera = camera();
        let normal = -LIGHT_DIRECTION;
        let lit_point = normal;
        let occluder = white_sphere(lit_point - LIGHT_DIRECTION * 3.0, 0.5);
        let spheres = [white_sphere(Vec3::ZERO, 1.0), occluder];
        assert_eq!(light_amount(&spheres, &camera, lit_point, normal), AMBIENT_LIGHT);

        let without = [spheres[0]];
        assert!(light_amount(&without, &camera, lit_point, normal) > AMBIENT_LIGHT);
    }

    #[test]
    fn shaded_hit_scales_sphere_color() {
        let camera = camera();
        let color = Vec3::new(0.2, 0.6, 1.0);
        let spheres = [Sphere::new(Vec3::ZERO, 1.0, color)];
        let ray = Ray::new(camera.position, Vec3::Z);
        let shaded = shade(&camera, &spheres, ray);

        let March::Hit { position, .. } = march(&spheres, ray, camera.min_distance, camera.max_distance) else {
            panic!("expected a hit");
        };
        let normal = estimate_normal(&spheres, position, camera.min_distance);
        let expected = color * light_amount(&spheres, &camera, position, normal);
        assert_eq!(shaded, expected);
        // Front face normal is -Z, partly facing the light.
        let cosine = Vec3::NEG_Z.dot(-LIGHT_DIRECTION);
        assert!(shaded.abs_diff_eq(color * cosine, 1e-3), "{shaded}");
    }

    #[test]
    fn shade_is_deterministic() {
        let camera = camera();
        let spheres = [
            white_sphere(Vec3::ZERO, 1.0),
            white_sphere(Vec3::new(0.5, 2.0, 0.0), 0.7),
        ];
        let ray = Ray::new(camera.position, Vec3::new(0.1, 0.2, 1.0).normalize());
        let a = shade(&camera, &spheres, ray);
        let b = shade(&camera, &spheres, ray);
        assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
    }
}
