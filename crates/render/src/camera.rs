//! Camera placed in the traced scene
//!
//! The kernel only sees the flat [`CameraUniform`] record; this type keeps the
//! orientation as a quaternion and derives the basis vectors from it.

use compute::CameraUniform;
use glam::{EulerRot, Quat, Vec3};

use crate::RenderError;

/// Smallest hit epsilon accepted for a camera.
pub const MIN_DISTANCE_FLOOR: f32 = 0.0001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Sky color seen looking straight down
    pub up_sky_color: Vec3,
    /// Sky color seen looking straight up
    pub down_sky_color: Vec3,
    /// Hit epsilon, also the finite-difference step for normals
    pub min_distance: f32,
    /// Travel budget for a single march
    pub max_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -3.0),
            rotation: Quat::IDENTITY,
            up_sky_color: Vec3::ONE,
            down_sky_color: Vec3::new(0.5, 0.7, 1.0),
            min_distance: 0.001,
            max_distance: 1000.0,
        }
    }
}

impl Camera {
    /// Rotation from yaw (about +Y), pitch (about +X) and roll (about +Z), in
    /// degrees, applied in that order.
    #[must_use]
    pub fn rotation_from_euler_degrees(yaw: f32, pitch: f32, roll: f32) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        )
    }

    /// Default camera turned by the given Euler angles.
    #[must_use]
    pub fn from_euler_degrees(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self {
            rotation: Self::rotation_from_euler_degrees(yaw, pitch, roll),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Checks the values the kernel relies on.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidCamera`] for non-finite values, a
    /// non-normalizable rotation, `min_distance` below [`MIN_DISTANCE_FLOOR`],
    /// or `max_distance` not above `min_distance`.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.position.is_finite() {
            return Err(RenderError::InvalidCamera("position must be finite"));
        }
        if !self.rotation.is_finite() || self.rotation.length_squared() < f32::EPSILON {
            return Err(RenderError::InvalidCamera("rotation must be a finite, non-zero quaternion"));
        }
        if !self.up_sky_color.is_finite() || !self.down_sky_color.is_finite() {
            return Err(RenderError::InvalidCamera("sky colors must be finite"));
        }
        if !self.min_distance.is_finite() || !self.max_distance.is_finite() {
            return Err(RenderError::InvalidCamera("distances must be finite"));
        }
        if self.min_distance < MIN_DISTANCE_FLOOR {
            return Err(RenderError::InvalidCamera("min_distance is below 0.0001"));
        }
        if self.max_distance <= self.min_distance {
            return Err(RenderError::InvalidCamera("max_distance must exceed min_distance"));
        }
        Ok(())
    }

    /// Flattens the camera into the record bound at [`compute::layout::CAMERA`].
    ///
    /// The rotation is normalized first so the basis is orthonormal.
    #[must_use]
    pub fn to_uniform(&self) -> CameraUniform {
        let rotation = self.rotation.normalize();
        CameraUniform {
            position: self.position.to_array(),
            forward: (rotation * Vec3::Z).to_array(),
            right: (rotation * Vec3::X).to_array(),
            up: (rotation * Vec3::Y).to_array(),
            up_sky_color: self.up_sky_color.to_array(),
            down_sky_color: self.down_sky_color.to_array(),
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}
