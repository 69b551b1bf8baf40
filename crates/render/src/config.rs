//! JSON scene descriptions
//!
//! A scene file is either a single frame or `{ "frames": [...] }`. Every
//! field has a default, so `{}` is a valid frame rendering the default camera
//! with no spheres.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use compute::trace::Sphere;
use glam::Vec3;

use crate::camera::Camera;
use crate::scene::SceneSpheres;
use crate::RenderError;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees about +Y
    pub yaw: f32,
    /// Degrees about +X
    pub pitch: f32,
    /// Degrees about +Z
    pub roll: f32,
    pub up_sky_color: [f32; 3],
    pub down_sky_color: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: camera.position.to_array(),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            up_sky_color: camera.up_sky_color.to_array(),
            down_sky_color: camera.down_sky_color.to_array(),
            min_distance: camera.min_distance,
            max_distance: camera.max_distance,
        }
    }
}

impl From<&CameraConfig> for Camera {
    fn from(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            rotation: Camera::rotation_from_euler_degrees(config.yaw, config.pitch, config.roll),
            up_sky_color: Vec3::from_array(config.up_sky_color),
            down_sky_color: Vec3::from_array(config.down_sky_color),
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SphereConfig {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
}

impl Default for SphereConfig {
    fn default() -> Self {
        (&Sphere::default()).into()
    }
}

impl From<&Sphere> for SphereConfig {
    fn from(sphere: &Sphere) -> Self {
        Self {
            position: sphere.position.to_array(),
            radius: sphere.radius,
            color: sphere.color.to_array(),
        }
    }
}

impl From<&SphereConfig> for Sphere {
    fn from(config: &SphereConfig) -> Self {
        Sphere::new(
            Vec3::from_array(config.position),
            config.radius,
            Vec3::from_array(config.color),
        )
    }
}

/// One image to render.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    /// Where to write the PNG; a timestamped name is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub camera: CameraConfig,
    pub spheres: Vec<SphereConfig>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            output: None,
            camera: CameraConfig::default(),
            spheres: Vec::new(),
        }
    }
}

impl FrameConfig {
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::from(&self.camera)
    }

    #[must_use]
    pub fn spheres(&self) -> SceneSpheres {
        self.spheres.iter().map(Sphere::from).collect()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Batch {
    frames: Vec<FrameConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SceneFile {
    Batch(Batch),
    Single(FrameConfig),
}

/// Parses a scene description into its frames.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if the text is neither a frame nor a batch,
/// and [`RenderError::InvalidFrame`] for an empty batch.
pub fn parse_scene(json: &str) -> Result<Vec<FrameConfig>, RenderError> {
    let frames = match serde_json::from_str(json)? {
        SceneFile::Batch(batch) => batch.frames,
        SceneFile::Single(frame) => vec![frame],
    };
    if frames.is_empty() {
        return Err(RenderError::InvalidFrame("scene contains no frames".into()));
    }
    Ok(frames)
}

/// Reads and parses a scene file.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the file cannot be read, otherwise as
/// [`parse_scene`].
pub fn load_scene(path: &Path) -> Result<Vec<FrameConfig>, RenderError> {
    let json = std::fs::read_to_string(path)?;
    let frames = parse_scene(&json)?;
    tracing::debug!(path = %path.display(), frames = frames.len(), "loaded scene");
    Ok(frames)
}

/// Checks that a frame can be rendered.
///
/// # Errors
///
/// Returns [`RenderError::InvalidFrame`] for a zero-sized image, or the
/// camera or sphere validation error.
pub fn validate_frame(frame: &FrameConfig) -> Result<(), RenderError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(RenderError::InvalidFrame(format!(
            "image size {}x{} must be non-zero",
            frame.width, frame.height
        )));
    }
    frame.camera().validate()?;
    frame.spheres().validate()
}

/// Built-in scene rendered when no scene file is given.
#[must_use]
pub fn demo_frame() -> FrameConfig {
    let sphere = |position: [f32; 3], radius: f32, color: [f32; 3]| SphereConfig { position, radius, color };
    FrameConfig {
        camera: CameraConfig {
            position: [0.0, 1.0, -4.0],
            pitch: 12.0,
            ..CameraConfig::default()
        },
        spheres: vec![
            sphere([0.0, 0.0, 0.0], 1.0, [1.0, 1.0, 1.0]),
            sphere([-1.8, -0.4, 0.6], 0.6, [0.9, 0.3, 0.2]),
            sphere([1.6, 0.5, 0.9], 0.5, [0.2, 0.5, 0.9]),
            sphere([0.0, -101.0, 0.0], 100.0, [0.6, 0.7, 0.5]),
        ],
        ..FrameConfig::default()
    }
}
