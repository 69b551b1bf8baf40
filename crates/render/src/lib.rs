#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # Sphere tracing host
//!
//! Everything around the kernel in [`compute`]: a [`Camera`] and the scene's
//! [`SceneSpheres`], JSON scene files ([`config`]), the [`FrameRenderer`]
//! that dispatches the kernel and collects the image, and PNG [`output`].

pub mod camera;
pub mod config;
mod error;
pub mod output;
pub mod renderer;
pub mod scene;

pub use camera::Camera;
pub use config::{demo_frame, load_scene, parse_scene, validate_frame, CameraConfig, FrameConfig, SphereConfig};
pub use error::RenderError;
pub use output::{default_output_path, frame_output_path, save_png};
pub use renderer::FrameRenderer;
pub use scene::SceneSpheres;
