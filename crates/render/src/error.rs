use compute::ComputeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid camera: {0}")]
    InvalidCamera(&'static str),
    #[error("invalid sphere {index}: {reason}")]
    InvalidSphere { index: usize, reason: &'static str },
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error("backend returned {actual} bytes for a {width}x{height} image")]
    OutputSize { width: u32, height: u32, actual: usize },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("scene file error: {0}")]
    Json(#[from] serde_json::Error),
}
