use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Render analytic spheres with a sphere tracing compute kernel
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// JSON scene file, a single frame or `{ "frames": [...] }`
    #[arg(short, long)]
    pub scene: Option<PathBuf>,

    /// Output PNG path; numbered per frame when the scene has several
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image width in pixels, overriding every frame
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels, overriding every frame
    #[arg(long)]
    pub height: Option<u32>,

    /// Compute backend to dispatch the kernel on
    #[arg(short, long, value_enum, default_value_t = BackendChoice::Auto)]
    pub backend: BackendChoice,

    /// Keep running and re-render whenever the scene file changes
    #[arg(short, long, requires = "scene")]
    pub watch: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendChoice {
    /// GPU when an adapter is available, CPU otherwise
    Auto,
    Cpu,
    Gpu,
}
