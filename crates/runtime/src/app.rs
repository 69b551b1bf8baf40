//! # Render loop
//!
//! Loads the frames to render, applies the command-line overrides, renders
//! each frame on the chosen backend and writes it as a PNG. In watch mode the
//! scene file is reloaded and everything is rendered again on every change;
//! a broken edit is logged and the previous images are left in place.

use anyhow::{Context, Result};
use compute::{ComputeBackend, CpuBackend};
use render::{
    default_output_path, demo_frame, frame_output_path, load_scene, save_png, FrameConfig,
    FrameRenderer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::cli::{Args, BackendChoice};
use crate::watcher;

/// Quiet period after a change notification; editors often write a file in
/// several steps.
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Renders everything `args` asks for.
///
/// # Errors
///
/// Returns an error if the backend is unavailable, or if the scene cannot be
/// loaded or a frame fails to render or save before watching starts.
pub fn run(args: &Args) -> Result<()> {
    let renderer = FrameRenderer::new(make_backend(args.backend)?);
    let default_base = default_output_path();

    let frames = load_frames(args)?;
    render_all(&renderer, &frames, args, &default_base)?;

    if args.watch {
        if let Some(scene) = &args.scene {
            watch_loop(&renderer, scene, args, &default_base)?;
        }
    }
    Ok(())
}

fn make_backend(choice: BackendChoice) -> Result<Arc<dyn ComputeBackend>> {
    match choice {
        BackendChoice::Auto => Ok(compute::default_backend()),
        BackendChoice::Cpu => {
            info!("Using CPU backend.");
            Ok(Arc::new(CpuBackend::new()))
        }
        BackendChoice::Gpu => gpu_backend(),
    }
}

#[cfg(feature = "gpu")]
fn gpu_backend() -> Result<Arc<dyn ComputeBackend>> {
    let backend = compute::WgpuBackend::new().context("Failed to initialize the wgpu backend")?;
    info!("Using wgpu backend.");
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "gpu"))]
fn gpu_backend() -> Result<Arc<dyn ComputeBackend>> {
    anyhow::bail!("This build has no GPU backend; rebuild with `--features gpu`")
}

/// Frames from the scene file, or the demo frame, with overrides applied.
fn load_frames(args: &Args) -> Result<Vec<FrameConfig>> {
    let mut frames = match &args.scene {
        Some(path) => load_scene(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => vec![demo_frame()],
    };
    for frame in &mut frames {
        apply_overrides(frame, args);
    }
    Ok(frames)
}

fn apply_overrides(frame: &mut FrameConfig, args: &Args) {
    if let Some(width) = args.width {
        frame.width = width;
    }
    if let Some(height) = args.height {
        frame.height = height;
    }
}

/// Where frame `index` of `total` is written.
///
/// `--output` wins over the frame's own `output`; frames with neither share
/// the timestamped default name, numbered when there are several.
fn output_path(frame: &FrameConfig, index: usize, total: usize, args: &Args, default_base: &Path) -> PathBuf {
    match (&args.output, &frame.output) {
        (Some(output), _) => frame_output_path(output, index, total),
        (None, Some(output)) => output.clone(),
        (None, None) => frame_output_path(default_base, index, total),
    }
}

fn render_all(
    renderer: &FrameRenderer,
    frames: &[FrameConfig],
    args: &Args,
    default_base: &Path,
) -> Result<Vec<PathBuf>> {
    let total = frames.len();
    let mut written = Vec::with_capacity(total);
    for (index, frame) in frames.iter().enumerate() {
        let start = Instant::now();
        let image = renderer
            .render_frame(frame)
            .with_context(|| format!("Failed to render frame {}/{total}", index + 1))?;
        let path = output_path(frame, index, total, args, default_base);
        save_png(&image, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            "[{}/{}] rendered {}x{} in {} ms: {}",
            index + 1,
            total,
            frame.width,
            frame.height,
            start.elapsed().as_millis(),
            path.display()
        );
        written.push(path);
    }
    Ok(written)
}

fn watch_loop(renderer: &FrameRenderer, scene: &Path, args: &Args, default_base: &Path) -> Result<()> {
    let (_watcher, changes) = watcher::watch_file(scene)?;
    info!("Press Ctrl-C to stop.");
    while changes.recv().is_ok() {
        std::thread::sleep(DEBOUNCE);
        while changes.try_recv().is_ok() {}

        info!("Scene changed, re-rendering {}", scene.display());
        let rendered = load_frames(args).and_then(|frames| render_all(renderer, &frames, args, default_base));
        if let Err(e) = rendered {
            warn!("Skipping update: {e:#}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("spheretrace").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn overrides_apply_to_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("scene.json");
        std::fs::write(&scene, r#"{ "frames": [ { "width": 10 }, { "height": 20 } ] }"#).unwrap();
        let args = args(&["--scene", scene.to_str().unwrap(), "--width", "7"]);
        let frames = load_frames(&args).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.width == 7));
        assert_eq!(frames[1].height, 20);
    }

    #[test]
    fn demo_frame_without_scene() {
        let frames = load_frames(&args(&[])).unwrap();
        assert_eq!(frames, vec![demo_frame()]);
    }

    #[test]
    fn output_precedence() {
        let base = Path::new("render-default.png");
        let frame = FrameConfig { output: Some("own.png".into()), ..FrameConfig::default() };
        let plain = FrameConfig::default();

        let cli = args(&["--output", "cli.png"]);
        assert_eq!(output_path(&frame, 0, 1, &cli, base), Path::new("cli.png"));
        assert_eq!(output_path(&frame, 1, 2, &cli, base), Path::new("cli-001.png"));

        let none = args(&[]);
        assert_eq!(output_path(&frame, 0, 2, &none, base), Path::new("own.png"));
        assert_eq!(output_path(&plain, 1, 2, &none, base), Path::new("render-default-001.png"));
    }

    #[test]
    fn render_all_writes_each_frame() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let args = args(&["--output", out.to_str().unwrap(), "--width", "8", "--height", "6"]);
        let renderer = FrameRenderer::new(Arc::new(CpuBackend::new()));
        let frames = vec![FrameConfig::default(), demo_frame()];
        let frames: Vec<FrameConfig> = frames
            .into_iter()
            .map(|mut f| {
                apply_overrides(&mut f, &args);
                f
            })
            .collect();
        let written = render_all(&renderer, &frames, &args, Path::new("unused.png")).unwrap();
        assert_eq!(written, vec![dir.path().join("out-000.png"), dir.path().join("out-001.png")]);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[cfg(not(feature = "gpu"))]
    #[test]
    fn gpu_backend_requires_feature() {
        assert!(make_backend(BackendChoice::Gpu).is_err());
    }
}
