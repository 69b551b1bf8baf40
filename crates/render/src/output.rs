use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::RenderError;

/// Writes `image` as a PNG, creating missing parent directories.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the directory cannot be created and
/// [`RenderError::Image`] if encoding or writing fails.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, ImageFormat::Png)?;
    tracing::debug!(path = %path.display(), "saved image");
    Ok(())
}

/// `render-YYYYmmdd-HHMMSS.png` in the working directory, local time.
#[must_use]
pub fn default_output_path() -> PathBuf {
    PathBuf::from(chrono::Local::now().format("render-%Y%m%d-%H%M%S.png").to_string())
}

/// Path for frame `index` of a batch of `total` frames sharing `base`.
///
/// A single frame keeps `base`; otherwise the index is appended to the file
/// stem so frames do not overwrite each other.
#[must_use]
pub fn frame_output_path(base: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("render");
    let extension = base.extension().and_then(|s| s.to_str()).unwrap_or("png");
    base.with_file_name(format!("{stem}-{index:03}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_timestamped_png() {
        let path = default_output_path();
        let name = path.to_str().unwrap();
        assert!(name.starts_with("render-"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "render-20240101-120000.png".len());
    }

    #[test]
    fn batch_frames_get_numbered_names() {
        let base = Path::new("out/scene.png");
        assert_eq!(frame_output_path(base, 0, 1), base);
        assert_eq!(frame_output_path(base, 2, 5), Path::new("out/scene-002.png"));
    }

    #[test]
    fn saved_png_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.png");
        let image = RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8 * 80, y as u8 * 120, 7, 255]));
        save_png(&image, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, image);
    }
}
