//! PNG and animation file output, and output path generation

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

fn create_parent_dirs(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    create_parent_dirs(path)?;
    image.save(path)?;
    Ok(())
}

/// Write serialized animation text, creating parent directories as needed.
pub fn save_animation_text(text: &str, path: &Path) -> Result<(), OutputError> {
    create_parent_dirs(path)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Default atlas path for a source sheet: `hero.png` → `hero_packed.png`.
pub fn default_atlas_path(image: &Path) -> PathBuf {
    let stem = image.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    image.with_file_name(format!("{}_packed.png", stem))
}

/// Animation file written alongside an atlas: `out/hero_packed.png` → `out/hero_packed.animation`.
pub fn animation_path_for(atlas: &Path) -> PathBuf {
    atlas.with_extension("animation")
}
