//! I/O helpers for grayscale images and JSON.
//!
//! - `load_grayscale_image`: decode a PNG/JPEG/etc. into an `ImageF32` holding
//!   luma intensities in `[0, 255]`.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, ImageU8};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert it to single-channel intensities.
pub fn load_grayscale_image(path: &Path) -> Result<ImageF32, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let raw = img.into_raw();
    let view = ImageU8::packed(width, height, &raw)
        .ok_or_else(|| format!("Decoded buffer too small for {}", path.display()))?;
    Ok(ImageF32::from_u8(view))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
