//! Cover image normalisation.
//!
//! The format is sniffed from the file content, so a PNG saved as `.bmp`
//! is still copied untouched and a BMP saved as `.png` is still transcoded.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::{COVER_FILE, InstallError};

/// Formats the web front end displays directly; these are copied byte-for-byte.
const PASSTHROUGH_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

/// Cover image ready to be written as `cover.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverImage {
    /// Source bytes kept as-is.
    Copied { format: ImageFormat, bytes: Vec<u8> },
    /// Source decoded and re-encoded as PNG.
    Transcoded { from: ImageFormat, bytes: Vec<u8> },
}

impl CoverImage {
    /// The bytes to store.
    pub fn bytes(&self) -> &[u8] {
        match self {
            CoverImage::Copied { bytes, .. } | CoverImage::Transcoded { bytes, .. } => bytes,
        }
    }

    /// Format detected in the source file.
    pub fn source_format(&self) -> ImageFormat {
        match self {
            CoverImage::Copied { format, .. } => *format,
            CoverImage::Transcoded { from, .. } => *from,
        }
    }

    /// Writes the image as `cover.png` inside `slot_dir`.
    pub fn write_to(&self, slot_dir: &Path) -> Result<PathBuf, InstallError> {
        let path = slot_dir.join(COVER_FILE);
        fs::write(&path, self.bytes()).map_err(|e| InstallError::io(&path, e))?;
        Ok(path)
    }
}

/// Loads a cover image and prepares it for storage as `cover.png`.
pub fn normalize_cover_image(path: &Path) -> Result<CoverImage, InstallError> {
    let bytes = fs::read(path).map_err(|e| InstallError::io(path, e))?;

    let format = image::guess_format(&bytes).map_err(|e| InstallError::ImageConversion {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if PASSTHROUGH_FORMATS.contains(&format) {
        return Ok(CoverImage::Copied { format, bytes });
    }

    let png = transcode_to_png(&bytes, format).map_err(|e| InstallError::ImageConversion {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(CoverImage::Transcoded {
        from: format,
        bytes: png,
    })
}

fn transcode_to_png(bytes: &[u8], format: ImageFormat) -> image::ImageResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, format)?;

    // PNG cannot hold every decoded pixel type (e.g. 32-bit float).
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());

    let mut png = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
