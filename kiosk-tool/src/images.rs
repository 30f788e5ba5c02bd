//! Image bytes on disk, addressed by derived image names.

use std::fs;
use std::path::{Path, PathBuf};

use kiosk_core::{IMAGE_EXTENSION, ImageName};
use tracing::debug;

use crate::error::ToolError;

/// Served in place of images that were never uploaded.
pub const DEFAULT_IMAGE: &str = "default.jpg";

pub struct ImageDir {
    dir: PathBuf,
}

impl ImageDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Copies the file at `source` into the directory under its derived
    /// image name. An existing image with the same name is overwritten.
    pub fn save(&self, source: &Path) -> Result<ImageName, ToolError> {
        let filename = upload_name(source)?;
        let name = ImageName::derive(filename);

        fs::create_dir_all(&self.dir)?;
        fs::copy(source, self.dir.join(name.as_str()))?;
        Ok(name)
    }

    /// Resolves a requested image name to a file path.
    ///
    /// Names that were not produced by `ImageName::derive`, or that have no
    /// stored bytes, resolve to the default image.
    pub fn locate(&self, requested: &str) -> Result<PathBuf, ToolError> {
        if !requested.ends_with(IMAGE_EXTENSION) {
            return Err(ToolError::NotJpeg(requested.to_string()));
        }

        if let Ok(name) = ImageName::parse(requested) {
            let path = self.dir.join(name.as_str());
            if path.is_file() {
                return Ok(path);
            }
        }

        debug!("image not found: {}", requested);
        Ok(self.dir.join(DEFAULT_IMAGE))
    }
}

/// File name of an upload, as the client would have sent it.
pub fn upload_name(source: &Path) -> Result<&str, ToolError> {
    source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ToolError::InvalidImagePath(source.to_path_buf()))
}
