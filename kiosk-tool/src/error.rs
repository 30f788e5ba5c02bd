use std::path::PathBuf;

use kiosk_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image path has no usable file name: {}", .0.display())]
    InvalidImagePath(PathBuf),

    #[error("Image path does not end with .jpg: {0}")]
    NotJpeg(String),
}
