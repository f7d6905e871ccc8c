//! Error types for the preview pipeline

use thiserror::Error;

/// Errors raised while loading a receipt payload or its image
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed with status {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("No image loaded")]
    NoImage,

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result alias used across the library modules
pub type Result<T> = std::result::Result<T, PreviewError>;
