//! High-level image operations.
//!
//! These functions turn configuration into backend parameters, call the
//! backend, and package the result for embedding in HTML.

use super::backend::{BackendError, EncodedImage, ImageBackend};
use super::params::{Quality, ThumbnailParams};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// Side of the square bounding box, in pixels.
    pub max_edge: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_edge: 64,
            quality: Quality::default(),
        }
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        max_edge: config.max_edge,
        quality: config.quality,
    }
}

/// Create an in-memory thumbnail for `source`.
pub fn create_thumbnail(
    backend: &dyn ImageBackend,
    source: &Path,
    config: &ThumbnailConfig,
) -> Result<EncodedImage> {
    backend.thumbnail(&plan_thumbnail(source, config))
}

/// `data:` URI embedding the encoded image, usable as an `img` `src`.
pub fn data_uri(image: &EncodedImage) -> String {
    format!(
        "data:{};base64,{}",
        image.mime_type,
        STANDARD.encode(&image.data)
    )
}
