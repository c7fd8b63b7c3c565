//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between rendering and pixel work.
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a mock that records calls and can be told to fail.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// An encoded image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    /// MIME type of `data`, e.g. `image/jpeg`.
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Shared by every request handler, hence `Send + Sync`.
pub trait ImageBackend: Send + Sync {
    /// Decode the source, shrink it to fit the bounding box and encode it.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<EncodedImage, BackendError>;
}
