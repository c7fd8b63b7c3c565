//! Image processing, pure Rust on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Thumbnail** | bounded resize (Lanczos3), never upscaled |
//! | **Encode** | in-memory JPEG |
//! | **Embed** | base64 `data:` URI |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining parameters + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, EncodedImage, ImageBackend};
pub use calculations::calculate_bounded_dimensions;
pub use operations::{ThumbnailConfig, create_thumbnail, data_uri};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
