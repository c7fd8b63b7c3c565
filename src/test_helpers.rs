//! Shared test utilities for the media-gallery test suite.
//!
//! Builds throwaway gallery trees with exact modification times, and writes
//! small synthetic images with the `image` crate.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let g = GalleryBuilder::new()
//!     .jpeg("a/cat.jpg", 800, 600, 1_000)
//!     .raw("b/broken.png", b"not a png", 2_000);
//!
//! let index = scan(g.root()).unwrap();
//! assert_eq!(page_names(&index), vec!["b", "a"]);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

use crate::types::GalleryIndex;

// =========================================================================
// Fixture setup
// =========================================================================

/// A gallery root in a temp directory, populated file by file.
pub struct GalleryBuilder {
    tmp: TempDir,
}

impl GalleryBuilder {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Write `bytes` to `relative` and stamp it with `mtime` (Unix seconds).
    pub fn raw(self, relative: &str, bytes: &[u8], mtime: i64) -> Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        set_mtime(&path, mtime);
        self
    }

    /// Write a valid JPEG of the given size.
    pub fn jpeg(self, relative: &str, width: u32, height: u32, mtime: i64) -> Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_test_jpeg(&path, width, height);
        set_mtime(&path, mtime);
        self
    }

    /// Write a valid PNG (with alpha) of the given size.
    pub fn png(self, relative: &str, width: u32, height: u32, mtime: i64) -> Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_test_png(&path, width, height);
        set_mtime(&path, mtime);
        self
    }
}

/// Set a file's modification time to `mtime` seconds after the epoch.
pub fn set_mtime(path: &Path, mtime: i64) {
    let time = UNIX_EPOCH + Duration::from_secs(mtime as u64);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Create a small valid JPEG file with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid RGBA PNG file with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, 64, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Index extractors
// =========================================================================

/// Page display names, newest page first.
pub fn page_names(index: &GalleryIndex) -> Vec<String> {
    index
        .ordered_pages()
        .map(|p| p.display_name.clone())
        .collect()
}
