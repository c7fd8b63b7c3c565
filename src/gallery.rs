//! The gallery service.
//!
//! A [`Gallery`] is built once at startup and shared by every request
//! handler. It holds only configuration: the root directory, the database
//! path and the item renderer. Each call rescans the root and opens its own
//! cache connection, so concurrent requests never share mutable state.
//!
//! Every method is blocking (filesystem walk, SQLite, image decoding); the
//! server runs them on the blocking thread pool.

use crate::cache::{ArtifactCache, CacheError, CacheStats};
use crate::render::{self, ItemRenderer};
use crate::scan::{self, ScanError};
use crate::types::GalleryIndex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Raw bytes of one indexed file, for `/view/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub struct Gallery {
    root: PathBuf,
    db_path: PathBuf,
    busy_timeout: Duration,
    renderer: ItemRenderer,
}

impl Gallery {
    /// Set up a gallery over `root`, creating the cache table in `db_path`
    /// if it does not exist yet.
    pub fn open(
        root: &Path,
        db_path: &Path,
        busy_timeout: Duration,
        renderer: ItemRenderer,
    ) -> Result<Self, GalleryError> {
        ArtifactCache::create(db_path, busy_timeout)?;
        Ok(Self {
            root: root.to_path_buf(),
            db_path: db_path.to_path_buf(),
            busy_timeout,
            renderer,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn cache(&self) -> Result<ArtifactCache, CacheError> {
        ArtifactCache::open(&self.db_path, self.busy_timeout)
    }

    /// Rescan the root and bring every item's cached fragment up to date.
    pub fn refresh(&self) -> Result<(GalleryIndex, CacheStats), GalleryError> {
        let (index, cache) = self.refresh_with_cache()?;
        Ok((index, cache.stats()))
    }

    fn refresh_with_cache(&self) -> Result<(GalleryIndex, ArtifactCache), GalleryError> {
        let index = scan::scan(&self.root)?;
        let cache = self.cache()?;
        scan::warm_cache(&index, &cache, |item| {
            Ok::<_, CacheError>(self.renderer.render(item))
        })?;
        tracing::debug!(stats = %cache.stats(), "cache warmed");
        Ok((index, cache))
    }

    /// HTML for `/`.
    pub fn index_html(&self) -> Result<String, GalleryError> {
        let (index, _) = self.refresh_with_cache()?;
        Ok(render::render_index(&index).into_string())
    }

    /// HTML for `/page/{page_key}`; the not-found page for unknown keys.
    pub fn page_html(&self, page_key: &str) -> Result<String, GalleryError> {
        let (index, cache) = self.refresh_with_cache()?;
        let markup = render::render_page(&index, page_key, &cache, &self.renderer)?;
        Ok(markup.into_string())
    }

    /// Bytes of the item with `content_key`, or `None` if no such item is
    /// indexed.
    pub fn view(&self, content_key: &str) -> Result<Option<MediaFile>, GalleryError> {
        let index = scan::scan(&self.root)?;
        let Some(item) = index.item(content_key) else {
            return Ok(None);
        };
        let data = fs::read(&item.source_path)?;
        let mime_type = item
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Ok(Some(MediaFile { mime_type, data }))
    }
}
