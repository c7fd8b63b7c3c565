//! Filesystem scanning and index building.
//!
//! Walks the gallery root, turns every regular file into a [`ContentItem`],
//! keeps the images and videos, and groups them into pages by directory.
//! The gallery calls this on every request: the filesystem is the source of
//! truth and nothing about the tree is remembered between requests.
//!
//! ## Walk order
//!
//! Entries are visited depth-first. Within a directory its own files come
//! first, in file-name order, then its subdirectories, also in name order:
//! `b.jpg` is discovered before `a/x.jpg`. Two scans of an unchanged tree
//! discover the same items in the same order. That order is the
//! tie-breaker when pages or items share a modification time.
//!
//! Paths that are not valid UTF-8 are skipped with a warning. Keys are
//! derived from the path text, and a lossy conversion would give distinct
//! files the same key.
//!
//! ## Symlinks
//!
//! Symlinks to directories are never descended; this rules out cycles and
//! escapes from the root. Symlinks to files are indexed under the link's own
//! path, with the target's modification time.
//!
//! ## Errors
//!
//! A root that is missing or not a directory fails the scan. Anything else
//! that goes wrong below the root (unreadable directory, file removed
//! mid-walk) is logged and skipped.
//!
//! ## Cache warming
//!
//! [`warm_cache`] runs `get_or_generate` for every indexed item, so the
//! artifact cache is complete before any page is rendered. Unchanged files
//! cost one lookup each.

use crate::cache::{ArtifactCache, CacheError};
use crate::types::{ContentItem, GalleryIndex};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Gallery root is not a directory: {0}")]
    RootNotFound(PathBuf),
}

/// Scan `root` and build the index of supported items.
pub fn scan(root: &Path) -> Result<GalleryIndex, ScanError> {
    let discovered = discover(root)?;
    let total = discovered.len();

    let supported: Vec<ContentItem> = discovered
        .into_iter()
        .filter(|item| {
            let keep = item.is_supported();
            if keep {
                tracing::debug!(path = %item.relative_path, "indexed");
            }
            keep
        })
        .collect();

    let index = GalleryIndex::from_items(supported);
    tracing::info!(
        root = %root.display(),
        files = total,
        items = index.item_count(),
        pages = index.page_count(),
        "scanned gallery"
    );
    Ok(index)
}

/// Every regular file under `root` (and every symlink to one), in walk order.
///
/// Unsupported files are included; [`scan`] filters them out.
pub fn discover(root: &Path) -> Result<Vec<ContentItem>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    let mut items = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| {
            let a_dir = a.file_type().is_dir();
            let b_dir = b.file_type().is_dir();
            a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
        });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let Some(metadata) = file_metadata(&entry) else {
            continue;
        };
        let mtime = match metadata.modified() {
            Ok(time) => unix_seconds(time),
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "no modification time");
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(relative) = relative_path_string(relative) else {
            tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
            continue;
        };
        let mut item = ContentItem::new(root, &relative, mtime);
        item.source_path = entry.path().to_path_buf();
        items.push(item);
    }

    Ok(items)
}

/// Populate the cache for every item in `index` using `render`.
///
/// Items whose cached artifact matches their mtime are not re-rendered.
pub fn warm_cache<F, E>(index: &GalleryIndex, cache: &ArtifactCache, render: F) -> Result<(), E>
where
    F: Fn(&ContentItem) -> Result<Vec<u8>, E>,
    E: From<CacheError>,
{
    for page in index.ordered_pages() {
        for item in &page.items {
            cache.get_or_generate(&item.content_key, item.mtime, || render(item))?;
        }
    }
    Ok(())
}

/// Metadata for regular files and symlinks to regular files; `None` for
/// everything else, including symlinks to directories.
fn file_metadata(entry: &DirEntry) -> Option<fs::Metadata> {
    if entry.file_type().is_file() {
        return match entry.metadata() {
            Ok(m) => Some(m),
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "skipping file");
                None
            }
        };
    }
    if entry.path_is_symlink() {
        return fs::metadata(entry.path()).ok().filter(|m| m.is_file());
    }
    None
}

/// Whole seconds relative to the Unix epoch, truncated toward zero.
fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// `/`-joined components, or `None` if any component is not valid UTF-8.
fn relative_path_string(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
