//! # Media Gallery
//!
//! A small HTTP server for browsing a directory tree of photos and videos.
//! The filesystem is the data source: every directory that holds media
//! becomes one page, and pages are ordered by their most recently modified
//! file.
//!
//! # Request Cycle
//!
//! Nothing about the tree is remembered between requests. Each request
//! rebuilds the index from disk, then reads what it needs from a persistent
//! cache of rendered thumbnails:
//!
//! ```text
//! 1. Scan     root/     →  GalleryIndex      (walk, classify, group by directory)
//! 2. Warm     index     →  SQLite cache      (render stale or missing fragments)
//! 3. Render   index     →  HTML              (index, page or not-found)
//! ```
//!
//! New, changed and deleted files are therefore visible on the next request
//! without a restart or a watcher, and an unchanged image is only ever
//! decoded once: the cache entry is keyed by path and tagged with the file's
//! modification time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`keys`] | SHA-256 content and page keys from relative paths |
//! | [`naming`] | Label sanitization, URL key cleanup, page display names |
//! | [`types`] | `ContentItem`, `Page`, `GalleryIndex` |
//! | [`scan`] | Directory walk, classification, cache warming |
//! | [`cache`] | SQLite artifact cache with mtime invalidation |
//! | [`imaging`] | Thumbnail backend trait and `image`-crate implementation |
//! | [`render`] | Maud templates for every HTML page and item fragment |
//! | [`gallery`] | The service object tying scan, cache and render together |
//! | [`server`] | Axum routes, blocking-pool dispatch, 404 handling |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI listing printed by `media-gallery scan` |
//!
//! # Design Decisions
//!
//! ## Keys Instead of Paths in URLs
//!
//! URLs carry hex SHA-256 digests of relative paths, never the paths
//! themselves. A key is only ever looked up in the freshly built index, so a
//! crafted URL cannot reach a file outside the scanned tree.
//!
//! ## One Connection per Request
//!
//! There is no connection pool and no in-process lock. Each request opens
//! its own SQLite connection with a busy timeout and lets SQLite serialize
//! writers. Two requests that miss on the same item both render it; the
//! last write wins and both results are identical.
//!
//! ## Maud for HTML
//!
//! Templates are compile-time checked and every interpolation is escaped.
//! File names are additionally reduced to a small safelist before rendering.

pub mod cache;
pub mod config;
pub mod gallery;
pub mod imaging;
pub mod keys;
pub mod naming;
pub mod output;
pub mod render;
pub mod scan;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
