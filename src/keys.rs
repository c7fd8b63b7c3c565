//! Stable identifiers for gallery content.
//!
//! Every discovered file gets a **content key** and every directory that
//! holds media gets a **page key**. Both are SHA-256 hex digests, so they
//! are deterministic across restarts, fixed-length, and opaque: a key in a
//! `/view/` or `/page/` URL reveals nothing about the path it came from.
//!
//! There is no secret involved. The hash only provides stable, collision
//! resistant names for cache rows and URLs.
//!
//! ```text
//! relative path       content key                      page key
//! a/cat.jpg      →    sha256("a/cat.jpg")              sha256("a")
//! ./a/cat.jpg    →    sha256("a/cat.jpg")  (same)      sha256("a")
//! top.png        →    sha256("top.png")                sha256("")
//! ```

use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of `input`, as a 64-character lowercase hex string.
pub fn derive_key(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

/// Normalize a relative path so that equivalent spellings hash identically.
///
/// Strips leading path separators and leading `./` components. Dots that are
/// part of a name (`.hidden/x.jpg`) are kept.
pub fn normalize(relative_path: &str) -> &str {
    let mut rest = relative_path;
    loop {
        let trimmed = rest.trim_start_matches(['/', '\\']);
        match trimmed.strip_prefix('.') {
            Some(after) if after.is_empty() => return after,
            Some(after) if after.starts_with(['/', '\\']) => rest = after,
            _ => return trimmed,
        }
    }
}

/// Content key for a file path relative to the gallery root.
pub fn content_key(relative_path: &str) -> String {
    derive_key(normalize(relative_path))
}

/// Page key for a file path relative to the gallery root: the key of its
/// parent directory. Files directly in the root share the key of `""`.
pub fn page_key(relative_path: &str) -> String {
    derive_key(parent_dir(normalize(relative_path)))
}

/// Parent directory of a normalized relative path, `""` for top-level files.
pub fn parent_dir(relative_path: &str) -> &str {
    Path::new(relative_path)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or("")
}
