//! HTML rendering.
//!
//! Turns a [`GalleryIndex`] into the three kinds of page the server returns:
//!
//! - **Index** (`/`): every page name, newest first, linking to `/page/{key}`
//! - **Page** (`/page/{key}`): navigation, a summary line, then every item of
//!   one directory newest first
//! - **Not found**: the page shell with a "page not found" heading, returned
//!   for unknown page keys
//!
//! ## Item fragments
//!
//! Each item is rendered once into an HTML fragment and stored in the
//! [`ArtifactCache`] under its content key. Pages are assembled from cached
//! fragments, so an unchanged image is decoded and thumbnailed only once.
//!
//! | Item | Fragment |
//! |------|----------|
//! | Image | linked inline JPEG thumbnail (`data:` URI) plus label |
//! | Image that fails to decode | favicon placeholder, label `name (error)` |
//! | Video | favicon placeholder, label `name (unsupported type)` |
//!
//! A failed thumbnail is cached like any other fragment and is retried only
//! when the file's modification time changes.
//!
//! ## Escaping
//!
//! Names pass through [`naming::sanitize_label`] before they reach the
//! template, and maud escapes every interpolation on top of that. Cached
//! fragments are the only pre-escaped content.

use crate::cache::{ArtifactCache, CacheError};
use crate::imaging::{ImageBackend, ThumbnailConfig, create_thumbnail, data_uri};
use crate::naming;
use crate::types::{ContentItem, GalleryIndex, Page};
use chrono::{Local, TimeZone};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::sync::Arc;

const CSS: &str = include_str!("../static/style.css");

/// Title shared by every page.
pub const TITLE: &str = "Basic media gallery";

/// Builds the cached HTML fragment for one item.
#[derive(Clone)]
pub struct ItemRenderer {
    backend: Arc<dyn ImageBackend>,
    config: ThumbnailConfig,
}

impl ItemRenderer {
    pub fn new(backend: Arc<dyn ImageBackend>, config: ThumbnailConfig) -> Self {
        Self { backend, config }
    }

    /// Render `item` to its fragment bytes.
    ///
    /// Never fails: a thumbnail error becomes an `(error)` placeholder.
    pub fn render(&self, item: &ContentItem) -> Vec<u8> {
        self.fragment(item).into_string().into_bytes()
    }

    fn fragment(&self, item: &ContentItem) -> Markup {
        let name = naming::sanitize_label(item.file_name());
        if !item.is_image() {
            return placeholder(&name, "unsupported type");
        }

        match create_thumbnail(self.backend.as_ref(), &item.source_path, &self.config) {
            Ok(thumb) => html! {
                a href={ "/view/" (item.content_key) } {
                    div {
                        img src=(data_uri(&thumb));
                        p.label { (name) }
                    }
                }
            },
            Err(err) => {
                tracing::warn!(path = %item.relative_path, error = %err, "thumbnail failed");
                placeholder(&name, "error")
            }
        }
    }
}

fn placeholder(name: &str, marker: &str) -> Markup {
    html! {
        div {
            img src="/favicon.ico";
            p.label { (name) " (" (marker) ")" }
        }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Wraps `content` in the shared document shell and header.
fn base_document(index: &GalleryIndex, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                title { (TITLE) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (site_header(index))
                (content)
            }
        }
    }
}

/// Index link, plus a link to the most recent page when there is one.
fn site_header(index: &GalleryIndex) -> Markup {
    html! {
        a href="/" { "index" }
        br;
        @if let Some(page) = index.most_recent_page() {
            a href={ "/page/" (page.page_key) } { "most recent" }
            br;
        }
    }
}

/// "previous page" goes one page back in time, "next page" one forward.
fn page_nav(index: &GalleryIndex, page: &Page) -> Markup {
    let (newer, older) = index.neighbors(&page.page_key);
    html! {
        @if let Some(older) = older {
            a href={ "/page/" (older.page_key) } { "previous page" }
        } @else {
            "no previous page"
        }
        br;
        @if let Some(newer) = newer {
            a href={ "/page/" (newer.page_key) } { "next page" }
        } @else {
            "no next page"
        }
        br;
    }
}

/// Local time in the classic `Thu Jan  1 00:00:00 1970` layout.
pub fn format_ctime(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(time) => time.format("%a %b %e %H:%M:%S %Y").to_string(),
        None => secs.to_string(),
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// The list of all pages, newest first.
pub fn render_index(index: &GalleryIndex) -> Markup {
    let content = html! {
        ol {
            @for page in index.ordered_pages() {
                li {
                    a href={ "/page/" (page.page_key) } { (page.display_name) }
                }
            }
        }
    };
    base_document(index, content)
}

/// The shell with a "page not found" heading.
pub fn render_not_found(index: &GalleryIndex) -> Markup {
    base_document(index, html! { h1 { "page not found" } })
}

/// One page of items, or the not-found page when `page_key` is unknown.
///
/// Fragments come from `cache`; stale or missing ones are rebuilt with
/// `renderer` and written back.
pub fn render_page(
    index: &GalleryIndex,
    page_key: &str,
    cache: &ArtifactCache,
    renderer: &ItemRenderer,
) -> Result<Markup, CacheError> {
    let Some(page) = index.page(page_key) else {
        return Ok(render_not_found(index));
    };

    let mut fragments = Vec::with_capacity(page.items.len());
    for item in page.items_by_recency() {
        let data = cache.get_or_generate(&item.content_key, item.mtime, || {
            Ok::<_, CacheError>(renderer.render(item))
        })?;
        fragments.push(String::from_utf8_lossy(&data).into_owned());
    }

    let content = html! {
        (page_nav(index, page))
        p {
            "This page: " (page.display_name)
            " , " (format_ctime(page.last_modified))
            " , " (page.items.len()) " items"
        }
        ol {
            @for fragment in &fragments {
                li.pageitem { (PreEscaped(fragment)) }
            }
        }
    };
    Ok(base_document(index, content))
}
