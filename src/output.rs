//! CLI output formatting for the `scan` command.
//!
//! # Output Format
//!
//! ```text
//! Pages
//! 001 travel/japan (2 items)
//!     Key: 3f1c…
//!     Updated: Sat Mar  2 10:15:00 2024
//!     001 temple.jpg
//!     002 clip.mp4 (video)
//! 002 (root) (1 item)
//!     Key: 9a0b…
//!     Updated: Fri Mar  1 08:00:00 2024
//!     001 top.png
//!
//! Cache: 1 cached, 2 generated (3 total)
//! ```
//!
//! Pages are listed newest first and items newest first within a page, the
//! same order the web pages use. Keys are shown in full so they can be pasted
//! into a `/page/` URL.
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` for testability; `print_*`
//! wrappers write them to stdout. Format functions are pure.

use crate::cache::CacheStats;
use crate::naming;
use crate::render::format_ctime;
use crate::types::{ContentItem, GalleryIndex, Page};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 travel (3 items)`
fn page_header(index: usize, page: &Page) -> String {
    let noun = if page.items.len() == 1 { "item" } else { "items" };
    format!(
        "{} {} ({} {})",
        format_index(index),
        page.display_name,
        page.items.len(),
        noun
    )
}

/// `001 cat.jpg`, with a `(video)` marker for items shown as placeholders.
fn item_line(index: usize, item: &ContentItem) -> String {
    let name = naming::sanitize_label(item.file_name());
    if item.is_image() {
        format!("{} {}", format_index(index), name)
    } else {
        format!("{} {} (video)", format_index(index), name)
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the page listing for one scan.
pub fn format_scan_output(index: &GalleryIndex) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];

    if index.is_empty() {
        lines.push(format!("{}(no media found)", indent(1)));
        return lines;
    }

    for (i, page) in index.ordered_pages().enumerate() {
        lines.push(page_header(i + 1, page));
        lines.push(format!("{}Key: {}", indent(1), page.page_key));
        lines.push(format!(
            "{}Updated: {}",
            indent(1),
            format_ctime(page.last_modified)
        ));
        for (j, item) in page.items_by_recency().into_iter().enumerate() {
            lines.push(format!("{}{}", indent(1), item_line(j + 1, item)));
        }
    }

    lines
}

/// Format the cache summary line printed after a scan.
pub fn format_cache_stats(stats: &CacheStats) -> String {
    format!("Cache: {}", stats)
}

/// Print scan output and cache statistics to stdout.
pub fn print_scan_output(index: &GalleryIndex, stats: &CacheStats) {
    for line in format_scan_output(index) {
        println!("{}", line);
    }
    println!();
    println!("{}", format_cache_stats(stats));
}
