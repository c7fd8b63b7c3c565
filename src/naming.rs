//! Display names and URL key cleanup.
//!
//! Filenames and directory names are user-controlled: anyone who can drop a
//! file into the gallery root can pick a name like `<script>….jpg`. Every
//! name that ends up in HTML goes through [`sanitize_label`], which keeps
//! alphanumerics and a short punctuation safelist and silently drops
//! everything else.
//!
//! ## Safelist
//!
//! | Kept | Examples |
//! |------|----------|
//! | Letters and digits (any script) | `Café`, `東京`, `2024` |
//! | `.` `/` `-` `(` `)` and space | `a/b (copy)-1.jpg` |
//!
//! Quotes, angle brackets, ampersands, `=` and the rest are removed, so a
//! sanitized label can never open a tag or close an attribute.

/// Name shown for the page that holds files directly in the gallery root.
pub const ROOT_PAGE_NAME: &str = "(root)";

const SAFE_PUNCTUATION: &[char] = &['.', '/', '-', '(', ')', ' '];

/// Drop every character that is not alphanumeric or in the safelist.
pub fn sanitize_label(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || SAFE_PUNCTUATION.contains(c))
        .collect()
}

/// Strip path separators and dots from a key taken from a URL tail.
///
/// `/page/abc/def` and `/page/abc.def` both look up `abcdef`; a key can
/// never smuggle a relative path.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars().filter(|c| *c != '/' && *c != '.').collect()
}

/// Sanitized display name for the page of a directory relative to the root.
///
/// `""` and `"."` are the root itself and get [`ROOT_PAGE_NAME`].
pub fn page_display_name(relative_dir: &str) -> String {
    if relative_dir.is_empty() || relative_dir == "." {
        sanitize_label(ROOT_PAGE_NAME)
    } else {
        sanitize_label(relative_dir)
    }
}
