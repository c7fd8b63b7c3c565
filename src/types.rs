//! Gallery data model.
//!
//! Everything here is rebuilt from the filesystem on every scan and never
//! persisted. The only state that outlives a request is the artifact cache.

use crate::keys;
use crate::naming;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One discovered media file.
///
/// Identity is the content key: two items with the same key are the same
/// file.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Path relative to the gallery root, `/`-separated. Unsanitized.
    pub relative_path: String,
    /// Location on disk (root joined with the relative path).
    pub source_path: PathBuf,
    pub content_key: String,
    pub page_key: String,
    /// Guessed from the extension.
    pub mime_type: Option<String>,
    /// Seconds since the Unix epoch, read at scan time.
    pub mtime: i64,
}

impl ContentItem {
    pub fn new(root: &Path, relative_path: &str, mtime: i64) -> Self {
        let relative_path = keys::normalize(relative_path).to_string();
        let mime_type = mime_guess::from_path(&relative_path)
            .first()
            .map(|m| m.essence_str().to_string());
        Self {
            source_path: root.join(&relative_path),
            content_key: keys::content_key(&relative_path),
            page_key: keys::page_key(&relative_path),
            relative_path,
            mime_type,
            mtime,
        }
    }

    /// Images and videos are shown; everything else is ignored.
    pub fn is_supported(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|t| t.starts_with("image/") || t.starts_with("video/"))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|t| t.starts_with("image/"))
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Parent directory relative to the root, `""` for top-level files.
    pub fn parent_dir(&self) -> &str {
        keys::parent_dir(&self.relative_path)
    }
}

impl PartialEq for ContentItem {
    fn eq(&self, other: &Self) -> bool {
        self.content_key == other.content_key
    }
}

impl Eq for ContentItem {}

/// All supported items of one directory.
#[derive(Debug, Clone)]
pub struct Page {
    pub page_key: String,
    /// Sanitized directory name, `(root)` for the gallery root.
    pub display_name: String,
    /// Items in discovery order.
    pub items: Vec<ContentItem>,
    /// Latest mtime over `items`.
    pub last_modified: i64,
}

impl Page {
    /// Items newest first. Ties keep discovery order.
    pub fn items_by_recency(&self) -> Vec<&ContentItem> {
        let mut items: Vec<&ContentItem> = self.items.iter().collect();
        items.sort_by_key(|item| Reverse(item.mtime));
        items
    }
}

/// In-memory index built by one scan.
#[derive(Debug, Default)]
pub struct GalleryIndex {
    pages: HashMap<String, Page>,
    items_by_key: HashMap<String, ContentItem>,
    ordered_page_keys: Vec<String>,
}

impl GalleryIndex {
    /// Build an index from supported items in discovery order.
    ///
    /// Pages are ordered newest first by `last_modified`; pages with equal
    /// times keep the order in which they were first discovered.
    pub fn from_items(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let mut pages: HashMap<String, Page> = HashMap::new();
        let mut items_by_key = HashMap::new();
        let mut discovery_order = Vec::new();

        for item in items {
            let page = pages.entry(item.page_key.clone()).or_insert_with(|| {
                discovery_order.push(item.page_key.clone());
                Page {
                    page_key: item.page_key.clone(),
                    display_name: naming::page_display_name(item.parent_dir()),
                    items: Vec::new(),
                    last_modified: i64::MIN,
                }
            });
            page.last_modified = page.last_modified.max(item.mtime);
            page.items.push(item.clone());
            items_by_key.insert(item.content_key.clone(), item);
        }

        let mut ordered_page_keys = discovery_order;
        ordered_page_keys.sort_by_key(|key| Reverse(pages[key].last_modified));

        Self {
            pages,
            items_by_key,
            ordered_page_keys,
        }
    }

    pub fn page(&self, page_key: &str) -> Option<&Page> {
        self.pages.get(page_key)
    }

    pub fn item(&self, content_key: &str) -> Option<&ContentItem> {
        self.items_by_key.get(content_key)
    }

    pub fn ordered_page_keys(&self) -> &[String] {
        &self.ordered_page_keys
    }

    /// Pages newest first.
    pub fn ordered_pages(&self) -> impl Iterator<Item = &Page> {
        self.ordered_page_keys.iter().map(|key| &self.pages[key])
    }

    /// The `(newer, older)` neighbours of `page_key` in the newest-first
    /// ordering.
    pub fn neighbors(&self, page_key: &str) -> (Option<&Page>, Option<&Page>) {
        let Some(pos) = self.ordered_page_keys.iter().position(|k| k == page_key) else {
            return (None, None);
        };
        let newer = pos
            .checked_sub(1)
            .and_then(|p| self.ordered_page_keys.get(p))
            .map(|k| &self.pages[k]);
        let older = self
            .ordered_page_keys
            .get(pos + 1)
            .map(|k| &self.pages[k]);
        (newer, older)
    }

    pub fn most_recent_page(&self) -> Option<&Page> {
        self.ordered_pages().next()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn item_count(&self) -> usize {
        self.items_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str, mtime: i64) -> ContentItem {
        ContentItem::new(Path::new("/gallery"), path, mtime)
    }

    // =========================================================================
    // ContentItem
    // =========================================================================

    #[test]
    fn item_keys_and_paths() {
        let it = item("./a/cat.jpg", 1);
        assert_eq!(it.relative_path, "a/cat.jpg");
        assert_eq!(it.source_path, Path::new("/gallery/a/cat.jpg"));
        assert_eq!(it.content_key, keys::content_key("a/cat.jpg"));
        assert_eq!(it.page_key, keys::derive_key("a"));
        assert_eq!(it.file_name(), "cat.jpg");
        assert_eq!(it.parent_dir(), "a");
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(item("a.jpg", 0).mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(item("a.PNG", 0).mime_type.as_deref(), Some("image/png"));
        assert_eq!(item("a.mp4", 0).mime_type.as_deref(), Some("video/mp4"));
        assert_eq!(item("README", 0).mime_type, None);
    }

    #[test]
    fn only_images_and_videos_are_supported() {
        assert!(item("a.jpg", 0).is_supported());
        assert!(item("clip.webm", 0).is_supported());
        assert!(!item("notes.txt", 0).is_supported());
        assert!(!item("Makefile", 0).is_supported());
        assert!(item("a.gif", 0).is_image());
        assert!(!item("clip.mp4", 0).is_image());
    }

    #[test]
    fn items_compare_by_content_key() {
        let a = item("a/cat.jpg", 1);
        let b = item("./a/cat.jpg", 99);
        assert_eq!(a, b);
        assert_ne!(a, item("a/dog.jpg", 1));
    }

    // =========================================================================
    // GalleryIndex
    // =========================================================================

    #[test]
    fn items_group_by_directory() {
        let index = GalleryIndex::from_items(vec![
            item("a/1.jpg", 1),
            item("a/2.jpg", 2),
            item("b/3.jpg", 3),
        ]);
        assert_eq!(index.page_count(), 2);
        assert_eq!(index.item_count(), 3);
        let a = index.page(&keys::derive_key("a")).unwrap();
        assert_eq!(a.items.len(), 2);
        assert_eq!(a.display_name, "a");
        assert_eq!(a.last_modified, 2);
    }

    #[test]
    fn pages_ordered_newest_first() {
        let index = GalleryIndex::from_items(vec![
            item("a/cat.jpg", 100),
            item("b/dog.png", 200),
            item("c/owl.png", 150),
        ]);
        let names: Vec<&str> = index
            .ordered_pages()
            .map(|p| p.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn page_ties_keep_discovery_order() {
        let index = GalleryIndex::from_items(vec![
            item("x/1.jpg", 5),
            item("y/1.jpg", 5),
            item("z/1.jpg", 5),
        ]);
        let names: Vec<&str> = index
            .ordered_pages()
            .map(|p| p.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn items_by_recency_newest_first() {
        let index = GalleryIndex::from_items(vec![
            item("a/old.jpg", 1),
            item("a/new.jpg", 3),
            item("a/mid.jpg", 2),
        ]);
        let page = index.page(&keys::derive_key("a")).unwrap();
        let names: Vec<&str> = page.items_by_recency().iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["new.jpg", "mid.jpg", "old.jpg"]);
    }

    #[test]
    fn neighbors_follow_ordering() {
        let index = GalleryIndex::from_items(vec![item("a/cat.jpg", 1), item("b/dog.png", 2)]);
        let a = keys::derive_key("a");
        let b = keys::derive_key("b");

        let (newer, older) = index.neighbors(&b);
        assert!(newer.is_none());
        assert_eq!(older.unwrap().page_key, a);

        let (newer, older) = index.neighbors(&a);
        assert_eq!(newer.unwrap().page_key, b);
        assert!(older.is_none());

        assert!(matches!(index.neighbors("missing"), (None, None)));
    }

    #[test]
    fn root_files_get_root_page() {
        let index = GalleryIndex::from_items(vec![item("top.png", 1)]);
        assert_eq!(index.most_recent_page().unwrap().display_name, "(root)");
    }

    #[test]
    fn empty_index() {
        let index = GalleryIndex::from_items(Vec::new());
        assert!(index.is_empty());
        assert!(index.most_recent_page().is_none());
        assert!(index.ordered_page_keys().is_empty());
    }
}
