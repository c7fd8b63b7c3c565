//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate thumbnail dimensions bounded by a square box.
///
/// The longer edge is scaled down to `max_edge` and the shorter edge follows
/// the source aspect ratio. Images that already fit are left at their
/// original size; thumbnails are never upscaled. Neither edge drops below 1.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_edge` - Side of the bounding box in pixels
///
/// # Returns
/// * `(width, height)` - Thumbnail dimensions
///
/// # Examples
/// ```
/// # use media_gallery::imaging::calculate_bounded_dimensions;
/// // 4:3 landscape into a 64px box → 64x48
/// assert_eq!(calculate_bounded_dimensions((800, 600), 64), (64, 48));
///
/// // Already small enough → unchanged
/// assert_eq!(calculate_bounded_dimensions((32, 20), 64), (32, 20));
/// ```
pub fn calculate_bounded_dimensions(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longer_edge = src_w.max(src_h);

    if longer_edge <= max_edge || longer_edge == 0 {
        return source;
    }

    let ratio = max_edge as f64 / longer_edge as f64;
    if src_w >= src_h {
        // Landscape or square: width is the longer edge
        let h = ((src_h as f64 * ratio).round() as u32).max(1);
        (max_edge, h)
    } else {
        // Portrait: height is the longer edge
        let w = ((src_w as f64 * ratio).round() as u32).max(1);
        (w, max_edge)
    }
}
