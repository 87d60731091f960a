//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Largest output a scale may produce, in pixels (16384 x 16384).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Output dimensions for a Lanczos scale transform.
///
/// Height is `height * scale`; width is additionally multiplied by
/// `aspect_ratio`. Both are rounded and never drop below one pixel.
/// Returns `None` for a non-finite or non-positive factor, or when the result
/// exceeds [`MAX_OUTPUT_PIXELS`].
///
/// # Examples
/// ```
/// # use crop_scale::imaging::calculate_scaled_dimensions;
/// assert_eq!(calculate_scaled_dimensions((800, 600), 0.5, 1.0), Some((400, 300)));
/// assert_eq!(calculate_scaled_dimensions((200, 100), 2.0, 1.0), Some((400, 200)));
/// assert_eq!(calculate_scaled_dimensions((1000, 1000), 1e7, 1.0), None);
/// ```
pub fn calculate_scaled_dimensions(
    source: (u32, u32),
    scale: f64,
    aspect_ratio: f64,
) -> Option<(u32, u32)> {
    let valid = |factor: f64| factor.is_finite() && factor > 0.0;
    if !valid(scale) || !valid(aspect_ratio) {
        return None;
    }
    let (src_w, src_h) = source;
    let w = (src_w as f64 * scale * aspect_ratio).round().max(1.0);
    let h = (src_h as f64 * scale).round().max(1.0);
    if w * h > MAX_OUTPUT_PIXELS as f64 {
        return None;
    }
    Some((w as u32, h as u32))
}

/// A crop window inside a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Center a `target` crop window inside `source`.
///
/// A target larger than the source along an axis is clamped to the source
/// extent on that axis, so the window never leaves the image.
pub fn calculate_crop_rect(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = source;
    let width = target.0.min(src_w);
    let height = target.1.min(src_h);

    CropRect {
        x: (src_w - width) / 2,
        y: (src_h - height) / 2,
        width,
        height,
    }
}
