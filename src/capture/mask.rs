//! Non-rectangular clip masks for freeform captures
//!
//! The captured region is always rectangular. For freeform selections the
//! outline is rasterized with `tiny_skia` and used as per-pixel coverage:
//! the output starts fully transparent and only source pixels inside the
//! outline are painted.

use image::{Rgba, RgbaImage};
use tiny_skia::{FillRule, Mask, PathBuilder, Transform};

use super::{ImageBuffer, image_buffer::mul_div255};
use crate::model::{MaskPath, Point};

/// Builds a closed `tiny_skia` path from an outline
fn build_path(mask: &MaskPath) -> Option<tiny_skia::Path> {
    if !mask.is_closed() {
        return None;
    }

    let points = mask.points();
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x, points[0].y);
    for p in &points[1..] {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

/// Rasterizes the outline into an anti-aliased coverage mask
fn rasterize(mask: &MaskPath, width: u32, height: u32) -> Option<Mask> {
    let path = build_path(mask)?;
    let mut coverage = Mask::new(width, height)?;
    coverage.fill_path(&path, FillRule::Winding, true, Transform::identity());
    Some(coverage)
}

/// Clips `image` to `mask` (already in the image's local coordinates).
///
/// Returns `None` when the outline cannot enclose an area or the image is
/// empty; callers keep the rectangular capture in that case.
pub fn apply_mask(image: &ImageBuffer, mask: &MaskPath) -> Option<ImageBuffer> {
    let (width, height) = image.dimensions();
    let coverage = rasterize(mask, width, height)?;
    let data = coverage.data();

    let out = RgbaImage::from_fn(width, height, |x, y| {
        let c = data[(y * width + x) as usize] as u16;
        let src = image.inner().get_pixel(x, y);
        match c {
            0 => Rgba([0, 0, 0, 0]),
            255 => *src,
            _ => {
                let alpha = mul_div255(src[3] as u16, c);
                if alpha == 0 {
                    Rgba([0, 0, 0, 0])
                } else {
                    Rgba([src[0], src[1], src[2], alpha])
                }
            }
        }
    });

    Some(ImageBuffer::new(out))
}

/// Counts pixels whose centre is outside `mask` but which are not fully
/// transparent.
///
/// A small count is expected from anti-aliasing along the outline.
pub fn count_mask_violations(image: &ImageBuffer, mask: &MaskPath) -> usize {
    image
        .inner()
        .enumerate_pixels()
        .filter(|(x, y, px)| {
            px[3] != 0 && !mask.contains(Point::new(*x as f32 + 0.5, *y as f32 + 0.5))
        })
        .count()
}

/// Logs a warning when the masked image leaks outside the outline.
///
/// Never fails: leakage is a diagnostic, not a correctness gate.
pub fn validate_mask(image: &ImageBuffer, mask: &MaskPath) -> usize {
    let violations = count_mask_violations(image, mask);
    if violations > 0 {
        tracing::warn!(
            "Mask validation: {} pixel(s) outside the selection outline are not transparent",
            violations
        );
    } else {
        tracing::debug!("Mask validation passed for {}x{} image", image.width(), image.height());
    }
    violations
}
