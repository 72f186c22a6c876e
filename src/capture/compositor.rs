//! Multi-monitor compositor
//!
//! Merges per-display captures into one virtual canvas. The union of all
//! display geometries becomes the canvas bounds; its top-left corner maps to
//! `(0, 0)` so displays left of or above the primary (negative coordinates)
//! still land inside the image.

use image::{Rgba, RgbaImage};

use super::{DisplayFrame, ImageBuffer};
use crate::{
    error::{BackendError, BackendResult},
    model::Rect,
};

/// Colour of canvas areas not covered by any display
pub const BACKGROUND_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Virtual canvas together with the global rectangle it covers
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCanvas {
    /// Composited pixels
    pub image:  ImageBuffer,
    /// Union of all display geometries in global coordinates
    pub bounds: Rect,
}

/// Union of all display geometries, skipping empty ones
pub fn virtual_bounds(frames: &[DisplayFrame]) -> Option<Rect> {
    frames
        .iter()
        .map(|f| f.geometry)
        .filter(|g| !g.is_empty())
        .reduce(|acc, g| acc.union(&g))
}

/// Composites displays into a single canvas.
///
/// Displays are drawn in enumeration order, so on overlap the later display
/// wins. Images larger than their geometry are clipped by the canvas edge.
pub fn compose_displays(frames: &[DisplayFrame]) -> BackendResult<VirtualCanvas> {
    let bounds = virtual_bounds(frames).ok_or(BackendError::NoDisplay)?;

    let mut canvas = RgbaImage::from_pixel(bounds.width as u32, bounds.height as u32, BACKGROUND_FILL);
    let (offset_x, offset_y) = (-(bounds.x as i64), -(bounds.y as i64));

    for frame in frames.iter().filter(|f| !f.geometry.is_empty()) {
        let x = frame.geometry.x as i64 + offset_x;
        let y = frame.geometry.y as i64 + offset_y;
        tracing::trace!(
            "Compositing display {} at canvas offset ({}, {})",
            frame.geometry,
            x,
            y
        );
        image::imageops::replace(&mut canvas, &frame.image, x, y);
    }

    tracing::debug!(
        "Composed {} display(s) into {}x{} canvas (origin {}, {})",
        frames.len(),
        bounds.width,
        bounds.height,
        bounds.x,
        bounds.y
    );

    Ok(VirtualCanvas {
        image: ImageBuffer::new(canvas),
        bounds,
    })
}
