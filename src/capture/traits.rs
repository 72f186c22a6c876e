//! Capability traits for screenshot capture backends
//!
//! - [`CaptureBackend`]: what the capture service depends on
//!   (fullscreen, region, window)
//! - [`DisplaySource`]: per-monitor enumeration used by
//!   [`ScreenBackend`](super::ScreenBackend) to build the virtual canvas

use async_trait::async_trait;
use image::RgbaImage;

use super::ImageBuffer;
use crate::{error::BackendResult, model::Rect};

/// One display's raw capture placed in the shared virtual coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    /// Position and size in virtual-desktop coordinates
    pub geometry: Rect,
    /// Captured pixels
    pub image:    RgbaImage,
}

impl DisplayFrame {
    /// Creates a frame for a display at `geometry`
    pub fn new(geometry: Rect, image: RgbaImage) -> Self {
        Self { geometry, image }
    }
}

/// Result of a region capture.
///
/// `area` is the part of the requested rectangle that was actually on
/// screen, in global coordinates. `image` covers exactly `area`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCapture {
    pub image: ImageBuffer,
    pub area:  Rect,
}

/// Capability: Backend can capture screen pixels.
///
/// Implementations are environment-specific. The capture service only sees
/// this trait and the backend's [`name`](CaptureBackend::name).
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Backend identifier for diagnostics and `Screenshot::backend_name`
    fn name(&self) -> &str;

    /// Captures every attached display composited into one canvas.
    ///
    /// # Errors
    ///
    /// - [`BackendError::NoDisplay`](crate::error::BackendError::NoDisplay)
    ///   when no display can be queried
    /// - [`BackendError::Degenerate`](crate::error::BackendError::Degenerate)
    ///   when the composite has zero area
    async fn capture_fullscreen(&self) -> BackendResult<ImageBuffer>;

    /// Captures the part of `rect` (global coordinates) that lies on screen.
    ///
    /// Partially off-screen rectangles are clamped to the canvas. The
    /// returned [`RegionCapture::area`] is the clamped rectangle, so callers
    /// can map global coordinates into the image.
    ///
    /// # Errors
    ///
    /// - [`BackendError::InvalidRegion`](crate::error::BackendError::InvalidRegion)
    ///   for non-positive sizes
    /// - [`BackendError::OutOfBounds`](crate::error::BackendError::OutOfBounds)
    ///   when `rect` misses the canvas entirely
    async fn capture_region(&self, rect: Rect) -> BackendResult<RegionCapture>;

    /// Captures a single window.
    ///
    /// Backends that cannot guarantee reliable window capture return
    /// [`BackendError::WindowCaptureUnsupported`](crate::error::BackendError::WindowCaptureUnsupported)
    /// instead of falling back to a fullscreen image.
    async fn capture_window(&self, window_id: Option<u64>) -> BackendResult<ImageBuffer>;
}

/// Capability: Provider can enumerate displays and fetch their pixels.
pub trait DisplaySource: Send + Sync {
    /// Provider identifier
    fn name(&self) -> &str;

    /// Returns every display's geometry and pixels, in enumeration order.
    fn displays(&self) -> BackendResult<Vec<DisplayFrame>>;
}
