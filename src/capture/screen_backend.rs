//! Capture backend built on top of a [`DisplaySource`]
//!
//! `ScreenBackend` turns any per-monitor provider into a full
//! [`CaptureBackend`]: fullscreen captures compose all displays, region
//! captures crop the composite, and window captures are refused because a
//! plain display grab cannot isolate a single window reliably.

use async_trait::async_trait;

use super::{CaptureBackend, DisplaySource, ImageBuffer, RegionCapture, compositor};
use crate::{
    error::{BackendError, BackendResult},
    model::Rect,
};

/// Generic capture backend over a display source
#[derive(Debug)]
pub struct ScreenBackend<S> {
    source: S,
}

impl<S: DisplaySource> ScreenBackend<S> {
    /// Wraps a display source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    fn capture_canvas(&self) -> BackendResult<compositor::VirtualCanvas> {
        let frames = self.source.displays().inspect_err(|e| {
            tracing::error!("Display source '{}' failed: {}", self.source.name(), e);
        })?;

        if frames.is_empty() {
            tracing::error!("No display detected by '{}'", self.source.name());
            return Err(BackendError::NoDisplay);
        }

        if let Some(empty) = frames.iter().find(|f| f.image.width() == 0 || f.image.height() == 0) {
            tracing::error!("Display at {} returned an empty image", empty.geometry);
            return Err(BackendError::Degenerate {
                width:  empty.image.width(),
                height: empty.image.height(),
            });
        }

        compositor::compose_displays(&frames)
    }
}

#[async_trait]
impl<S: DisplaySource> CaptureBackend for ScreenBackend<S> {
    fn name(&self) -> &str {
        self.source.name()
    }

    async fn capture_fullscreen(&self) -> BackendResult<ImageBuffer> {
        let canvas = self.capture_canvas()?;
        tracing::info!("Captured fullscreen: {}x{}", canvas.image.width(), canvas.image.height());
        Ok(canvas.image)
    }

    async fn capture_region(&self, rect: Rect) -> BackendResult<RegionCapture> {
        if rect.is_empty() {
            return Err(BackendError::InvalidRegion {
                width:  rect.width,
                height: rect.height,
            });
        }

        let canvas = self.capture_canvas()?;
        let out_of_bounds = || {
            tracing::warn!("Capture rectangle {} does not intersect the screen", rect);
            BackendError::OutOfBounds {
                x:      rect.x,
                y:      rect.y,
                width:  rect.width,
                height: rect.height,
            }
        };

        let area = rect.intersect(&canvas.bounds).ok_or_else(out_of_bounds)?;
        let local = area.translated(-canvas.bounds.x, -canvas.bounds.y);
        let image = canvas.image.crop_clamped(local).ok_or_else(out_of_bounds)?;

        tracing::info!(
            "Captured region {} (on screen {}): {}x{}",
            rect,
            area,
            image.width(),
            image.height()
        );
        Ok(RegionCapture { image, area })
    }

    async fn capture_window(&self, window_id: Option<u64>) -> BackendResult<ImageBuffer> {
        tracing::warn!(
            "Window capture (window_id={:?}) is not supported by '{}'",
            window_id,
            self.source.name()
        );
        Err(BackendError::WindowCaptureUnsupported {
            backend: self.source.name().to_string(),
        })
    }
}
