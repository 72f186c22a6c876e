//! Real monitor enumeration through `xcap`
//!
//! Works on X11, Wayland (through the screenshot portal), Windows and macOS.
//! Each monitor is grabbed separately; composition happens in
//! [`compositor`](super::compositor).

use xcap::Monitor;

use super::{DisplayFrame, DisplaySource};
use crate::{
    error::{BackendError, BackendResult},
    model::Rect,
};

/// Display source backed by `xcap::Monitor`
#[derive(Debug, Default)]
pub struct XcapDisplaySource;

impl XcapDisplaySource {
    /// Creates the source; no display connection is held between captures
    pub fn new() -> Self {
        Self
    }
}

fn provider_error(e: impl std::fmt::Display) -> BackendError {
    BackendError::Provider(e.to_string())
}

fn monitor_frame(monitor: &Monitor) -> BackendResult<DisplayFrame> {
    let geometry = Rect::new(
        monitor.x().map_err(provider_error)?,
        monitor.y().map_err(provider_error)?,
        monitor.width().map_err(provider_error)? as i32,
        monitor.height().map_err(provider_error)? as i32,
    );
    let image = monitor.capture_image().map_err(provider_error)?;
    tracing::debug!(
        "Captured monitor {}: image {}x{}",
        geometry,
        image.width(),
        image.height()
    );
    Ok(DisplayFrame::new(geometry, image))
}

impl DisplaySource for XcapDisplaySource {
    fn name(&self) -> &str {
        "xcap"
    }

    fn displays(&self) -> BackendResult<Vec<DisplayFrame>> {
        let monitors = Monitor::all().map_err(provider_error)?;
        if monitors.is_empty() {
            return Err(BackendError::NoDisplay);
        }
        monitors.iter().map(monitor_frame).collect()
    }
}
