//! Mock capture backends for testing
//!
//! This module provides two doubles that work without a display server:
//!
//! - [`MockDisplaySource`]: a [`DisplaySource`] with configurable monitor
//!   layouts and error injection, meant to sit under a
//!   [`ScreenBackend`](super::ScreenBackend)
//! - [`MockBackend`]: a [`CaptureBackend`] that records every call, can
//!   simulate delays and window capture, and injects errors
//!
//! # Examples
//!
//! ```
//! use snipdesk::capture::{CaptureBackend, MockBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let backend = MockBackend::new();
//!     let image = backend.capture_fullscreen().await.unwrap();
//!     assert_eq!(image.dimensions(), (1920, 1080));
//!     assert_eq!(backend.calls().len(), 1);
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tokio::time::sleep;

use super::{
    CaptureBackend, DisplayFrame, DisplaySource, ImageBuffer, RegionCapture, ScreenBackend,
};
use crate::{
    error::{BackendError, BackendResult},
    model::Rect,
};

/// Display source returning predefined frames
#[derive(Debug, Clone)]
pub struct MockDisplaySource {
    frames:          Vec<DisplayFrame>,
    error_injection: Option<BackendError>,
}

impl MockDisplaySource {
    /// One 1920x1080 test-pattern display at the origin
    pub fn new() -> Self {
        let image = ImageBuffer::from_test_pattern(1920, 1080).into_inner();
        Self::with_displays(vec![DisplayFrame::new(Rect::new(0, 0, 1920, 1080), image)])
    }

    /// Uses the given frames verbatim
    pub fn with_displays(frames: Vec<DisplayFrame>) -> Self {
        Self {
            frames,
            error_injection: None,
        }
    }

    /// Two solid-colour displays side by side (red left, green right)
    pub fn dual_horizontal(width: u32, height: u32) -> Self {
        Self::with_displays(vec![
            DisplayFrame::new(
                Rect::new(0, 0, width as i32, height as i32),
                RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])),
            ),
            DisplayFrame::new(
                Rect::new(width as i32, 0, width as i32, height as i32),
                RgbaImage::from_pixel(width, height, Rgba([0, 255, 0, 255])),
            ),
        ])
    }

    /// Makes every enumeration fail with `error`
    pub fn with_error(mut self, error: BackendError) -> Self {
        self.error_injection = Some(error);
        self
    }
}

impl Default for MockDisplaySource {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySource for MockDisplaySource {
    fn name(&self) -> &str {
        "mock"
    }

    fn displays(&self) -> BackendResult<Vec<DisplayFrame>> {
        if let Some(ref error) = self.error_injection {
            return Err(error.clone());
        }
        Ok(self.frames.clone())
    }
}

/// A recorded backend invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `capture_fullscreen()`
    Fullscreen,
    /// `capture_region(rect)`
    Region(Rect),
    /// `capture_window(id)`
    Window(Option<u64>),
}

/// Call-recording capture backend
///
/// Delegates pixel work to a [`ScreenBackend`] over a
/// [`MockDisplaySource`], so crop and composition behaviour matches the
/// real pipeline.
#[derive(Debug)]
pub struct MockBackend {
    name:            String,
    screen:          ScreenBackend<MockDisplaySource>,
    delay:           Option<Duration>,
    error_injection: Option<BackendError>,
    window_image:    Option<ImageBuffer>,
    panic_message:   Option<String>,
    calls:           Mutex<Vec<MockCall>>,
}

impl MockBackend {
    /// Backend over a single 1920x1080 test-pattern display
    pub fn new() -> Self {
        Self::with_source(MockDisplaySource::new())
    }

    /// Backend over the given display source
    pub fn with_source(source: MockDisplaySource) -> Self {
        Self {
            name:            "mock".to_string(),
            screen:          ScreenBackend::new(source),
            delay:           None,
            error_injection: None,
            window_image:    None,
            panic_message:   None,
            calls:           Mutex::new(Vec::new()),
        }
    }

    /// Overrides the diagnostic name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sleeps before answering every capture call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every capture call with `error`
    pub fn with_error(mut self, error: BackendError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// Answers window captures with `image` instead of refusing them
    pub fn with_window_image(mut self, image: ImageBuffer) -> Self {
        self.window_image = Some(image);
        self
    }

    /// Panics inside every capture call
    pub fn with_panic(mut self, message: impl Into<String>) -> Self {
        self.panic_message = Some(message.into());
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    async fn enter(&self, call: MockCall) -> BackendResult<()> {
        self.calls.lock().push(call);
        if let Some(duration) = self.delay {
            sleep(duration).await;
        }
        if let Some(ref message) = self.panic_message {
            panic!("{}", message);
        }
        if let Some(ref error) = self.error_injection {
            return Err(error.clone());
        }
        Ok(())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn capture_fullscreen(&self) -> BackendResult<ImageBuffer> {
        self.enter(MockCall::Fullscreen).await?;
        self.screen.capture_fullscreen().await
    }

    async fn capture_region(&self, rect: Rect) -> BackendResult<RegionCapture> {
        self.enter(MockCall::Region(rect)).await?;
        self.screen.capture_region(rect).await
    }

    async fn capture_window(&self, window_id: Option<u64>) -> BackendResult<ImageBuffer> {
        self.enter(MockCall::Window(window_id)).await?;
        match self.window_image {
            Some(ref image) => Ok(image.clone()),
            None => Err(BackendError::WindowCaptureUnsupported {
                backend: self.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let backend = MockBackend::new();
        backend.capture_fullscreen().await.unwrap();
        backend.capture_region(Rect::new(0, 0, 10, 10)).await.unwrap();
        let _ = backend.capture_window(Some(7)).await;

        assert_eq!(
            backend.calls(),
            vec![
                MockCall::Fullscreen,
                MockCall::Region(Rect::new(0, 0, 10, 10)),
                MockCall::Window(Some(7)),
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_error_injection() {
        let backend = MockBackend::new().with_error(BackendError::NoDisplay);
        assert_eq!(backend.capture_fullscreen().await.unwrap_err(), BackendError::NoDisplay);
    }

    #[tokio::test]
    async fn test_mock_window_image() {
        let backend =
            MockBackend::new().with_window_image(ImageBuffer::from_test_pattern(320, 200));
        let image = backend.capture_window(None).await.unwrap();
        assert_eq!(image.dimensions(), (320, 200));
    }

    #[tokio::test]
    async fn test_mock_dual_display_fullscreen() {
        let backend = MockBackend::with_source(MockDisplaySource::dual_horizontal(800, 600));
        let image = backend.capture_fullscreen().await.unwrap();
        assert_eq!(image.dimensions(), (1600, 600));
    }

    #[test]
    fn test_display_source_error_injection() {
        let source = MockDisplaySource::new().with_error(BackendError::Provider("gone".into()));
        assert_eq!(source.displays().unwrap_err(), BackendError::Provider("gone".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay() {
        let backend = MockBackend::new().with_delay(Duration::from_millis(250));
        let start = tokio::time::Instant::now();
        backend.capture_fullscreen().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
