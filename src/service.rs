//! Capture orchestration
//!
//! [`CaptureService`] turns a [`CaptureRequest`] into a [`Screenshot`]:
//!
//! 1. wait for the requested delay (non-blocking)
//! 2. run the optional `before_capture` hook
//! 3. dispatch to the backend according to the capture mode
//! 4. clip freeform captures to their outline
//!
//! Backend failures and panics are normalized into [`CaptureError`], so
//! callers only ever handle one error type. Nothing is retried.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use chrono::Local;
use futures::FutureExt;

use crate::{
    capture::{CaptureBackend, ImageBuffer, mask},
    error::{BackendResult, CaptureError, CaptureResult},
    model::{CaptureMode, CaptureRequest, MaskPath, Rect, Screenshot},
};

/// Runs capture requests against a backend
#[derive(Clone)]
pub struct CaptureService {
    backend: Arc<dyn CaptureBackend>,
}

impl std::fmt::Debug for CaptureService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureService")
            .field("backend", &self.backend.name())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "backend panicked".to_string()
    }
}

impl CaptureService {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn CaptureBackend> {
        &self.backend
    }

    /// Performs a capture with no `before_capture` hook.
    ///
    /// `selection_rect` is used by area modes when the request carries no
    /// region of its own; fullscreen and window modes ignore it.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NoRegion`] for area modes without any rectangle
    /// - [`CaptureError::Backend`] when the backend reports a failure
    /// - [`CaptureError::Unexpected`] when the backend panics
    pub async fn perform_capture(
        &self,
        request: CaptureRequest,
        selection_rect: Option<Rect>,
    ) -> CaptureResult<Screenshot> {
        self.perform_capture_with(request, selection_rect, || {}).await
    }

    /// Performs a capture, calling `before_capture` after the delay and
    /// immediately before the backend is invoked.
    ///
    /// Front-ends hide their selection overlay in the hook so it does not end
    /// up in the screenshot.
    pub async fn perform_capture_with<F>(
        &self,
        request: CaptureRequest,
        selection_rect: Option<Rect>,
        before_capture: F,
    ) -> CaptureResult<Screenshot>
    where
        F: FnOnce(),
    {
        tracing::debug!(
            "Starting capture: mode={}, delay={}s, region={:?}, window_id={:?}",
            request.mode,
            request.delay_seconds,
            request.region,
            request.window_id
        );

        let delay = request.delay();
        if !delay.is_zero() {
            tracing::debug!("Waiting {:?} before capture", delay);
            tokio::time::sleep(delay).await;
        }

        before_capture();

        let result = self.execute(request, selection_rect).await;
        match result {
            Ok(ref shot) => tracing::info!(
                "Capture finished: mode={}, {}x{} via '{}'",
                shot.mode,
                shot.image.width(),
                shot.image.height(),
                shot.backend_name
            ),
            Err(ref e) => tracing::error!("Capture failed: {}", e),
        }
        result
    }

    async fn execute(
        &self,
        request: CaptureRequest,
        selection_rect: Option<Rect>,
    ) -> CaptureResult<Screenshot> {
        let mode = request.mode;

        let image = match mode {
            CaptureMode::Fullscreen => self.call_backend(self.backend.capture_fullscreen()).await?,
            CaptureMode::Rectangle | CaptureMode::Freeform => {
                let rect = request.region.or(selection_rect).ok_or(CaptureError::NoRegion)?;
                let captured = self.call_backend(self.backend.capture_region(rect)).await?;
                if captured.area != rect {
                    tracing::debug!("Region {} clamped to {}", rect, captured.area);
                }
                match request.mask_path {
                    Some(ref path) if path.is_closed() => {
                        clip_to_outline(captured.image, path, captured.area)
                    }
                    _ => captured.image,
                }
            }
            CaptureMode::Window => {
                self.call_backend(self.backend.capture_window(request.window_id)).await?
            }
        };

        Ok(Screenshot {
            image,
            mode,
            created_at: Local::now(),
            backend_name: self.backend.name().to_string(),
        })
    }

    async fn call_backend<T, Fut>(&self, call: Fut) -> CaptureResult<T>
    where
        Fut: Future<Output = BackendResult<T>>,
    {
        let backend = self.backend.name().to_string();
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(CaptureError::Backend { backend, source }),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Backend '{}' panicked: {}", backend, message);
                Err(CaptureError::Unexpected { backend, message })
            }
        }
    }
}

/// Applies a global-coordinate outline to an image covering `area`
fn clip_to_outline(image: ImageBuffer, path: &MaskPath, area: Rect) -> ImageBuffer {
    let local = path.translated(-area.x as f32, -area.y as f32);
    match mask::apply_mask(&image, &local) {
        Some(masked) => {
            mask::validate_mask(&masked, &local);
            masked
        }
        None => {
            tracing::warn!(
                "Could not rasterize selection outline ({} points), keeping rectangular capture",
                path.len()
            );
            image
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::{
        capture::{MockBackend, MockCall},
        error::BackendError,
        model::Point,
    };

    fn service_with(backend: MockBackend) -> (CaptureService, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let service = CaptureService::new(backend.clone());
        (service, backend)
    }

    #[tokio::test]
    async fn test_fullscreen_capture() {
        let (service, backend) = service_with(MockBackend::new());
        let shot = service
            .perform_capture(CaptureRequest::new(CaptureMode::Fullscreen), None)
            .await
            .unwrap();

        assert_eq!(shot.image.dimensions(), (1920, 1080));
        assert_eq!(shot.mode, CaptureMode::Fullscreen);
        assert_eq!(shot.backend_name, "mock");
        assert_eq!(backend.calls(), vec![MockCall::Fullscreen]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_honoured_before_backend_call() {
        let (service, backend) = service_with(MockBackend::new());
        let start = tokio::time::Instant::now();
        let observed = Arc::clone(&backend);
        let calls_at_hook = AtomicUsize::new(usize::MAX);

        service
            .perform_capture_with(
                CaptureRequest::new(CaptureMode::Fullscreen).with_delay(1.5),
                None,
                || {
                    assert!(start.elapsed() >= Duration::from_millis(1500));
                    calls_at_hook.store(observed.calls().len(), Ordering::SeqCst);
                },
            )
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert_eq!(calls_at_hook.load(Ordering::SeqCst), 0);
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_does_not_sleep() {
        let (service, _) = service_with(MockBackend::new());
        let start = tokio::time::Instant::now();
        service
            .perform_capture(CaptureRequest::new(CaptureMode::Fullscreen), None)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_area_mode_without_region_fails() {
        let (service, backend) = service_with(MockBackend::new());
        let err = service
            .perform_capture(CaptureRequest::new(CaptureMode::Rectangle), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CaptureError::NoRegion));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_request_region_takes_precedence() {
        let (service, backend) = service_with(MockBackend::new());
        let region = Rect::new(10, 10, 50, 40);
        let shot = service
            .perform_capture(
                CaptureRequest::new(CaptureMode::Rectangle).with_region(region),
                Some(Rect::new(0, 0, 300, 300)),
            )
            .await
            .unwrap();

        assert_eq!(shot.image.dimensions(), (50, 40));
        assert_eq!(backend.calls(), vec![MockCall::Region(region)]);
    }

    #[tokio::test]
    async fn test_selection_rect_is_used_as_fallback() {
        let (service, _) = service_with(MockBackend::new());
        let shot = service
            .perform_capture(
                CaptureRequest::new(CaptureMode::Rectangle),
                Some(Rect::new(0, 0, 64, 32)),
            )
            .await
            .unwrap();
        assert_eq!(shot.image.dimensions(), (64, 32));
    }

    #[tokio::test]
    async fn test_partially_offscreen_region_is_clamped() {
        let (service, _) = service_with(MockBackend::new());
        let shot = service
            .perform_capture(
                CaptureRequest::new(CaptureMode::Rectangle).with_region(Rect::new(-50, 0, 200, 200)),
                None,
            )
            .await
            .unwrap();
        assert_eq!(shot.image.dimensions(), (150, 200));
    }

    #[tokio::test]
    async fn test_window_unsupported_is_wrapped() {
        let (service, _) = service_with(MockBackend::new());
        let err = service
            .perform_capture(CaptureRequest::new(CaptureMode::Window).with_window(3), None)
            .await
            .unwrap_err();

        match err {
            CaptureError::Backend { backend, source } => {
                assert_eq!(backend, "mock");
                assert!(matches!(source, BackendError::WindowCaptureUnsupported { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_error_is_wrapped_with_name() {
        let (service, _) =
            service_with(MockBackend::new().with_name("flaky").with_error(BackendError::NoDisplay));
        let err = service
            .perform_capture(CaptureRequest::new(CaptureMode::Fullscreen), None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("flaky"));
        assert_eq!(err.backend_error(), Some(&BackendError::NoDisplay));
    }

    #[tokio::test]
    async fn test_backend_panic_is_wrapped() {
        let (service, _) = service_with(MockBackend::new().with_panic("driver exploded"));
        let err = service
            .perform_capture(CaptureRequest::new(CaptureMode::Fullscreen), None)
            .await
            .unwrap_err();

        match err {
            CaptureError::Unexpected { backend, message } => {
                assert_eq!(backend, "mock");
                assert!(message.contains("driver exploded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_freeform_mask_is_applied_in_local_coordinates() {
        let (service, _) = service_with(MockBackend::new());
        let region = Rect::new(100, 100, 100, 100);
        let outline = MaskPath::circle(Point::new(150.0, 150.0), 40.0, 64);

        let shot = service
            .perform_capture(
                CaptureRequest::new(CaptureMode::Freeform)
                    .with_region(region)
                    .with_mask(outline),
                None,
            )
            .await
            .unwrap();

        let image = &shot.image;
        assert_eq!(image.dimensions(), (100, 100));
        assert_eq!(image.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(image.pixel(99, 99).unwrap()[3], 0);
        assert_eq!(image.pixel(50, 50).unwrap()[3], 255);
    }

    #[tokio::test]
    async fn test_freeform_mask_follows_clamped_origin() {
        let (service, backend) = service_with(MockBackend::new());
        let region = Rect::new(-50, 0, 150, 100);
        let outline = MaskPath::from_rect(Rect::new(0, 0, 50, 100));

        let shot = service
            .perform_capture(
                CaptureRequest::new(CaptureMode::Freeform)
                    .with_region(region)
                    .with_mask(outline),
                None,
            )
            .await
            .unwrap();

        let image = &shot.image;
        assert_eq!(backend.calls(), vec![MockCall::Region(region)]);
        assert_eq!(image.dimensions(), (100, 100));
        assert_eq!(image.pixel(10, 50).unwrap()[3], 255);
        assert_eq!(image.pixel(40, 50).unwrap()[3], 255);
        assert_eq!(image.pixel(75, 50).unwrap()[3], 0);
        assert_eq!(image.pixel(99, 99).unwrap()[3], 0);
    }

    #[tokio::test]
    async fn test_open_mask_keeps_rectangle() {
        let (service, _) = service_with(MockBackend::new());
        let outline = MaskPath::new(vec![Point::new(0.0, 0.0), Point::new(20.0, 20.0)]);
        let shot = service
            .perform_capture(
                CaptureRequest::new(CaptureMode::Freeform)
                    .with_region(Rect::new(0, 0, 20, 20))
                    .with_mask(outline),
                None,
            )
            .await
            .unwrap();
        assert_eq!(shot.image.pixel(0, 0).unwrap()[3], 255);
    }
}
