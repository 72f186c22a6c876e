//! Capture backend traits and implementations
//!
//! This module provides the abstractions the capture service depends on:
//!
//! - [`ImageBuffer`]: RGBA pixel buffer with crop and pixmap conversions
//! - [`CaptureBackend`]: trait implemented by every capture backend
//! - [`DisplaySource`] and [`ScreenBackend`]: per-monitor providers and the
//!   generic backend that composes them into one virtual canvas
//! - [`compositor`] and [`mask`]: multi-monitor composition and freeform
//!   clipping
//! - [`MockBackend`] / [`MockDisplaySource`]: display-free doubles for tests
//!   and headless runs

use std::sync::Arc;

pub mod compositor;
pub mod image_buffer;
pub mod mask;
pub mod mock;
pub mod screen_backend;
pub mod traits;

#[cfg(feature = "xcap-backend")]
pub mod xcap_source;

pub use image_buffer::ImageBuffer;
pub use mock::{MockBackend, MockCall, MockDisplaySource};
pub use screen_backend::ScreenBackend;
pub use traits::{CaptureBackend, DisplayFrame, DisplaySource, RegionCapture};
#[cfg(feature = "xcap-backend")]
pub use xcap_source::XcapDisplaySource;

use crate::{
    config::BackendChoice,
    error::CaptureResult,
    platform,
};

/// Creates the capture backend selected by `choice`.
///
/// `Auto` resolves to the xcap backend when the crate is built with the
/// `xcap-backend` feature.
///
/// # Errors
///
/// Returns [`CaptureError::BackendNotAvailable`] when the requested backend
/// was not compiled in.
///
/// # Examples
///
/// ```
/// use snipdesk::{capture::create_default_backend, config::BackendChoice};
///
/// let backend = create_default_backend(BackendChoice::Mock).unwrap();
/// assert_eq!(backend.name(), "mock");
/// ```
pub fn create_default_backend(choice: BackendChoice) -> CaptureResult<Arc<dyn CaptureBackend>> {
    let session = platform::detect_session();
    tracing::debug!("Creating capture backend {:?} for {} session", choice, session);

    match choice {
        BackendChoice::Mock => {
            tracing::info!("Using mock capture backend");
            Ok(Arc::new(MockBackend::new()))
        }
        BackendChoice::Auto | BackendChoice::Xcap => xcap_backend(),
    }
}

#[cfg(feature = "xcap-backend")]
fn xcap_backend() -> CaptureResult<Arc<dyn CaptureBackend>> {
    tracing::info!("Using xcap capture backend");
    Ok(Arc::new(ScreenBackend::new(XcapDisplaySource::new())))
}

#[cfg(not(feature = "xcap-backend"))]
fn xcap_backend() -> CaptureResult<Arc<dyn CaptureBackend>> {
    tracing::error!("xcap capture backend requested but not compiled in");
    Err(crate::error::CaptureError::BackendNotAvailable {
        reason: "built without the xcap-backend feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_backend_is_always_available() {
        let backend = create_default_backend(BackendChoice::Mock).unwrap();
        assert_eq!(backend.name(), "mock");
    }

    #[cfg(not(feature = "xcap-backend"))]
    #[test]
    fn test_auto_without_xcap_is_not_available() {
        let err = create_default_backend(BackendChoice::Auto).err().unwrap();
        assert!(matches!(err, crate::error::CaptureError::BackendNotAvailable { .. }));
    }
}
