//! Error types for capture, canvas and configuration operations
//!
//! This module defines the application error family. Failures below the
//! capture service boundary are expressed as [`BackendError`]; the service
//! normalizes every one of them into a [`CaptureError`] so front-ends only
//! ever deal with a single capture error type. Settings failures are
//! [`ConfigError`]. Both roll up into [`AppError`].
//!
//! Each user-facing error offers a `remediation_hint()` with next steps.

use std::path::PathBuf;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type alias for capture backends and display sources
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for application-level operations
pub type AppResult<T> = Result<T, AppError>;

/// Failure reported by a capture backend or display source.
///
/// These never reach front-ends directly; `CaptureService` wraps them in
/// [`CaptureError::Backend`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// No display could be queried
    #[error("No display is available for capture")]
    NoDisplay,

    /// Capture produced an image with zero area
    #[error("Captured image is degenerate ({width}x{height})")]
    Degenerate {
        /// Width of the degenerate image
        width:  u32,
        /// Height of the degenerate image
        height: u32,
    },

    /// Requested region has a non-positive width or height
    #[error("Invalid capture rectangle {width}x{height}")]
    InvalidRegion {
        /// Requested width
        width:  i32,
        /// Requested height
        height: i32,
    },

    /// Requested region does not intersect the captured canvas
    #[error("Selected area ({x}, {y}, {width}x{height}) is outside the screen")]
    OutOfBounds {
        /// Requested x origin
        x:      i32,
        /// Requested y origin
        y:      i32,
        /// Requested width
        width:  i32,
        /// Requested height
        height: i32,
    },

    /// Reliable per-window capture cannot be guaranteed here
    #[error("Window capture is not supported by backend '{backend}' in this environment")]
    WindowCaptureUnsupported {
        /// Backend that refused the window capture
        backend: String,
    },

    /// Platform provider failed (display server, portal, driver)
    #[error("Display provider failed: {0}")]
    Provider(String),
}

/// Error type surfaced by the capture service to its callers
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Area modes were requested without a region or selection rectangle
    #[error("No region provided for area capture")]
    NoRegion,

    /// Capture mode token is not recognized
    #[error("Unsupported capture mode: {mode}")]
    UnsupportedMode {
        /// The unrecognized mode token
        mode: String,
    },

    /// The backend reported a failure
    #[error("Capture failed on backend '{backend}': {source}")]
    Backend {
        /// Name of the backend that failed
        backend: String,
        /// Underlying backend failure
        #[source]
        source:  BackendError,
    },

    /// The backend failed in an unexpected way (panicked)
    #[error("Unexpected capture failure on backend '{backend}': {message}")]
    Unexpected {
        /// Name of the backend that failed
        backend: String,
        /// Panic payload, if it carried a message
        message: String,
    },

    /// No capture backend could be created for this environment
    #[error("No capture backend is available: {reason}")]
    BackendNotAvailable {
        /// Why backend creation failed
        reason: String,
    },

    /// Image encoding or processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use snipdesk::error::CaptureError;
    ///
    /// let hint = CaptureError::NoRegion.remediation_hint();
    /// assert!(hint.contains("Drag"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::NoRegion => {
                "Drag a selection on the overlay before releasing the mouse, or use fullscreen \
                 mode."
            }
            CaptureError::UnsupportedMode { .. } => {
                "Use one of the capture modes: rect, freeform, window, fullscreen."
            }
            CaptureError::Backend { source, .. } => match source {
                BackendError::NoDisplay => {
                    "No display was detected. Ensure a graphical session is running and the \
                     DISPLAY or WAYLAND_DISPLAY environment variable is set."
                }
                BackendError::Degenerate { .. } => {
                    "The screen returned an empty image. Retry the capture; on Wayland grant the \
                     screenshot permission when prompted."
                }
                BackendError::InvalidRegion { .. } => "Select an area larger than zero pixels.",
                BackendError::OutOfBounds { .. } => {
                    "The selected area lies outside every monitor. Select an area on screen."
                }
                BackendError::WindowCaptureUnsupported { .. } => {
                    "Window capture is unreliable here. Use rectangle mode and drag around the \
                     window instead."
                }
                BackendError::Provider(_) => {
                    "The display server refused the capture. Check screen recording permissions \
                     for this application."
                }
            },
            CaptureError::Unexpected { .. } => {
                "An unexpected error occurred inside the capture backend. Check the log file for \
                 details and retry."
            }
            CaptureError::BackendNotAvailable { .. } => {
                "Build with the xcap-backend feature or select the mock backend in the \
                 configuration."
            }
            CaptureError::Image(_) => {
                "Image processing failed. Try saving as PNG or choose a different location."
            }
            CaptureError::Io(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
        }
    }

    /// Returns the wrapped backend failure, if any.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            CaptureError::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error raised while allocating canvas layers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    /// Layer pixmap could not be allocated for the given size
    #[error("Canvas layer of {width}x{height} could not be allocated")]
    LayerAllocation {
        /// Requested layer width
        width:  u32,
        /// Requested layer height
        height: u32,
    },
}

/// Problem loading or saving the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Platform has no configuration directory
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Config file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Config file path
        path:   PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the settings schema
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Config file path
        path:   PathBuf,
        /// Underlying JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// Config file could not be written
    #[error("Failed to save config to {path}: {source}")]
    Write {
        /// Config file path
        path:   PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Returns an actionable remediation hint for this error
    pub fn remediation_hint(&self) -> &str {
        match self {
            ConfigError::NoConfigDir => "Set XDG_CONFIG_HOME or HOME so a config directory exists.",
            ConfigError::Read { .. } => "Check the permissions of the configuration file.",
            ConfigError::Parse { .. } => {
                "Fix the JSON syntax in the configuration file or delete it to restore defaults."
            }
            ConfigError::Write { .. } => {
                "Check that the configuration directory is writable and the disk is not full."
            }
        }
    }
}

/// Application error family
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Capture path failure
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Canvas failure
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Settings failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Single-instance socket failure
    #[error("Instance socket error: {0}")]
    Ipc(#[source] std::io::Error),
}
