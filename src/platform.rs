//! Display session detection
//!
//! Used for diagnostics and to pick sensible capture defaults. Detection only
//! reads environment variables.

use std::{env, fmt};

/// Kind of graphical session the process runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    X11,
    Wayland,
    Unknown,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionType::X11 => "x11",
            SessionType::Wayland => "wayland",
            SessionType::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Detects the session type from the process environment
///
/// `XDG_SESSION_TYPE` wins; otherwise `WAYLAND_DISPLAY` is checked before
/// `DISPLAY`.
pub fn detect_session() -> SessionType {
    detect_session_with_env(|key| env::var(key).ok())
}

fn detect_session_with_env<F>(env_provider: F) -> SessionType
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env_provider(key).filter(|v| !v.is_empty());

    if let Some(kind) = non_empty("XDG_SESSION_TYPE") {
        match kind.to_ascii_lowercase().as_str() {
            "wayland" => return SessionType::Wayland,
            "x11" => return SessionType::X11,
            _ => {}
        }
    }

    if non_empty("WAYLAND_DISPLAY").is_some() {
        SessionType::Wayland
    } else if non_empty("DISPLAY").is_some() {
        SessionType::X11
    } else {
        SessionType::Unknown
    }
}
