//! Logging setup
//!
//! Installs a `tracing-subscriber` registry writing to
//! `$XDG_CACHE_HOME/snipdesk/snipdesk.log` and, optionally, stderr. Lines look
//! like `2025-01-31 14:02:11 [INFO] snipdesk::service - Capture finished`.
//! `RUST_LOG` overrides the configured level.

use std::{
    fmt,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{APP_DIR, AppConfig};

/// Log file name inside [`log_dir`]
pub const LOG_FILE: &str = "snipdesk.log";

/// Size at which the log file is rotated on startup
pub const MAX_LOG_BYTES: u64 = 2 * 1024 * 1024;

/// Rotated files kept (`snipdesk.log.1` .. `snipdesk.log.3`)
pub const LOG_BACKUPS: usize = 3;

/// `timestamp [LEVEL] target - message` line format
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} [{}] {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            meta.level(),
            meta.target()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `$XDG_CACHE_HOME/snipdesk`, or the temp dir when there is no cache dir
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Rotates `path` when it has grown past `max_bytes`.
///
/// Returns whether a rotation happened.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, backups: usize) -> io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size < max_bytes || backups == 0 {
        return Ok(false);
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..backups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;
    Ok(true)
}

/// Installs the global subscriber; returns the log file path.
///
/// # Errors
///
/// Fails when the log directory cannot be created, the file cannot be
/// opened, or a global subscriber is already installed.
pub fn setup_logging(config: &AppConfig, console: bool) -> io::Result<PathBuf> {
    let dir = log_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    let rotated = rotate_if_needed(&path, MAX_LOG_BYTES, LOG_BACKUPS)?;

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(io::Error::other)?;

    if rotated {
        tracing::info!("Rotated log file {}", path.display());
    }
    tracing::debug!("Logging to {}", path.display());
    Ok(path)
}
