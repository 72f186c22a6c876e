//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::model::CaptureMode;

#[derive(Debug, Parser)]
#[command(name = "snipdesk")]
#[command(version, about = "Screenshot capture and annotation tool")]
pub struct Args {
    /// Start a capture right away instead of the resident service
    #[arg(long)]
    pub snip: bool,

    /// Capture mode used with --snip
    #[arg(long, value_enum, default_value_t = ModeArg::Rect)]
    pub mode: ModeArg,

    /// Seconds to wait before capturing (defaults to the configured delay)
    #[arg(long)]
    pub delay: Option<f64>,

    /// Also log to stderr
    #[arg(long)]
    pub log_console: bool,

    /// Write the capture here instead of the screenshot directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// `--mode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Rect,
    Freeform,
    Window,
    Fullscreen,
}

impl From<ModeArg> for CaptureMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Rect => CaptureMode::Rectangle,
            ModeArg::Freeform => CaptureMode::Freeform,
            ModeArg::Window => CaptureMode::Window,
            ModeArg::Fullscreen => CaptureMode::Fullscreen,
        }
    }
}

impl Args {
    /// Delay to use: `--delay` if given and valid, else `default`
    pub fn delay_or(&self, default: f64) -> f64 {
        match self.delay {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["snipdesk"]).unwrap();
        assert!(!args.snip);
        assert_eq!(args.mode, ModeArg::Rect);
        assert_eq!(args.delay_or(2.0), 2.0);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_snip_flags() {
        let args = Args::try_parse_from([
            "snipdesk",
            "--snip",
            "--mode",
            "freeform",
            "--delay",
            "3",
            "--log-console",
            "-o",
            "/tmp/shot.png",
        ])
        .unwrap();

        assert!(args.snip);
        assert!(args.log_console);
        assert_eq!(CaptureMode::from(args.mode), CaptureMode::Freeform);
        assert_eq!(args.delay_or(0.0), 3.0);
        assert_eq!(args.output, Some(PathBuf::from("/tmp/shot.png")));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["snipdesk", "--mode", "lasso"]).is_err());
    }

    #[test]
    fn test_negative_delay_uses_default() {
        let args = Args::try_parse_from(["snipdesk", "--delay=-1"]).unwrap();
        assert_eq!(args.delay_or(5.0), 5.0);
    }
}
