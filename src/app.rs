//! Application controller
//!
//! Routes commands (from the CLI, the tray or the IPC socket) to the
//! capture service and the front-end. The front-end is abstract: a GUI
//! shows the selection overlay and editor window, while
//! [`HeadlessFrontend`] captures without interaction and saves straight to
//! disk.

use std::path::PathBuf;

use async_trait::async_trait;
use image::RgbaImage;
use tokio::sync::mpsc;

use crate::{
    capture::ImageBuffer,
    config::AppConfig,
    editor::EditorSession,
    error::{AppError, AppResult, CaptureError},
    ipc::Command,
    model::{CaptureMode, CaptureRequest},
    selection::Selection,
    service::CaptureService,
};

/// User-facing side of the application
#[async_trait]
pub trait Frontend: Send {
    /// Whether [`select_region`](Frontend::select_region) can ask the user
    /// for an area. Non-interactive front-ends fall back to fullscreen for
    /// area modes; window mode goes to the backend without a window id.
    fn supports_selection(&self) -> bool {
        true
    }

    /// Shows the selection overlay; `None` means the user cancelled
    async fn select_region(&mut self, mode: CaptureMode) -> Option<Selection>;

    /// Runs right before the backend grabs the screen (hide overlays here)
    fn before_capture(&mut self) {}

    /// Presents a screenshot for editing
    fn open_editor(&mut self, session: EditorSession) -> AppResult<()>;

    /// Reports a failed capture to the user
    fn notify_error(&mut self, error: &CaptureError);
}

/// Dispatches commands to the capture service and the front-end
#[derive(Debug)]
pub struct Controller<F> {
    config:   AppConfig,
    service:  CaptureService,
    frontend: F,
}

impl<F: Frontend> Controller<F> {
    pub fn new(config: AppConfig, service: CaptureService, frontend: F) -> Self {
        Self {
            config,
            service,
            frontend,
        }
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    fn save_dir(&self) -> AppResult<PathBuf> {
        self.config
            .screenshots_path()
            .map_err(|e| AppError::Capture(CaptureError::Io(e)))
    }

    /// Handles one command; returns `false` when the application should exit
    pub async fn handle(&mut self, command: Command) -> AppResult<bool> {
        tracing::debug!("Handling command {}", command);
        match command {
            Command::Snip => {
                let delay = self.config.default_delay;
                self.snip(CaptureMode::Rectangle, delay).await?;
                Ok(true)
            }
            Command::Editor => {
                self.open_blank_editor()?;
                Ok(true)
            }
            Command::Quit => {
                tracing::info!("Quit requested");
                Ok(false)
            }
        }
    }

    /// Processes commands until `Quit` or until every sender is gone
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            match self.handle(command).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => tracing::error!("Command {} failed: {}", command, e),
            }
        }
        tracing::info!("Controller stopped");
    }

    /// Runs one capture and opens the result in the editor.
    ///
    /// Returns `Ok(false)` when the user cancelled the selection. Capture
    /// failures are reported to the front-end and returned.
    pub async fn snip(&mut self, mode: CaptureMode, delay_seconds: f64) -> AppResult<bool> {
        let interactive = self.frontend.supports_selection();
        let mode = match mode {
            CaptureMode::Rectangle | CaptureMode::Freeform if !interactive => {
                tracing::warn!(
                    "No selection overlay available, capturing fullscreen instead of {}",
                    mode
                );
                CaptureMode::Fullscreen
            }
            other => other,
        };

        let (request, selection_rect) = match mode {
            CaptureMode::Fullscreen => (CaptureRequest::new(mode).with_delay(delay_seconds), None),
            CaptureMode::Window if !interactive => {
                tracing::debug!("No window picker available, capturing the active window");
                (CaptureRequest::new(mode).with_delay(delay_seconds), None)
            }
            _ => match self.frontend.select_region(mode).await {
                Some(selection) => {
                    let rect = selection.rect;
                    (selection.into_request(delay_seconds), Some(rect))
                }
                None => {
                    tracing::info!("Capture cancelled");
                    return Ok(false);
                }
            },
        };

        let frontend = &mut self.frontend;
        let result = self
            .service
            .perform_capture_with(request, selection_rect, || frontend.before_capture())
            .await;

        match result {
            Ok(shot) => {
                let session = EditorSession::from_screenshot(shot, self.save_dir()?)?;
                self.frontend.open_editor(session)?;
                Ok(true)
            }
            Err(e) => {
                self.frontend.notify_error(&e);
                Err(e.into())
            }
        }
    }

    /// Opens the editor on an empty placeholder canvas
    pub fn open_blank_editor(&mut self) -> AppResult<()> {
        let session = EditorSession::new(ImageBuffer::new(RgbaImage::new(0, 0)), self.save_dir()?)?;
        self.frontend.open_editor(session)
    }
}

/// Front-end without a display: captures fullscreen and saves to disk
#[derive(Debug, Default)]
pub struct HeadlessFrontend {
    output: Option<PathBuf>,
    saved:  Vec<PathBuf>,
}

impl HeadlessFrontend {
    /// Saves into the screenshot directory, or to `output` when given
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            saved: Vec::new(),
        }
    }

    /// Files written so far
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

#[async_trait]
impl Frontend for HeadlessFrontend {
    fn supports_selection(&self) -> bool {
        false
    }

    async fn select_region(&mut self, _mode: CaptureMode) -> Option<Selection> {
        None
    }

    fn open_editor(&mut self, session: EditorSession) -> AppResult<()> {
        let path = match self.output {
            Some(ref output) => session.save_as(output)?,
            None => session.save()?,
        };
        self.saved.push(path);
        Ok(())
    }

    fn notify_error(&mut self, error: &CaptureError) {
        tracing::error!("{} ({})", error, error.remediation_hint());
    }
}
