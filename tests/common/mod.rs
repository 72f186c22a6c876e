//! Shared test utilities for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use snipdesk::{
    app::Frontend,
    capture::{DisplayFrame, MockDisplaySource},
    editor::EditorSession,
    error::{AppResult, CaptureError},
    model::{CaptureMode, Rect},
    selection::Selection,
};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Display of a single colour at `(x, y)`
pub fn solid_frame(x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) -> DisplayFrame {
    DisplayFrame::new(
        Rect::new(x, y, width as i32, height as i32),
        RgbaImage::from_pixel(width, height, color),
    )
}

/// Primary 1920x1080 (red) with a 1280x1024 blue monitor to its left,
/// offset 56px down
pub fn left_of_primary_layout() -> MockDisplaySource {
    MockDisplaySource::with_displays(vec![
        solid_frame(0, 0, 1920, 1080, RED),
        solid_frame(-1280, 56, 1280, 1024, BLUE),
    ])
}

/// What a [`ScriptedFrontend`] observed
#[derive(Debug, Default)]
pub struct FrontendLog {
    pub selections_requested: Vec<CaptureMode>,
    pub before_capture_calls: usize,
    pub sessions:             Vec<EditorSession>,
    pub errors:               Vec<String>,
}

/// Front-end answering selection prompts from a queue
#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    pub selections: VecDeque<Option<Selection>>,
    pub log:        FrontendLog,
}

impl ScriptedFrontend {
    pub fn with_selections(selections: impl IntoIterator<Item = Option<Selection>>) -> Self {
        Self {
            selections: selections.into_iter().collect(),
            log:        FrontendLog::default(),
        }
    }
}

#[async_trait]
impl Frontend for ScriptedFrontend {
    async fn select_region(&mut self, mode: CaptureMode) -> Option<Selection> {
        self.log.selections_requested.push(mode);
        self.selections.pop_front().flatten()
    }

    fn before_capture(&mut self) {
        self.log.before_capture_calls += 1;
    }

    fn open_editor(&mut self, session: EditorSession) -> AppResult<()> {
        self.log.sessions.push(session);
        Ok(())
    }

    fn notify_error(&mut self, error: &CaptureError) {
        self.log.errors.push(error.to_string());
    }
}
