//! Controller -> capture -> editor workflow tests

mod common;

use std::sync::Arc;

use common::*;
use snipdesk::{
    app::Controller,
    canvas::Tool,
    capture::{ImageBuffer, MockBackend, MockCall, MockDisplaySource, ScreenBackend},
    config::AppConfig,
    editor::EditorSession,
    ipc::Command,
    model::{CaptureMode, Point, Rect},
    selection::{freeform_selection, rect_selection},
    service::CaptureService,
};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> AppConfig {
    AppConfig {
        screenshots_dir: dir.path().join("shots").to_string_lossy().into_owned(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_rectangle_snip_opens_editor() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let selection = rect_selection(CaptureMode::Rectangle, (10, 10), (110, 60));
    let mut controller = Controller::new(
        config_in(&dir),
        CaptureService::new(backend.clone()),
        ScriptedFrontend::with_selections([selection]),
    );

    assert!(controller.snip(CaptureMode::Rectangle, 0.0).await.unwrap());

    let log = &controller.frontend().log;
    assert_eq!(log.selections_requested, vec![CaptureMode::Rectangle]);
    assert_eq!(log.before_capture_calls, 1);
    assert_eq!(log.sessions.len(), 1);
    assert_eq!(log.sessions[0].canvas().dimensions(), (100, 50));
    assert_eq!(backend.calls(), vec![MockCall::Region(Rect::new(10, 10, 100, 50))]);
}

#[tokio::test]
async fn test_cancelled_selection_does_not_capture() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let mut controller = Controller::new(
        config_in(&dir),
        CaptureService::new(backend.clone()),
        ScriptedFrontend::with_selections([None]),
    );

    assert!(!controller.snip(CaptureMode::Freeform, 0.0).await.unwrap());
    assert!(backend.calls().is_empty());
    assert_eq!(controller.frontend().log.before_capture_calls, 0);
}

#[tokio::test]
async fn test_fullscreen_snip_skips_selection() {
    let dir = TempDir::new().unwrap();
    let source = MockDisplaySource::dual_horizontal(320, 200);
    let mut controller = Controller::new(
        config_in(&dir),
        CaptureService::new(Arc::new(ScreenBackend::new(source))),
        ScriptedFrontend::default(),
    );

    assert!(controller.snip(CaptureMode::Fullscreen, 0.0).await.unwrap());
    let log = &controller.frontend().log;
    assert!(log.selections_requested.is_empty());
    assert_eq!(log.sessions[0].canvas().dimensions(), (640, 200));
}

#[tokio::test]
async fn test_capture_error_is_reported_to_frontend() {
    let dir = TempDir::new().unwrap();
    let selection = rect_selection(CaptureMode::Rectangle, (5000, 5000), (5100, 5100));
    let mut controller = Controller::new(
        config_in(&dir),
        CaptureService::new(Arc::new(MockBackend::new())),
        ScriptedFrontend::with_selections([selection]),
    );

    assert!(controller.snip(CaptureMode::Rectangle, 0.0).await.is_err());
    let log = &controller.frontend().log;
    assert_eq!(log.errors.len(), 1);
    assert!(log.errors[0].contains("outside the screen"));
    assert!(log.sessions.is_empty());
}

#[tokio::test]
async fn test_annotate_and_save_freeform_capture() {
    let dir = TempDir::new().unwrap();
    let selection = freeform_selection(vec![
        Point::new(0.0, 0.0),
        Point::new(80.0, 0.0),
        Point::new(80.0, 80.0),
        Point::new(0.0, 80.0),
    ]);
    let mut controller = Controller::new(
        config_in(&dir),
        CaptureService::new(Arc::new(MockBackend::new())),
        ScriptedFrontend::with_selections([selection]),
    );
    assert!(controller.snip(CaptureMode::Freeform, 0.0).await.unwrap());

    let mut sessions = std::mem::take(&mut controller.frontend_mut().log.sessions);
    let mut session = sessions.remove(0);
    session.set_tool(Tool::Highlighter);
    session.begin_stroke(Point::new(0.0, 40.0));
    session.stroke_to(Point::new(79.0, 40.0));
    assert!(session.end_stroke());

    let path = session.save().unwrap();
    assert!(path.starts_with(dir.path().join("shots")));
    let saved = image::open(&path).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (80, 80));

    assert!(session.undo());
    let base = ImageBuffer::new(session.canvas().base().clone());
    assert_eq!(session.copy_image(), base);
}

#[tokio::test]
async fn test_run_loop_handles_ipc_commands() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let selection = rect_selection(CaptureMode::Rectangle, (0, 0), (20, 20));
    let mut controller = Controller::new(
        config_in(&dir),
        CaptureService::new(backend.clone()),
        ScriptedFrontend::with_selections([selection]),
    );

    let (tx, rx) = tokio::sync::mpsc::channel(4);
    tx.send(Command::Snip).await.unwrap();
    tx.send(Command::Editor).await.unwrap();
    tx.send(Command::Quit).await.unwrap();
    controller.run(rx).await;

    let log = &controller.frontend().log;
    assert_eq!(log.sessions.len(), 2);
    // Blank editor uses the placeholder canvas
    assert_eq!(log.sessions[1].canvas().dimensions(), (800, 600));
    assert_eq!(backend.calls().len(), 1);
}

#[test]
fn test_tool_switch_on_session_without_controller() {
    let dir = TempDir::new().unwrap();
    let mut session = EditorSession::new(ImageBuffer::solid(20, 20, WHITE), dir.path()).unwrap();
    session.set_tool(Tool::Eraser);
    assert_eq!(session.canvas().tool(), Tool::Eraser);
}
