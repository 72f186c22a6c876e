//! Editor session: annotate, save, copy
//!
//! An [`EditorSession`] owns the [`LayeredCanvas`] for one screenshot and
//! knows where screenshots are saved. The editor UI forwards pointer events
//! and toolbar actions here.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

use crate::{
    canvas::{LayeredCanvas, Tool},
    capture::ImageBuffer,
    error::{AppResult, CaptureError, CaptureResult},
    model::{Point, Screenshot},
};

/// `Screenshot_YYYY-MM-DD_HH-MM-SS.png` for `now`
pub fn default_filename(now: DateTime<Local>) -> String {
    format!("Screenshot_{}.png", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// First path in `dir` not already taken, starting with `name`
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, "png"));
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// One open screenshot in the editor
#[derive(Debug, Clone)]
pub struct EditorSession {
    canvas:   LayeredCanvas,
    save_dir: PathBuf,
}

impl EditorSession {
    /// Opens `image` for editing; saves go to `save_dir`
    pub fn new(image: ImageBuffer, save_dir: impl Into<PathBuf>) -> AppResult<Self> {
        Ok(Self {
            canvas:   LayeredCanvas::new(image.into_inner())?,
            save_dir: save_dir.into(),
        })
    }

    /// Opens a capture result for editing
    pub fn from_screenshot(shot: Screenshot, save_dir: impl Into<PathBuf>) -> AppResult<Self> {
        tracing::debug!(
            "Opening {} capture from '{}' taken at {}",
            shot.mode,
            shot.backend_name,
            shot.created_at.format("%H:%M:%S")
        );
        Self::new(shot.image, save_dir)
    }

    /// Replaces the screenshot being edited, discarding annotations
    pub fn load(&mut self, image: ImageBuffer) -> AppResult<bool> {
        Ok(self.canvas.replace_base(image.into_inner())?)
    }

    pub fn canvas(&self) -> &LayeredCanvas {
        &self.canvas
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.canvas.set_tool(tool);
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.canvas.begin_stroke(point);
    }

    pub fn stroke_to(&mut self, point: Point) {
        self.canvas.stroke_to(point);
    }

    /// Returns whether a stroke was finished
    pub fn end_stroke(&mut self) -> bool {
        self.canvas.end_stroke()
    }

    pub fn undo(&mut self) -> bool {
        self.canvas.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.canvas.redo()
    }

    /// Flattened image for the clipboard
    pub fn copy_image(&self) -> ImageBuffer {
        ImageBuffer::new(self.canvas.flatten())
    }

    /// Saves into the screenshot directory under a timestamped name.
    ///
    /// The directory is created if needed. An existing file is never
    /// overwritten; a numeric suffix is added instead.
    pub fn save(&self) -> CaptureResult<PathBuf> {
        fs::create_dir_all(&self.save_dir)?;
        let path = unique_path(&self.save_dir, &default_filename(Local::now()));
        self.copy_image().save(&path)?;
        tracing::info!("Screenshot saved to {}", path.display());
        Ok(path)
    }

    /// Saves to `path`; the extension must be `png`, `jpg` or `jpeg`
    pub fn save_as(&self, path: &Path) -> CaptureResult<PathBuf> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !matches!(ext.as_str(), "png" | "jpg" | "jpeg") {
            return Err(CaptureError::Image(format!(
                "Unsupported file type for {}; use .png, .jpg or .jpeg",
                path.display()
            )));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.copy_image().save(path)?;
        tracing::info!("Screenshot saved to {}", path.display());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use image::Rgba;
    use tempfile::TempDir;

    use super::*;

    fn session(dir: &Path) -> EditorSession {
        EditorSession::new(ImageBuffer::solid(40, 30, Rgba([255, 255, 255, 255])), dir).unwrap()
    }

    #[test]
    fn test_default_filename_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(default_filename(now), "Screenshot_2024-03-09_07-05-01.png");
    }

    #[test]
    fn test_save_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Pictures").join("Screenshots");
        let editor = session(&dir);

        let path = editor.save().unwrap();
        assert!(path.starts_with(&dir));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("Screenshot_"));

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (40, 30));
    }

    #[test]
    fn test_save_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let editor = session(tmp.path());
        let first = editor.save().unwrap();
        let second = editor.save().unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_save_as_includes_annotations() {
        let tmp = TempDir::new().unwrap();
        let mut editor = session(tmp.path());
        editor.set_tool(Tool::Pen);
        editor.begin_stroke(Point::new(0.0, 15.0));
        editor.stroke_to(Point::new(39.0, 15.0));
        assert!(editor.end_stroke());

        let path = editor.save_as(&tmp.path().join("out.png")).unwrap();
        let saved = image::open(&path).unwrap().to_rgba8();
        assert_ne!(saved.get_pixel(20, 15), &Rgba([255, 255, 255, 255]));
        assert_eq!(saved.get_pixel(20, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_save_as_jpeg() {
        let tmp = TempDir::new().unwrap();
        let editor = session(tmp.path());
        let path = editor.save_as(&tmp.path().join("out.JPG")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_as_rejects_unknown_extension() {
        let tmp = TempDir::new().unwrap();
        let editor = session(tmp.path());
        let err = editor.save_as(&tmp.path().join("out.bmp")).unwrap_err();
        assert!(matches!(err, CaptureError::Image(_)));
    }

    #[test]
    fn test_load_resets_annotations() {
        let tmp = TempDir::new().unwrap();
        let mut editor = session(tmp.path());
        editor.begin_stroke(Point::new(0.0, 15.0));
        editor.stroke_to(Point::new(39.0, 15.0));
        editor.end_stroke();

        let next = ImageBuffer::solid(10, 10, Rgba([0, 0, 0, 255]));
        assert!(editor.load(next.clone()).unwrap());
        assert_eq!(editor.copy_image(), next);
    }
}
