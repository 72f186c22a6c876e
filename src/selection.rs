//! Turning drag gestures into capture requests
//!
//! The selection overlay reports press/drag/release events in global pixel
//! coordinates. [`SelectionGesture`] accumulates them and produces a
//! [`Selection`]: the bounding rectangle handed to the service as the
//! selection rect, plus a clip outline for freeform selections.

use crate::model::{CaptureMode, CaptureRequest, MaskPath, Point, Rect};

/// A completed area selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Mode to request (window drags become rectangles)
    pub mode: CaptureMode,
    /// Bounding rectangle in global coordinates
    pub rect: Rect,
    /// Clip outline for freeform selections
    pub mask: Option<MaskPath>,
}

impl Selection {
    /// Builds the request for this selection.
    ///
    /// The rectangle is not stored in the request; pass [`Selection::rect`]
    /// as the service's selection rect.
    pub fn into_request(self, delay_seconds: f64) -> CaptureRequest {
        let request = CaptureRequest::new(self.mode).with_delay(delay_seconds);
        match self.mask {
            Some(mask) => request.with_mask(mask),
            None => request,
        }
    }
}

/// Rectangle (or window) drag from `start` to `end`
///
/// Returns `None` for a zero-area drag.
pub fn rect_selection(mode: CaptureMode, start: (i32, i32), end: (i32, i32)) -> Option<Selection> {
    let rect = Rect::from_corners(start, end);
    if rect.is_empty() {
        return None;
    }

    let mode = match mode {
        CaptureMode::Window => {
            tracing::debug!("Window selection handled as rectangle {}", rect);
            CaptureMode::Rectangle
        }
        other => other,
    };
    Some(Selection {
        mode,
        rect,
        mask: None,
    })
}

/// Freeform outline through `points`
///
/// Returns `None` with fewer than three points or a zero-area outline.
pub fn freeform_selection(points: Vec<Point>) -> Option<Selection> {
    if points.len() < 3 {
        return None;
    }

    let mask = MaskPath::new(points);
    let rect = mask.bounding_rect().filter(|r| !r.is_empty())?;
    Some(Selection {
        mode: CaptureMode::Freeform,
        rect,
        mask: Some(mask),
    })
}

/// In-progress drag on the selection overlay
#[derive(Debug, Clone)]
pub struct SelectionGesture {
    mode:     CaptureMode,
    start:    Option<(i32, i32)>,
    end:      (i32, i32),
    points:   Vec<Point>,
    dragging: bool,
}

impl SelectionGesture {
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            start: None,
            end: (0, 0),
            points: Vec::new(),
            dragging: false,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self, x: i32, y: i32) {
        self.start = Some((x, y));
        self.end = (x, y);
        self.points = vec![Point::from((x, y))];
        self.dragging = true;
    }

    pub fn drag(&mut self, x: i32, y: i32) {
        if !self.dragging {
            return;
        }
        self.end = (x, y);
        if self.mode == CaptureMode::Freeform {
            self.points.push(Point::from((x, y)));
        }
    }

    /// Ends the drag; `None` means the selection was cancelled or degenerate
    pub fn release(&mut self) -> Option<Selection> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;

        match self.mode {
            CaptureMode::Rectangle | CaptureMode::Window => {
                rect_selection(self.mode, self.start?, self.end)
            }
            CaptureMode::Freeform => freeform_selection(std::mem::take(&mut self.points)),
            CaptureMode::Fullscreen => None,
        }
    }

    /// Outline drawn while dragging (may be open)
    pub fn preview(&self) -> Option<MaskPath> {
        match self.mode {
            CaptureMode::Rectangle | CaptureMode::Window => {
                let rect = Rect::from_corners(self.start?, self.end);
                (!rect.is_empty()).then(|| MaskPath::from_rect(rect))
            }
            CaptureMode::Freeform if self.points.len() >= 2 => {
                Some(MaskPath::new(self.points.clone()))
            }
            _ => None,
        }
    }
}
