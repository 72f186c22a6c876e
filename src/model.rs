//! Data models and type definitions for snipdesk
//!
//! This module defines the core types used throughout the application:
//! - Capture modes, requests and the resulting [`Screenshot`]
//! - Integer geometry in the shared virtual-desktop space
//! - Mask paths for non-rectangular selections

use std::{fmt, str::FromStr, time::Duration};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{capture::ImageBuffer, error::CaptureError};

/// How the user selects what to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Drag a rectangle
    Rectangle,
    /// Draw an arbitrary outline
    Freeform,
    /// Pick a window
    Window,
    /// Every attached display
    Fullscreen,
}

impl CaptureMode {
    /// Returns the short token used by the CLI and IPC messages
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Rectangle => "rect",
            CaptureMode::Freeform => "freeform",
            CaptureMode::Window => "window",
            CaptureMode::Fullscreen => "fullscreen",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureMode {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rect" | "rectangle" => Ok(CaptureMode::Rectangle),
            "freeform" | "free" => Ok(CaptureMode::Freeform),
            "window" => Ok(CaptureMode::Window),
            "fullscreen" | "full" => Ok(CaptureMode::Fullscreen),
            _ => Err(CaptureError::UnsupportedMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Integer rectangle in virtual-desktop coordinates
///
/// Origins may be negative for displays left of or above the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x:      i32,
    /// Top edge
    pub y:      i32,
    /// Width in pixels
    pub width:  i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a normalized rectangle spanning two corner points.
    ///
    /// ```
    /// use snipdesk::model::Rect;
    ///
    /// let rect = Rect::from_corners((120, 80), (20, 10));
    /// assert_eq!(rect, Rect::new(20, 10, 100, 70));
    /// ```
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        let (left, right) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (top, bottom) = if a.1 <= b.1 { (a.1, b.1) } else { (b.1, a.1) };
        Self::new(left, top, right - left, bottom - top)
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// True when the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Area in pixels (zero for empty rectangles)
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// Returns the overlapping part of two rectangles, or `None`
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        let rect = Rect::new(left, top, right - left, bottom - top);
        if rect.is_empty() { None } else { Some(rect) }
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Returns this rectangle moved by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Floating-point point used for strokes and mask outlines
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Creates a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f32, y as f32)
    }
}

/// Closed outline used to clip a capture to a non-rectangular area
///
/// The outline is implicitly closed: the last point connects back to the
/// first whenever there are at least three points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaskPath {
    points: Vec<Point>,
}

impl MaskPath {
    /// Creates a mask path from outline points
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a rectangular mask path
    pub fn from_rect(rect: Rect) -> Self {
        let (l, t) = (rect.x as f32, rect.y as f32);
        let (r, b) = (rect.right() as f32, rect.bottom() as f32);
        Self::new(vec![Point::new(l, t), Point::new(r, t), Point::new(r, b), Point::new(l, b)])
    }

    /// Approximates a circle with `segments` straight edges
    pub fn circle(center: Point, radius: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let points = (0..segments)
            .map(|i| {
                let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
                Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect();
        Self::new(points)
    }

    /// Outline points in drawing order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of outline points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the path has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the outline encloses an area (three or more points)
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 3
    }

    /// Integer bounding box aligned outward to whole pixels
    pub fn bounding_rect(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let left = min_x.floor() as i32;
        let top = min_y.floor() as i32;
        let right = max_x.ceil() as i32;
        let bottom = max_y.ceil() as i32;
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Returns the path moved by `(dx, dy)`
    pub fn translated(&self, dx: f32, dy: f32) -> MaskPath {
        MaskPath::new(self.points.iter().map(|p| Point::new(p.x + dx, p.y + dy)).collect())
    }

    /// Non-zero winding containment test for a point
    pub fn contains(&self, point: Point) -> bool {
        if !self.is_closed() {
            return false;
        }

        let mut winding = 0i32;
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let cross = (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y);
            if a.y <= point.y {
                if b.y > point.y && cross > 0.0 {
                    winding += 1;
                }
            } else if b.y <= point.y && cross < 0.0 {
                winding -= 1;
            }
        }
        winding != 0
    }
}

/// A single capture request, built by the selection front-end
///
/// Requests are consumed by value by `CaptureService::perform_capture`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Selection mode
    pub mode:          CaptureMode,
    /// Seconds to wait before invoking the backend
    pub delay_seconds: f64,
    /// Explicit capture region in global coordinates
    pub region:        Option<Rect>,
    /// Window to capture in window mode
    pub window_id:     Option<u64>,
    /// Non-rectangular outline in global coordinates
    pub mask_path:     Option<MaskPath>,
}

impl CaptureRequest {
    /// Creates a request with no delay, region, window or mask
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            delay_seconds: 0.0,
            region: None,
            window_id: None,
            mask_path: None,
        }
    }

    /// Sets the pre-capture delay; negative values are clamped to zero
    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay_seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self
    }

    /// Sets the capture region
    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the window to capture
    pub fn with_window(mut self, window_id: u64) -> Self {
        self.window_id = Some(window_id);
        self
    }

    /// Sets the clip outline
    pub fn with_mask(mut self, mask: MaskPath) -> Self {
        self.mask_path = Some(mask);
        self
    }

    /// Returns the delay as a `Duration`, saturating at `Duration::MAX`
    pub fn delay(&self) -> Duration {
        if self.delay_seconds.is_finite() && self.delay_seconds > 0.0 {
            Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

/// Outcome of a successful capture
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Captured (and possibly masked) pixels
    pub image:        ImageBuffer,
    /// Mode the capture was requested with
    pub mode:         CaptureMode,
    /// When the capture completed
    pub created_at:   DateTime<Local>,
    /// Backend that produced the pixels
    pub backend_name: String,
}
