//! Layered annotation canvas
//!
//! A [`LayeredCanvas`] keeps the captured screenshot as a read-only base
//! layer and draws every annotation onto a separate transparent layer of the
//! same size. The eraser clears annotation pixels only, so erasing reveals
//! the untouched screenshot underneath. Undo history stores snapshots of the
//! annotation layer alone.
//!
//! # Examples
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use snipdesk::{canvas::{LayeredCanvas, Tool}, model::Point};
//!
//! let base = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
//! let mut canvas = LayeredCanvas::new(base.clone()).unwrap();
//!
//! canvas.set_tool(Tool::Pen);
//! canvas.begin_stroke(Point::new(10.0, 50.0));
//! canvas.stroke_to(Point::new(90.0, 50.0));
//! canvas.end_stroke();
//! assert_ne!(canvas.flatten(), base);
//!
//! canvas.undo();
//! assert_eq!(canvas.flatten(), base);
//! ```

pub mod undo;

use image::{Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

pub use self::undo::{DEFAULT_MAX_DEPTH, UndoStack};
use crate::{capture::image_buffer::mul_div255, error::CanvasError, model::Point};

/// Size of the placeholder base used when no screenshot is available
pub const PLACEHOLDER_SIZE: (u32, u32) = (800, 600);

/// Annotation tool applied by stroke segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    /// No tool selected; strokes draw nothing
    None,
    /// Opaque thin line
    #[default]
    Pen,
    /// Wide translucent line
    Highlighter,
    /// Clears annotation pixels under a circular brush
    Eraser,
}

/// Colours and sizes used by each tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub pen_color:         Rgba<u8>,
    pub pen_width:         f32,
    pub highlighter_color: Rgba<u8>,
    pub highlighter_width: f32,
    /// Eraser brush diameter in pixels
    pub eraser_size:       f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pen_color:         Rgba([0xDC, 0x14, 0x3C, 255]),
            pen_width:         3.0,
            highlighter_color: Rgba([255, 255, 0, 120]),
            highlighter_width: 15.0,
            eraser_size:       20.0,
        }
    }
}

/// Base layer plus transparent annotation layer with undo history
#[derive(Debug, Clone)]
pub struct LayeredCanvas {
    base:       RgbaImage,
    annotation: Pixmap,
    history:    UndoStack<Pixmap>,
    tool:       Tool,
    settings:   ToolSettings,
    last_point: Option<Point>,
}

fn placeholder() -> RgbaImage {
    let (w, h) = PLACEHOLDER_SIZE;
    RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
}

fn blank_layer(width: u32, height: u32) -> Result<Pixmap, CanvasError> {
    Pixmap::new(width, height).ok_or(CanvasError::LayerAllocation { width, height })
}

impl LayeredCanvas {
    /// Creates a canvas over `base`.
    ///
    /// A zero-area `base` is replaced with an 800x600 white placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::LayerAllocation`] if the annotation layer
    /// cannot be allocated.
    pub fn new(base: RgbaImage) -> Result<Self, CanvasError> {
        let base = if base.width() == 0 || base.height() == 0 {
            tracing::debug!("Empty base image, using {:?} placeholder", PLACEHOLDER_SIZE);
            placeholder()
        } else {
            base
        };

        let annotation = blank_layer(base.width(), base.height())?;
        let mut history = UndoStack::default();
        history.push(annotation.clone());

        Ok(Self {
            base,
            annotation,
            history,
            tool: Tool::default(),
            settings: ToolSettings::default(),
            last_point: None,
        })
    }

    /// Replaces the tool settings
    pub fn with_settings(mut self, settings: ToolSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Resets the canvas onto `base`: blank annotation layer, history holding
    /// only the blank snapshot. Tool and settings are kept.
    ///
    /// A zero-area `base` is replaced with the placeholder, as in [`new`](Self::new).
    pub fn initialize(&mut self, base: RgbaImage) -> Result<(), CanvasError> {
        let (tool, settings) = (self.tool, self.settings);
        *self = Self::new(base)?.with_settings(settings);
        self.tool = tool;
        tracing::debug!("Canvas initialized: {}x{}", self.base.width(), self.base.height());
        Ok(())
    }

    /// Swaps in a new base image, discarding annotations and history.
    ///
    /// Returns `Ok(false)` without changing anything when `image` is empty.
    pub fn replace_base(&mut self, image: RgbaImage) -> Result<bool, CanvasError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(false);
        }
        self.initialize(image)?;
        Ok(true)
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    /// Screenshot layer
    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// Annotation layer (premultiplied)
    pub fn annotation(&self) -> &Pixmap {
        &self.annotation
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Starts a stroke at `point`, saving the annotation layer for undo
    pub fn begin_stroke(&mut self, point: Point) {
        self.history.push(self.annotation.clone());
        self.last_point = Some(point);
    }

    /// Draws the current tool from the previous point to `point`.
    ///
    /// Does nothing outside a stroke.
    pub fn stroke_to(&mut self, point: Point) {
        let Some(from) = self.last_point else {
            return;
        };
        self.apply_stroke_segment(self.tool, from, point);
        self.last_point = Some(point);
    }

    /// Finishes the current stroke; returns whether one was active
    pub fn end_stroke(&mut self) -> bool {
        self.last_point.take().is_some()
    }

    /// Applies one segment of `tool` to the annotation layer
    pub fn apply_stroke_segment(&mut self, tool: Tool, from: Point, to: Point) {
        let settings = self.settings;
        match tool {
            Tool::None => {}
            Tool::Pen => self.draw_line(from, to, settings.pen_color, settings.pen_width),
            Tool::Highlighter => {
                self.draw_line(from, to, settings.highlighter_color, settings.highlighter_width)
            }
            Tool::Eraser => self.erase_at(to, settings.eraser_size / 2.0),
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgba<u8>, width: f32) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;

        // Zero-length segments (a click without movement) render as a dot
        if from == to {
            if let Some(dot) = PathBuilder::from_circle(to.x, to.y, width / 2.0) {
                self.annotation
                    .fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.annotation.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn erase_at(&mut self, center: Point, radius: f32) {
        let Some(circle) = PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.blend_mode = BlendMode::Clear;
        self.annotation
            .fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Composites the annotation layer over the base (source-over).
    ///
    /// Pixels with no annotation coverage are copied from the base exactly.
    pub fn flatten(&self) -> RgbaImage {
        let mut out = self.base.clone();
        for (dst, src) in out.pixels_mut().zip(self.annotation.pixels()) {
            let sa = src.alpha() as u16;
            if sa == 0 {
                continue;
            }
            *dst = over([src.red(), src.green(), src.blue()], sa, *dst);
        }
        out
    }

    /// Restores the previous annotation state; returns whether anything changed
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.annotation.clone()) {
            Some(previous) => {
                self.annotation = previous;
                self.last_point = None;
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone state; returns whether anything changed
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.annotation.clone()) {
            Some(next) => {
                self.annotation = next;
                self.last_point = None;
                true
            }
            None => false,
        }
    }
}

/// Premultiplied source over straight-alpha destination
fn over(src: [u8; 3], sa: u16, dst: Rgba<u8>) -> Rgba<u8> {
    let inv = 255 - sa;
    let da = dst[3] as u16;
    let out_a = sa + mul_div255(da, inv) as u16;
    if out_a == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut px = [0u8; 4];
    for c in 0..3 {
        let dst_premul = mul_div255(dst[c] as u16, da) as u16;
        let premul = (src[c] as u16 + mul_div255(dst_premul, inv) as u16).min(out_a);
        px[c] = ((premul as u32 * 255 + out_a as u32 / 2) / out_a as u32) as u8;
    }
    px[3] = out_a.min(255) as u8;
    Rgba(px)
}
