//! Image buffer wrapper for screenshot data
//!
//! This module provides an `ImageBuffer` wrapper around `image::RgbaImage`
//! with the operations the capture pipeline and the editor need: clamped
//! cropping, solid fills and saving to disk.
//!
//! # Examples
//!
//! ```
//! use snipdesk::{capture::ImageBuffer, model::Rect};
//!
//! let img = ImageBuffer::from_test_pattern(800, 600);
//!
//! // Partially off-canvas rectangles are clamped, not rejected
//! let cropped = img.crop_clamped(Rect::new(-50, 0, 200, 200)).unwrap();
//! assert_eq!(cropped.dimensions(), (150, 200));
//! ```

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::{
    error::{CaptureError, CaptureResult},
    model::Rect,
};

/// Wrapper around `image::RgbaImage` with transformation methods
///
/// Pixels are stored as straight (non-premultiplied) RGBA8. All
/// transformation methods return new `ImageBuffer` instances, leaving the
/// original unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    inner: RgbaImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from RGBA pixels
    pub fn new(image: RgbaImage) -> Self {
        Self { inner: image }
    }

    /// Creates an image filled with one colour
    ///
    /// ```
    /// use image::Rgba;
    /// use snipdesk::capture::ImageBuffer;
    ///
    /// let img = ImageBuffer::solid(4, 4, Rgba([0, 0, 255, 255]));
    /// assert_eq!(img.pixel(3, 3), Some(Rgba([0, 0, 255, 255])));
    /// ```
    pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, color))
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// The pattern is a vertical gradient from blue (top) to cyan (bottom),
    /// useful when no real display is available.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let start_color = Rgba([0u8, 0u8, 255u8, 255u8]);
        let end_color = Rgba([0u8, 255u8, 255u8, 255u8]);

        let img = RgbaImage::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([
                (start_color[0] as f32 * (1.0 - ratio) + end_color[0] as f32 * ratio) as u8,
                (start_color[1] as f32 * (1.0 - ratio) + end_color[1] as f32 * ratio) as u8,
                (start_color[2] as f32 * (1.0 - ratio) + end_color[2] as f32 * ratio) as u8,
                255,
            ])
        });

        Self::new(img)
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// True when the image has zero area
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Bounds of the image as a rectangle at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.inner.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Crops to the part of `rect` that lies inside the image
    ///
    /// Returns `None` when `rect` is empty or does not intersect the image.
    pub fn crop_clamped(&self, rect: Rect) -> Option<Self> {
        let bounded = rect.intersect(&self.bounds())?;
        let cropped = image::imageops::crop_imm(
            &self.inner,
            bounded.x as u32,
            bounded.y as u32,
            bounded.width as u32,
            bounded.height as u32,
        )
        .to_image();
        Some(Self::new(cropped))
    }

    /// Saves the image, choosing the encoder from the file extension
    ///
    /// Supports `png`, `jpg` and `jpeg`. JPEG output drops the alpha channel.
    pub fn save(&self, path: &Path) -> CaptureResult<()> {
        let format = ImageFormat::from_path(path)
            .map_err(|e| CaptureError::Image(format!("{}: {}", path.display(), e)))?;

        match format {
            ImageFormat::Png => self
                .inner
                .save_with_format(path, ImageFormat::Png)
                .map_err(|e| CaptureError::Image(e.to_string())),
            ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(self.inner.clone())
                .to_rgb8()
                .save_with_format(path, ImageFormat::Jpeg)
                .map_err(|e| CaptureError::Image(e.to_string())),
            other => Err(CaptureError::Image(format!(
                "Unsupported image format {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    /// Returns a reference to the inner RgbaImage
    pub fn inner(&self) -> &RgbaImage {
        &self.inner
    }

    /// Consumes self and returns the inner RgbaImage
    pub fn into_inner(self) -> RgbaImage {
        self.inner
    }
}

impl From<RgbaImage> for ImageBuffer {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

/// `round(v * a / 255)` for 8-bit channels
pub(crate) fn mul_div255(v: u16, a: u16) -> u8 {
    let prod = v * a + 128;
    ((prod + (prod >> 8)) >> 8) as u8
}
