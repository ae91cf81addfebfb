use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::{debug, info};

/// Normalized screen region, expressed as fractional edges (0.0-1.0) of the
/// screenshot it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ScreenRegion {
    /// Resolve the fractional edges against an image of the given size.
    /// Each edge is truncated toward zero.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let (wf, hf) = (width as f64, height as f64);
        PixelRect::new(
            (self.left * wf) as i32,
            (self.top * hf) as i32,
            (self.right * wf) as i32,
            (self.bottom * hf) as i32,
        )
    }
}

/// Well-known regions of the cockpit HUD
pub mod regions {
    use super::ScreenRegion;

    /// Window where the "SCAN RESULTS" label renders in the cockpit view.
    pub fn scan_results() -> ScreenRegion {
        ScreenRegion {
            left: 0.66,
            top: 0.385,
            right: 0.795,
            bottom: 0.45,
        }
    }
}

/// Axis-aligned pixel rectangle. `min` is inclusive, `max` exclusive.
///
/// Coordinates are always relative to some origin image; a rectangle read out
/// of a crop has to be [`translate`](Self::translate)d by the crop's origin
/// before it means anything in the parent image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl PixelRect {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Shift by `(dx, dy)`, e.g. to move a crop-relative box into the
    /// coordinate space of the parent image.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Smallest rectangle containing both. An empty side is ignored.
    pub fn union(&self, other: &PixelRect) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Overlap of both rectangles, or an empty rectangle at the origin.
    pub fn intersect(&self, other: &PixelRect) -> Self {
        let r = Self::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        );
        if r.is_empty() {
            Self::default()
        } else {
            r
        }
    }
}

/// Bounds of a frame as a rectangle anchored at the origin
pub fn frame_bounds(frame: &RgbaImage) -> PixelRect {
    PixelRect::new(0, 0, frame.width() as i32, frame.height() as i32)
}

/// Load a screenshot from disk. Only PNG is accepted.
pub fn load_screenshot(path: &Path) -> Result<RgbaImage> {
    info!(filename = %path.display(), "opening screenshot");

    let file = File::open(path)
        .with_context(|| format!("failed to open screenshot {}", path.display()))?;
    let decoded = image::load(BufReader::new(file), ImageFormat::Png)
        .with_context(|| format!("failed to decode {} as PNG", path.display()))?;

    let frame = decoded.to_rgba8();
    debug!(
        width = frame.width(),
        height = frame.height(),
        "screenshot decoded"
    );
    Ok(frame)
}

/// Crop a region from a frame using normalized coordinates
pub fn crop_region(frame: &RgbaImage, region: &ScreenRegion) -> RgbaImage {
    crop_rect(frame, &region.to_pixels(frame.width(), frame.height()))
}

/// Crop a pixel rectangle from a frame. The rectangle is clipped to the frame
/// bounds first, so the result may be smaller than requested or empty.
pub fn crop_rect(frame: &RgbaImage, rect: &PixelRect) -> RgbaImage {
    let clipped = rect.intersect(&frame_bounds(frame));
    image::imageops::crop_imm(
        frame,
        clipped.min_x as u32,
        clipped.min_y as u32,
        clipped.width() as u32,
        clipped.height() as u32,
    )
    .to_image()
}

/// Re-encode a (cropped) frame as PNG bytes for handing to an OCR engine.
pub fn encode_png(frame: &RgbaImage) -> image::ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    frame.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
