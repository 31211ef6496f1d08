//! Drawing collaborator boundary.
//!
//! The engine never touches pixels directly. Every draw goes through the
//! [`Surface`] trait with typed parameters:
//! - [`RecordingSurface`]: structured command log with fixed glyph metrics
//! - [`RasterSurface`]: an RGB framebuffer backed by the `image` crate

mod raster;
mod recording;

pub use raster::RasterSurface;
pub use recording::RecordingSurface;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::theme::Rgb;

/// Display width of the target device in logical pixels.
pub const DISPLAY_WIDTH: u32 = 320;
/// Display height of the target device in logical pixels.
pub const DISPLAY_HEIGHT: u32 = 240;

/// Font size tiers available on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontId {
    Small,
    Medium,
    Large,
}

impl FontId {
    /// Device font tier number (1 = size 10, 2 = size 12, 3 = size 14).
    pub const fn tier(self) -> i32 {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
        }
    }

    /// Horizontal advance per display column used by the bundled surfaces.
    pub const fn advance(self) -> i32 {
        match self {
            Self::Small => 6,
            Self::Medium => 7,
            Self::Large => 8,
        }
    }

    /// Glyph cell height used by the bundled surfaces.
    pub const fn glyph_height(self) -> i32 {
        match self {
            Self::Small => 10,
            Self::Medium => 12,
            Self::Large => 14,
        }
    }
}

/// Text width under the fixed-advance metrics shared by the bundled surfaces.
pub fn fixed_advance_width(text: &str, font: FontId) -> i32 {
    UnicodeWidthStr::width(text) as i32 * font.advance()
}

/// An axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a top-left and an exclusive bottom-right corner.
    pub const fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Overlapping region of two rectangles, if any.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        let rect = Self::from_corners(x1, y1, x2, y2);
        (!rect.is_empty()).then_some(rect)
    }
}

/// Font, color and optional background for a text draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub font: FontId,
    pub color: Rgb,
    pub background: Option<Rgb>,
}

impl TextStyle {
    pub const fn new(font: FontId, color: Rgb) -> Self {
        Self {
            font,
            color,
            background: None,
        }
    }

    pub const fn with_background(mut self, background: Rgb) -> Self {
        self.background = Some(background);
        self
    }
}

/// Pixel size of an image known to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: i32,
    pub height: i32,
}

/// Raw RGB pixel data supplied by the document itself.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pub width: i32,
    pub height: i32,
    /// Row-major RGB triplets; white pixels are transparent.
    pub pixels: &'a [u8],
}

/// One structured draw call, as captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Text {
        x: i32,
        y: i32,
        text: String,
        style: TextStyle,
        clip_width: i32,
    },
    Rect {
        rect: Rect,
        edge: Rgb,
        fill: Rgb,
    },
    Blit {
        source: String,
        dst: Rect,
        src: Rect,
        transparent: Option<Rgb>,
    },
    Pixels {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Drawing, measuring and image primitives consumed by the renderer.
pub trait Surface {
    /// Called once at the start of every rendered frame.
    fn begin_frame(&mut self) {}

    /// Pixel width of `text` in `font`.
    fn measure_text(&self, text: &str, font: FontId) -> i32;

    /// Draw `text` with its top-left corner at `(x, y)`, clipped to `clip_width`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, style: TextStyle, clip_width: i32);

    /// Fill `rect` with `fill` and outline it with `edge`.
    fn draw_rect(&mut self, rect: Rect, edge: Rgb, fill: Rgb);

    /// Load an external image into the scratch buffer and report its size.
    fn open_image(&mut self, source: &str) -> Option<ImageSize>;

    /// Copy `src` from the scratch buffer into `dst`, scaling as needed.
    fn blit_image(&mut self, dst: Rect, src: Rect, transparent: Option<Rgb>);

    /// Plot raw RGB pixels with the top-left corner at `(x, y)`.
    fn draw_pixels(&mut self, x: i32, y: i32, image: &RawImage<'_>);
}
