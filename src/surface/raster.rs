//! Framebuffer surface for headless previews.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};

use super::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FontId, ImageSize, RawImage, Rect, Surface, TextStyle,
    fixed_advance_width,
};
use crate::theme::Rgb;

/// A [`Surface`] that paints into an in-memory RGB framebuffer.
///
/// There is no font rasterizer: each visible glyph is drawn as a solid block
/// in its cell, which is enough to judge layout in a PNG preview. External
/// images are loaded relative to `base_dir`.
#[derive(Debug)]
pub struct RasterSurface {
    frame: RgbImage,
    base_dir: PathBuf,
    scratch: Option<DynamicImage>,
}

impl RasterSurface {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_size(DISPLAY_WIDTH, DISPLAY_HEIGHT, base_dir)
    }

    pub fn with_size(width: u32, height: u32, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            frame: RgbImage::new(width, height),
            base_dir: base_dir.into(),
            scratch: None,
        }
    }

    pub const fn frame(&self) -> &RgbImage {
        &self.frame
    }

    /// Color at `(x, y)`, or `None` outside the framebuffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.frame
            .get_pixel_checked(x, y)
            .map(|p| Rgb { r: p[0], g: p[1], b: p[2] })
    }

    /// Write the framebuffer as an image file; the format follows the extension.
    ///
    /// # Errors
    /// Returns an error if the image cannot be encoded or written.
    pub fn save(&self, path: &Path) -> image::ImageResult<()> {
        self.frame.save(path)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.frame.width() as i32, self.frame.height() as i32)
    }

    fn fill(&mut self, rect: Rect, color: Rgb) {
        let Some(clipped) = rect.intersect(&self.bounds()) else {
            return;
        };
        let pixel = image::Rgb([color.r, color.g, color.b]);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.frame.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(p) = self.frame.get_pixel_mut_checked(x as u32, y as u32) {
            *p = image::Rgb([color.r, color.g, color.b]);
        }
    }
}

impl Surface for RasterSurface {
    fn measure_text(&self, text: &str, font: FontId) -> i32 {
        fixed_advance_width(text, font)
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, style: TextStyle, clip_width: i32) {
        let width = self.measure_text(text, style.font).min(clip_width.max(0));
        let height = style.font.glyph_height();
        if let Some(bg) = style.background {
            self.fill(Rect::new(x, y, width, height), bg);
        }
        let advance = style.font.advance();
        let limit = x + width;
        let mut cx = x;
        for ch in text.chars() {
            let cell = fixed_advance_width(ch.encode_utf8(&mut [0; 4]), style.font);
            if cx + cell > limit {
                break;
            }
            if !ch.is_whitespace() {
                self.fill(Rect::new(cx + 1, y + 2, advance - 2, height - 4), style.color);
            }
            cx += cell;
        }
    }

    fn draw_rect(&mut self, rect: Rect, edge: Rgb, fill: Rgb) {
        self.fill(rect, edge);
        self.fill(
            Rect::new(rect.x + 1, rect.y + 1, rect.width - 2, rect.height - 2),
            fill,
        );
    }

    fn open_image(&mut self, source: &str) -> Option<ImageSize> {
        let path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            self.base_dir.join(source)
        };
        match image::open(&path) {
            Ok(img) => {
                let size = ImageSize {
                    width: img.width() as i32,
                    height: img.height() as i32,
                };
                self.scratch = Some(img);
                Some(size)
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "image open failed");
                self.scratch = None;
                None
            }
        }
    }

    fn blit_image(&mut self, dst: Rect, src: Rect, transparent: Option<Rgb>) {
        let Some(scratch) = self.scratch.take() else {
            return;
        };
        if dst.is_empty() || src.is_empty() {
            self.scratch = Some(scratch);
            return;
        }
        let rgb = scratch.to_rgb8();
        for dy in 0..dst.height {
            for dx in 0..dst.width {
                let sx = src.x + dx * src.width / dst.width;
                let sy = src.y + dy * src.height / dst.height;
                let Some(p) = rgb.get_pixel_checked(sx as u32, sy as u32) else {
                    continue;
                };
                let color = Rgb {
                    r: p[0],
                    g: p[1],
                    b: p[2],
                };
                if Some(color) == transparent {
                    continue;
                }
                self.plot(dst.x + dx, dst.y + dy, color);
            }
        }
        self.scratch = Some(scratch);
    }

    fn draw_pixels(&mut self, x: i32, y: i32, image: &RawImage<'_>) {
        let white = Rgb::hex(0xFF_FFFF);
        for (i, px) in image.pixels.chunks_exact(3).enumerate() {
            let i = i as i32;
            if i >= image.width * image.height {
                break;
            }
            let color = Rgb {
                r: px[0],
                g: px[1],
                b: px[2],
            };
            if color != white {
                self.plot(x + i % image.width, y + i / image.width, color);
            }
        }
    }
}
