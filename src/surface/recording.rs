//! Command-recording surface.

use std::collections::HashMap;

use super::{
    DrawCommand, FontId, ImageSize, RawImage, Rect, Surface, TextStyle, fixed_advance_width,
};
use crate::theme::Rgb;

/// A [`Surface`] that records each frame's draw calls as [`DrawCommand`]s.
///
/// Text is measured with fixed per-character advances, which keeps layout
/// deterministic for tests and for `--dump` output.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    images: HashMap<String, ImageSize>,
    loaded: Option<String>,
    frames: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image size that `open_image` will report for `source`.
    pub fn with_image(mut self, source: impl Into<String>, size: ImageSize) -> Self {
        self.images.insert(source.into(), size);
        self
    }

    /// Draw calls of the most recent frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames started so far.
    pub const fn frame_count(&self) -> usize {
        self.frames
    }

    /// Text draws of the most recent frame as `(x, y, text)`.
    pub fn texts(&self) -> Vec<(i32, i32, &str)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Rectangles of the most recent frame filled with `fill`.
    pub fn rects_filled_with(&self, fill: Rgb) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Rect { rect, fill: f, .. } if *f == fill => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn begin_frame(&mut self) {
        self.frames += 1;
        self.commands.clear();
    }

    fn measure_text(&self, text: &str, font: FontId) -> i32 {
        fixed_advance_width(text, font)
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, style: TextStyle, clip_width: i32) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            style,
            clip_width,
        });
    }

    fn draw_rect(&mut self, rect: Rect, edge: Rgb, fill: Rgb) {
        self.commands.push(DrawCommand::Rect { rect, edge, fill });
    }

    fn open_image(&mut self, source: &str) -> Option<ImageSize> {
        let size = self.images.get(source).copied()?;
        self.loaded = Some(source.to_string());
        Some(size)
    }

    fn blit_image(&mut self, dst: Rect, src: Rect, transparent: Option<Rgb>) {
        self.commands.push(DrawCommand::Blit {
            source: self.loaded.clone().unwrap_or_default(),
            dst,
            src,
            transparent,
        });
    }

    fn draw_pixels(&mut self, x: i32, y: i32, image: &RawImage<'_>) {
        self.commands.push(DrawCommand::Pixels {
            x,
            y,
            width: image.width,
            height: image.height,
        });
    }
}
