//! Visible window geometry and scroll arithmetic.
//!
//! Scroll offsets are content pixels from the top of the document. The
//! helpers here are pure so the bounds can be property tested apart from
//! any rendering.

use crate::surface::Rect;

use super::scrollbar::SCROLLBAR_WIDTH;

/// The on-screen window a document is laid out into.
///
/// # Example
///
/// ```
/// use pocketmd::render::Viewport;
///
/// let vp = Viewport::default();
/// assert_eq!((vp.x, vp.y, vp.width, vp.height), (5, 5, 310, 230));
/// assert!(vp.in_view(5, 12));
/// assert!(!vp.in_view(230, 12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether a row at screen `y` with height `h` lies fully inside.
    ///
    /// Partially visible rows are not drawn.
    pub const fn in_view(&self, y: i32, h: i32) -> bool {
        y >= self.y && y + h <= self.bottom()
    }

    /// Rightmost x a wrapped word may reach without overlapping the scrollbar.
    pub const fn text_right_margin(&self) -> i32 {
        self.right() - SCROLLBAR_WIDTH - 1
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(5, 5, 310, 230)
    }
}

/// Largest valid scroll offset for a document of `content_height`.
pub const fn max_scroll(content_height: i32, viewport_height: i32) -> i32 {
    let max = content_height - viewport_height;
    if max > 0 { max } else { 0 }
}

/// Clamp `offset` into `0..=max`.
pub fn clamp_offset(offset: i32, max: i32) -> i32 {
    offset.clamp(0, max.max(0))
}

/// Offset at `ratio` (0.0 top, 1.0 bottom) of `max`.
///
/// Ratios outside `0.0..=1.0` are clamped and NaN maps to the top.
pub fn ratio_offset(ratio: f64, max: i32) -> i32 {
    if ratio.is_nan() || max <= 0 {
        return 0;
    }
    let ratio = ratio.clamp(0.0, 1.0);
    // Bounded by max, which is an i32
    #[allow(clippy::cast_possible_truncation)]
    let target = (f64::from(max) * ratio).round() as i32;
    target.clamp(0, max)
}

/// Scroll progress in percent, 100 when there is nothing to scroll.
pub fn progress_percent(offset: i32, max: i32) -> u8 {
    if max <= 0 {
        return 100;
    }
    let percent = (i64::from(offset.max(0)) * 100 / i64::from(max)).min(100);
    u8::try_from(percent).unwrap_or(100)
}
