//! Scrollbar with bookmark and search tick marks.

use crate::surface::{Rect, Surface};
use crate::theme::{ColorRole, Palette};

use super::viewport::{Viewport, max_scroll};

/// Scrollbar track width in pixels.
pub const SCROLLBAR_WIDTH: i32 = 4;
/// Smallest thumb height in pixels.
pub const SCROLLBAR_MIN_THUMB: i32 = 10;
/// Height of a tick mark on the track.
pub const MARK_HEIGHT: i32 = 2;

/// Track and thumb rectangles for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollbarGeometry {
    pub track: Rect,
    pub thumb: Rect,
}

/// Scrollbar layout, or `None` when the document fits in the viewport.
pub fn geometry(view: &Viewport, content_height: i32, scroll_offset: i32) -> Option<ScrollbarGeometry> {
    if content_height <= view.height {
        return None;
    }
    let bar_x = view.right() - SCROLLBAR_WIDTH;
    let track = Rect::new(bar_x, view.y, SCROLLBAR_WIDTH, view.height);

    let proportional = i64::from(view.height) * i64::from(view.height) / i64::from(content_height);
    let thumb_h = i32::try_from(proportional)
        .unwrap_or(view.height)
        .max(SCROLLBAR_MIN_THUMB);
    let max = max_scroll(content_height, view.height);
    let thumb_y = if max > 0 {
        let travel = i64::from(view.height - thumb_h) * i64::from(scroll_offset.clamp(0, max)) / i64::from(max);
        view.y + i32::try_from(travel).unwrap_or(0)
    } else {
        view.y
    };

    Some(ScrollbarGeometry {
        track,
        thumb: Rect::new(bar_x, thumb_y, SCROLLBAR_WIDTH, thumb_h),
    })
}

/// Track position of a tick for content-Y `position`.
///
/// Positions past the end of the content are not plotted; the rest are
/// clamped onto the track.
pub fn mark_y(view: &Viewport, content_height: i32, position: i32) -> Option<i32> {
    if content_height <= 0 || position > content_height {
        return None;
    }
    let offset = i64::from(view.height) * i64::from(position) / i64::from(content_height);
    let y = view.y + i32::try_from(offset).unwrap_or(0);
    Some(y.clamp(view.y, view.bottom() - MARK_HEIGHT))
}

/// Draw the scrollbar, then search ticks, then bookmark ticks on top.
pub fn draw(
    surface: &mut dyn Surface,
    palette: &Palette,
    view: &Viewport,
    content_height: i32,
    scroll_offset: i32,
    search_marks: &[i32],
    bookmarks: &[i32],
) {
    let Some(geometry) = geometry(view, content_height, scroll_offset) else {
        return;
    };
    let track_color = palette.get(ColorRole::Scrollbar);
    let thumb_color = palette.get(ColorRole::ScrollbarThumb);
    surface.draw_rect(geometry.track, track_color, track_color);
    surface.draw_rect(geometry.thumb, thumb_color, thumb_color);

    let search_color = palette.get(ColorRole::SearchMark);
    for &position in search_marks {
        if let Some(y) = mark_y(view, content_height, position) {
            let rect = Rect::new(geometry.track.x, y, SCROLLBAR_WIDTH, MARK_HEIGHT);
            surface.draw_rect(rect, search_color, search_color);
        }
    }

    let bookmark_color = palette.get(ColorRole::BookmarkMark);
    for &position in bookmarks {
        if let Some(y) = mark_y(view, content_height, position) {
            // Bookmarks overhang the track by a pixel on each side.
            let rect = Rect::new(geometry.track.x - 1, y, SCROLLBAR_WIDTH + 2, MARK_HEIGHT);
            surface.draw_rect(rect, bookmark_color, bookmark_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_no_scrollbar_when_content_fits() {
        assert_eq!(geometry(&Viewport::default(), 230, 0), None);
        assert_eq!(geometry(&Viewport::default(), 0, 0), None);
    }

    #[test]
    fn test_thumb_is_proportional() {
        let g = geometry(&Viewport::default(), 460, 0).unwrap();
        assert_eq!(g.track, Rect::new(311, 5, 4, 230));
        assert_eq!(g.thumb, Rect::new(311, 5, 4, 115));
    }

    #[test]
    fn test_thumb_has_minimum_height() {
        let g = geometry(&Viewport::default(), 100_000, 0).unwrap();
        assert_eq!(g.thumb.height, SCROLLBAR_MIN_THUMB);
    }

    #[test]
    fn test_thumb_reaches_track_bottom_at_max_scroll() {
        let vp = Viewport::default();
        let g = geometry(&vp, 460, 230).unwrap();
        assert_eq!(g.thumb.bottom(), vp.bottom());
    }

    #[test]
    fn test_mark_y_clamps_to_track() {
        let vp = Viewport::default();
        assert_eq!(mark_y(&vp, 460, 0), Some(5));
        assert_eq!(mark_y(&vp, 460, 230), Some(120));
        assert_eq!(mark_y(&vp, 460, 460), Some(233));
        assert_eq!(mark_y(&vp, 460, -50), Some(5));
        assert_eq!(mark_y(&vp, 460, 461), None);
    }

    #[test]
    fn test_draw_plots_bookmarks_wider_than_track() {
        let mut surface = RecordingSurface::new();
        let palette = Palette::light();
        draw(&mut surface, &palette, &Viewport::default(), 460, 0, &[], &[230]);
        let marks = surface.rects_filled_with(palette.get(ColorRole::BookmarkMark));
        assert_eq!(marks, vec![Rect::new(310, 120, 6, 2)]);
    }
}
