//! Word wrap with inline styling.
//!
//! Words are the pieces of a segment between single spaces. A word moves
//! to the next line when it would cross the right margin, unless it already
//! starts the line: an overlong word is drawn and allowed to overflow.

use crate::document::inline::{Segment, SegmentKind, parse_inline};
use crate::surface::{FontId, Rect, TextStyle};
use crate::theme::{ColorRole, Rgb};

use super::pass::Pass;
use super::LinkZone;

/// Horizontal step of each blockquote nesting level.
pub const BLOCKQUOTE_INDENT: i32 = 10;
/// Width of a blockquote bar.
pub const BLOCKQUOTE_BAR_WIDTH: i32 = 2;

const fn role_for(kind: SegmentKind) -> ColorRole {
    match kind {
        SegmentKind::Normal => ColorRole::Normal,
        SegmentKind::Bold => ColorRole::Bold,
        SegmentKind::Italic => ColorRole::Italic,
        SegmentKind::Code => ColorRole::Code,
        SegmentKind::Strikethrough => ColorRole::Strikethrough,
        SegmentKind::Link => ColorRole::Link,
    }
}

/// A word placed by [`place_words`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedWord<'a> {
    /// Row within the paragraph, starting at 0.
    pub row: usize,
    pub x: i32,
    pub width: i32,
    pub text: &'a str,
    /// Index of the segment the word came from.
    pub segment: usize,
}

/// Place every word of `segments` between `start_x` and `right_margin`.
///
/// Returns the placed words and the number of rows used. A space that would
/// cross the margin also starts a new row.
pub fn place_words<'a>(
    segments: &[Segment<'a>],
    start_x: i32,
    right_margin: i32,
    measure: impl Fn(&str) -> i32,
) -> (Vec<PlacedWord<'a>>, usize) {
    let space = measure(" ");
    let mut placed = Vec::new();
    let mut row = 0;
    let mut x = start_x;
    for (si, segment) in segments.iter().enumerate() {
        for (wi, word) in segment.text.split(' ').enumerate() {
            if wi > 0 {
                if x + space > right_margin && x > start_x {
                    row += 1;
                    x = start_x;
                } else {
                    x += space;
                }
            }
            if word.is_empty() {
                continue;
            }
            let width = measure(word);
            if x + width > right_margin && x > start_x {
                row += 1;
                x = start_x;
            }
            placed.push(PlacedWord {
                row,
                x,
                width,
                text: word,
                segment: si,
            });
            x += width;
        }
    }
    (placed, row + 1)
}

/// Number of rows `text` wraps to between `start_x` and `right_margin`.
pub fn wrapped_line_count(
    text: &str,
    start_x: i32,
    right_margin: i32,
    measure: impl Fn(&str) -> i32,
) -> usize {
    place_words(&parse_inline(text), start_x, right_margin, measure).1
}

impl Pass<'_, '_> {
    /// Lay out inline-styled `text` from `start_x`, wrapping at the margin.
    pub(super) fn wrapped(&mut self, text: &str, start_x: i32) {
        let segments = parse_inline(text);
        let max_x = self.view.text_right_margin();
        let surface = &*self.out.surface;
        let (placed, rows) = place_words(&segments, start_x, max_x, |word| {
            surface.measure_text(word, FontId::Small)
        });

        self.line_decorations();
        let mut row = 0;
        for word in &placed {
            while row < word.row {
                self.next_row();
                row += 1;
            }
            let segment = &segments[word.segment];
            let color = self.color(role_for(segment.kind));
            self.word(word, segment, max_x, color);
        }
        while row + 1 < rows {
            self.next_row();
            row += 1;
        }
        self.y += self.line_height;
    }

    fn next_row(&mut self) {
        self.y += self.line_height;
        self.line_decorations();
    }

    fn word(&mut self, word: &PlacedWord<'_>, segment: &Segment<'_>, max_x: i32, color: Rgb) {
        let lh = self.line_height;
        let (x, w) = (word.x, word.width);
        let matched = self.search.matches(word.text);
        if matched && self.measuring {
            let content_y = self.content_y();
            self.search.record(content_y);
        }
        if !self.view.in_view(self.y, lh) {
            return;
        }

        if matched {
            self.fill(Rect::new(x, self.y, w, lh), ColorRole::SearchHighlight);
        }
        let clip = max_x - x;
        let style = TextStyle::new(FontId::Small, color);
        self.out.surface.draw_text(x, self.y, word.text, style, clip);
        match segment.kind {
            // Faux bold: the same glyphs again, one pixel to the right.
            SegmentKind::Bold => self.out.surface.draw_text(x + 1, self.y, word.text, style, clip),
            SegmentKind::Strikethrough => {
                let mid = self.y + lh / 2;
                self.out.surface.draw_rect(Rect::new(x, mid, w, 1), color, color);
            }
            SegmentKind::Link => {
                if let Some(url) = segment.url {
                    self.links.push(LinkZone {
                        rect: Rect::new(x, self.y, w, lh),
                        url: url.to_string(),
                    });
                }
            }
            SegmentKind::Normal | SegmentKind::Italic | SegmentKind::Code => {}
        }
    }

    /// Blockquote background and bars for the row at the cursor.
    pub(super) fn line_decorations(&mut self) {
        let lh = self.line_height;
        if self.quote_depth == 0 || !self.view.in_view(self.y, lh) {
            return;
        }
        self.fill(
            Rect::new(self.view.x, self.y, self.view.width, lh),
            ColorRole::BlockquoteBackground,
        );
        for depth in 0..self.quote_depth as i32 {
            let bar_x = self.view.x + depth * BLOCKQUOTE_INDENT + 3;
            self.fill(
                Rect::new(bar_x, self.y, BLOCKQUOTE_BAR_WIDTH, lh),
                ColorRole::BlockquoteBar,
            );
        }
    }
}
