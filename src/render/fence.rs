//! Code and formula fence handlers.

use crate::document::block::{FenceKind, fence_marker};
use crate::highlight::highlight_line;
use crate::surface::{FontId, Rect, TextStyle};
use crate::theme::ColorRole;

use super::cache::FenceState;
use super::pass::Pass;
use super::scrollbar::SCROLLBAR_WIDTH;

/// Inset of code text from the left edge.
pub const CODE_TEXT_INSET: i32 = 4;
/// Padding inside the formula box.
pub const FORMULA_PADDING: i32 = 4;
/// Gap below a formula box.
pub const FORMULA_SPACING: i32 = 4;

/// The fence a pass is currently inside.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fence {
    #[default]
    None,
    /// Code fence with its syntax tag, if any.
    Code(Option<String>),
    Formula,
}

impl Fence {
    pub fn open(kind: FenceKind) -> Self {
        match kind {
            FenceKind::Code(language) => Self::Code(language),
            FenceKind::Formula => Self::Formula,
        }
    }

    pub const fn state(&self) -> FenceState {
        match self {
            Self::None => FenceState::None,
            Self::Code(_) => FenceState::Code,
            Self::Formula => FenceState::Formula,
        }
    }

    /// Rebuild a fence from its cached state and the line that opened it.
    pub fn restore(state: FenceState, opener: Option<&str>) -> Self {
        match state {
            FenceState::None => Self::None,
            FenceState::Formula => Self::Formula,
            FenceState::Code => {
                let kind = opener
                    .and_then(fence_marker)
                    .map_or(FenceKind::Code(None), FenceKind::from_tag);
                match kind {
                    FenceKind::Code(language) => Self::Code(language),
                    // The opener disagrees with the cache; draw it as plain code.
                    FenceKind::Formula => Self::Code(None),
                }
            }
        }
    }
}

impl Pass<'_, '_> {
    /// Draw one line inside a code fence.
    pub(super) fn code_line(&mut self, line: &str, language: Option<&str>) {
        let lh = self.line_height;
        if self.view.in_view(self.y, lh) {
            let bg = self.color(ColorRole::CodeBackground);
            self.out
                .surface
                .draw_rect(Rect::new(self.view.x, self.y, self.view.width, lh), bg, bg);
            if !line.is_empty() {
                let tokens = language.and_then(|lang| highlight_line(lang, line, self.out.palette.mode()));
                let x = self.view.x + CODE_TEXT_INSET;
                match tokens {
                    Some(tokens) => {
                        let mut cx = x;
                        for token in tokens {
                            let style = TextStyle::new(FontId::Small, token.color).with_background(bg);
                            let clip = self.view.right() - cx;
                            self.out.surface.draw_text(cx, self.y, &token.text, style, clip);
                            cx += self.measure(&token.text, FontId::Small);
                        }
                    }
                    None => {
                        let style = TextStyle::new(FontId::Small, self.color(ColorRole::Code)).with_background(bg);
                        self.out
                            .surface
                            .draw_text(x, self.y, line, style, self.view.width - CODE_TEXT_INSET);
                    }
                }
            }
        }
        self.y += lh;
    }

    /// Lay out the buffered formula expressions inside one bordered box.
    pub(super) fn flush_formula(&mut self) {
        let lines = std::mem::take(&mut self.formula);
        let expressions: Vec<(String, i32)> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|expr| !expr.is_empty())
            .map(|expr| {
                let display = self.out.formula.format_formula(expr);
                let height = match self.out.formula.measure_formula(expr) {
                    Some((_, h)) => h,
                    None => self.line_height,
                };
                (display, height)
            })
            .collect();
        if expressions.is_empty() {
            return;
        }

        let box_w = self.view.width - SCROLLBAR_WIDTH;
        let box_h = expressions.iter().map(|(_, h)| h).sum::<i32>() + 2 * FORMULA_PADDING;
        let frame = Rect::new(self.view.x, self.y, box_w, box_h);
        if let Some(visible) = frame.intersect(&self.view.rect()) {
            let edge = self.color(ColorRole::TableBorder);
            let fill = self.color(ColorRole::CodeBackground);
            self.out.surface.draw_rect(visible, edge, fill);
        }

        let style = TextStyle::new(FontId::Small, self.color(ColorRole::Normal))
            .with_background(self.color(ColorRole::CodeBackground));
        let mut ey = self.y + FORMULA_PADDING;
        for (display, height) in &expressions {
            if self.view.in_view(ey, *height) {
                self.out.surface.draw_text(
                    self.view.x + FORMULA_PADDING,
                    ey,
                    display,
                    style,
                    box_w - 2 * FORMULA_PADDING,
                );
            }
            ey += height;
        }
        self.y += box_h + FORMULA_SPACING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_maps_kind() {
        assert_eq!(Fence::open(FenceKind::Formula), Fence::Formula);
        assert_eq!(
            Fence::open(FenceKind::Code(Some("rust".into()))),
            Fence::Code(Some("rust".into()))
        );
    }

    #[test]
    fn test_restore_code_recovers_language() {
        assert_eq!(
            Fence::restore(FenceState::Code, Some("```python")),
            Fence::Code(Some("python".into()))
        );
        assert_eq!(Fence::restore(FenceState::Code, None), Fence::Code(None));
    }

    #[test]
    fn test_state_round_trips_restore() {
        for fence in [Fence::None, Fence::Formula, Fence::Code(None)] {
            assert_eq!(Fence::restore(fence.state(), Some("```")), fence);
        }
    }
}
