//! One walk over the document lines.
//!
//! A [`Pass`] carries the cursor and the block state that spans lines
//! (open fence, buffered table rows, buffered formula lines). Measurement,
//! cached partial renders and stale full walks all drive the same pass.

use crate::document::block::{Block, FenceKind, classify, fence_marker};
use crate::surface::{FontId, Rect, TextStyle};
use crate::theme::{ColorRole, Rgb};

use super::fence::Fence;
use super::search::SearchState;
use super::wrap::BLOCKQUOTE_INDENT;
use super::{LinkZone, Target, Viewport};

/// Extra indent per nested list level.
pub const NESTED_LIST_INDENT: i32 = 12;
/// Bullet glyph for unordered items.
pub const BULLET: &str = "\u{2022}";
/// Task checkbox side length.
pub const CHECKBOX_SIZE: i32 = 8;

pub(super) struct Pass<'p, 't> {
    pub(super) view: Viewport,
    pub(super) line_height: i32,
    scroll: i32,
    /// Only the measurement pass records search matches.
    pub(super) measuring: bool,
    pub(super) out: &'p mut Target<'t>,
    pub(super) search: &'p mut SearchState,
    pub(super) links: &'p mut Vec<LinkZone>,
    /// Cursor in screen coordinates.
    pub(super) y: i32,
    pub(super) fence: Fence,
    pub(super) table: Vec<Vec<&'p str>>,
    pub(super) formula: Vec<&'p str>,
    pub(super) quote_depth: usize,
}

impl<'p, 't> Pass<'p, 't> {
    pub(super) fn new(
        view: Viewport,
        line_height: i32,
        scroll: i32,
        measuring: bool,
        out: &'p mut Target<'t>,
        search: &'p mut SearchState,
        links: &'p mut Vec<LinkZone>,
    ) -> Self {
        Self {
            view,
            line_height,
            scroll,
            measuring,
            out,
            search,
            links,
            y: view.y - scroll,
            fence: Fence::None,
            table: Vec::new(),
            formula: Vec::new(),
            quote_depth: 0,
        }
    }

    /// Move the cursor to content-Y `content_y` inside `fence`.
    pub(super) fn resume_at(&mut self, content_y: i32, fence: Fence) {
        self.y = self.view.y - self.scroll + content_y;
        self.fence = fence;
    }

    /// Cursor position measured from the top of the document.
    pub(super) const fn content_y(&self) -> i32 {
        self.y - self.view.y + self.scroll
    }

    pub(super) const fn past_bottom(&self) -> bool {
        self.y > self.view.bottom()
    }

    pub(super) fn color(&self, role: ColorRole) -> Rgb {
        self.out.palette.get(role)
    }

    pub(super) fn measure(&self, text: &str, font: FontId) -> i32 {
        self.out.surface.measure_text(text, font)
    }

    pub(super) fn fill(&mut self, rect: Rect, role: ColorRole) {
        let color = self.color(role);
        self.out.surface.draw_rect(rect, color, color);
    }

    /// Flush blocks still buffered when the walk stops.
    pub(super) fn finish(&mut self) {
        self.flush_table();
        if !self.formula.is_empty() {
            self.flush_formula();
        }
    }

    /// Lay out one source line.
    pub(super) fn render_line(&mut self, line: &'p str) {
        let line = line.trim_end();

        if let Some(tag) = fence_marker(line) {
            match std::mem::take(&mut self.fence) {
                Fence::None => {
                    self.flush_table();
                    self.fence = Fence::open(FenceKind::from_tag(tag));
                }
                Fence::Formula => self.flush_formula(),
                Fence::Code(_) => {}
            }
            return;
        }

        match std::mem::take(&mut self.fence) {
            Fence::Code(language) => {
                self.code_line(line, language.as_deref());
                self.fence = Fence::Code(language);
                return;
            }
            Fence::Formula => {
                self.formula.push(line);
                self.fence = Fence::Formula;
                return;
            }
            Fence::None => {}
        }

        let block = classify(line);
        if !block.is_table() {
            self.flush_table();
        }
        match block {
            Block::Blank => self.y += self.line_height / 2,
            Block::Heading { level, text } => self.heading(level, text),
            Block::Rule => self.rule(),
            Block::Quote { depth, text } => {
                self.quote_depth = depth;
                self.wrapped(text, self.view.x + depth as i32 * BLOCKQUOTE_INDENT);
                self.quote_depth = 0;
            }
            Block::Task {
                checked,
                level,
                text,
            } => self.task_item(checked, level, text),
            Block::Bullet { level, text } => self.list_item(BULLET, level, text),
            Block::Ordered {
                level,
                marker,
                text,
            } => {
                if !text.is_empty() {
                    self.list_item(marker, level, text);
                }
            }
            Block::TableRow(cells) => self.table.push(cells),
            Block::TableSeparator => {}
            Block::Image { source } => self.image(source),
            Block::Paragraph(text) => self.wrapped(text, self.view.x),
        }
    }

    fn heading(&mut self, level: usize, text: &str) {
        let (font, pre_pad) = match level {
            1 => (FontId::Large, 3),
            2 => (FontId::Medium, 2),
            _ => (FontId::Small, 0),
        };
        self.y += pre_pad;
        let height = self.line_height + font.tier() * 4;
        if self.view.in_view(self.y, height) {
            let style = TextStyle::new(font, self.color(ColorRole::Header));
            self.out
                .surface
                .draw_text(self.view.x, self.y, text, style, self.view.width);
        }
        self.y += height + 3;
    }

    fn rule(&mut self) {
        self.y += 4;
        if self.view.in_view(self.y, 1) {
            self.fill(Rect::new(self.view.x, self.y, self.view.width, 1), ColorRole::Normal);
        }
        self.y += 6;
    }

    fn task_item(&mut self, checked: bool, level: usize, text: &str) {
        let box_x = self.view.x + 10 + level as i32 * NESTED_LIST_INDENT;
        let box_y = self.y + 2;
        if self.view.in_view(self.y, self.line_height) {
            let edge = self.color(ColorRole::Normal);
            let fill = self.color(ColorRole::Background);
            self.out
                .surface
                .draw_rect(Rect::new(box_x, box_y, CHECKBOX_SIZE, CHECKBOX_SIZE), edge, fill);
            if checked {
                let inner = Rect::new(box_x + 2, box_y + 2, CHECKBOX_SIZE - 4, CHECKBOX_SIZE - 4);
                self.fill(inner, ColorRole::TaskDone);
            }
        }
        self.wrapped(text, box_x + CHECKBOX_SIZE + 5);
    }

    fn list_item(&mut self, bullet: &str, level: usize, text: &str) {
        let indent = level as i32 * NESTED_LIST_INDENT;
        let bullet_x = self.view.x + 10 + indent;
        if self.view.in_view(self.y, self.line_height) {
            let style = TextStyle::new(FontId::Small, self.color(ColorRole::Normal));
            self.out
                .surface
                .draw_text(bullet_x, self.y, bullet, style, self.view.right() - bullet_x);
        }
        self.wrapped(text, self.view.x + 25 + indent);
    }
}
