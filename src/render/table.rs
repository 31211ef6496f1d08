//! Pipe table layout.
//!
//! Rows are buffered by the pass until a non-table line arrives, then laid
//! out at once so every row shares the same column widths.

use crate::surface::{FontId, Rect, TextStyle};
use crate::theme::ColorRole;

use super::pass::Pass;

/// Tables with more columns are replaced by a warning.
pub const MAX_COLUMNS: usize = 5;
/// Horizontal padding on each side of a cell's text.
pub const CELL_PADDING: i32 = 3;
/// Narrowest shared column width still considered legible.
pub const MIN_COLUMN_WIDTH: i32 = 10;
/// Gap below a rendered table.
pub const TABLE_SPACING: i32 = 4;

/// Column geometry for a buffered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    /// Text width of each column, and the outer width including borders.
    Grid { col_widths: Vec<i32>, total_width: i32 },
    /// Too many columns, or columns too narrow after shrinking.
    TooWide { columns: usize },
}

/// Lay out `rows` into at most `available` pixels.
///
/// Columns keep their natural widths when they fit. Otherwise every column
/// shrinks to one shared width, and a table whose shared width would drop
/// below [`MIN_COLUMN_WIDTH`] is reported as too wide.
pub fn layout(rows: &[Vec<&str>], available: i32, measure: impl Fn(&str) -> i32) -> TableLayout {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns > MAX_COLUMNS {
        return TableLayout::TooWide { columns };
    }
    if columns == 0 {
        return TableLayout::Grid {
            col_widths: Vec::new(),
            total_width: 1,
        };
    }

    let mut col_widths = vec![0; columns];
    for row in rows {
        for (width, cell) in col_widths.iter_mut().zip(row) {
            *width = (*width).max(measure(cell));
        }
    }

    // One shared border between neighbours plus the two outer borders.
    let cols = columns as i32;
    let borders = cols + 1;
    let total_width = col_widths.iter().map(|w| w + 2 * CELL_PADDING).sum::<i32>() + borders;
    if total_width <= available {
        return TableLayout::Grid {
            col_widths,
            total_width,
        };
    }

    let shared = (available - borders) / cols - 2 * CELL_PADDING;
    if shared < MIN_COLUMN_WIDTH {
        return TableLayout::TooWide { columns };
    }
    TableLayout::Grid {
        col_widths: vec![shared; columns],
        total_width: cols * (shared + 2 * CELL_PADDING) + borders,
    }
}

/// One-line replacement text for a table that cannot be drawn.
pub fn too_wide_message(columns: usize) -> String {
    format!("[Table too wide ({columns} cols)]")
}

impl Pass<'_, '_> {
    /// Render and clear the buffered table rows.
    pub(super) fn flush_table(&mut self) {
        if self.table.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.table);
        let surface = &*self.out.surface;
        let layout = layout(&rows, self.view.width, |text| surface.measure_text(text, FontId::Small));

        match layout {
            TableLayout::TooWide { columns } => {
                tracing::debug!(columns, rows = rows.len(), "table too wide, drawing warning");
                self.table_warning(columns);
            }
            TableLayout::Grid { col_widths, .. } => self.table_grid(&rows, &col_widths),
        }
    }

    fn table_grid(&mut self, rows: &[Vec<&str>], col_widths: &[i32]) {
        let row_h = self.line_height + 2;
        let border = self.color(ColorRole::TableBorder);
        let header_bg = self.color(ColorRole::TableHeaderBackground);
        let alt_bg = self.color(ColorRole::TableAltBackground);
        let bg = self.color(ColorRole::Background);
        let bold = self.color(ColorRole::Bold);
        let normal = self.color(ColorRole::Normal);

        for (ri, row) in rows.iter().enumerate() {
            let header = ri == 0;
            let row_bg = if header {
                header_bg
            } else if ri % 2 == 0 {
                alt_bg
            } else {
                bg
            };

            if self.view.in_view(self.y, row_h) {
                let mut cx = self.view.x;
                for (ci, &col_w) in col_widths.iter().enumerate() {
                    let cell_w = col_w + 2 * CELL_PADDING;
                    let text = row.get(ci).copied().unwrap_or("");
                    self.out
                        .surface
                        .draw_rect(Rect::new(cx, self.y, cell_w + 2, row_h + 1), border, row_bg);

                    let tx = cx + 1 + CELL_PADDING;
                    let color = if header { bold } else { normal };
                    let style = TextStyle::new(FontId::Small, color);
                    self.out.surface.draw_text(tx, self.y + 1, text, style, col_w);
                    if header {
                        self.out.surface.draw_text(tx + 1, self.y + 1, text, style, col_w);
                    }
                    cx += cell_w + 1;
                }
            }
            self.y += row_h;
        }
        self.y += TABLE_SPACING;
    }

    fn table_warning(&mut self, columns: usize) {
        if self.view.in_view(self.y, self.line_height) {
            let style = TextStyle::new(FontId::Small, self.color(ColorRole::Warning));
            self.out
                .surface
                .draw_text(self.view.x, self.y, &too_wide_message(columns), style, self.view.width);
        }
        self.y += self.line_height;
    }
}
