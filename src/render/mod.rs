//! Layout cache and incremental renderer.
//!
//! The first render after an invalidation measures the whole document and
//! records where every source line starts. Later renders binary-search that
//! record and lay out only the lines near the scroll offset.
//!
//! - [`cache`]: the [`LayoutState`] machine and per-line offsets
//! - [`wrap`], [`table`], [`fence`], [`image`]: block layout
//! - [`scrollbar`], [`search`], [`viewport`]: overlay and scroll state

pub mod cache;
pub mod fence;
pub mod image;
mod pass;
pub mod scrollbar;
pub mod search;
pub mod table;
pub mod viewport;
pub mod wrap;

use std::time::Instant;

pub use cache::{FenceState, LayoutState, LineCache};
pub use pass::{BULLET, CHECKBOX_SIZE, NESTED_LIST_INDENT};
pub use search::SearchState;
pub use viewport::Viewport;

use crate::formula::FormulaFormatter;
use crate::perf;
use crate::surface::{Rect, Surface};
use crate::theme::{ColorRole, Palette};

use fence::Fence;
use pass::Pass;

/// Fixed row height for body text.
pub const LINE_HEIGHT: i32 = 12;
/// Content above the scroll offset re-laid out on cached renders, so rows
/// straddling the top edge start from the right place.
pub const LOOKBACK_MARGIN: i32 = 50;
/// Step for [`Renderer::scroll_up`] and [`Renderer::scroll_down`].
pub const SCROLL_STEP: i32 = 20;

/// Collaborators a render draws with. Rebuilt by the caller for every frame.
pub struct Target<'a> {
    pub surface: &'a mut dyn Surface,
    pub palette: &'a Palette,
    pub formula: &'a dyn FormulaFormatter,
    /// Bookmark positions in content-Y, drawn as scrollbar ticks.
    pub bookmarks: &'a [i32],
}

/// A link's hit rectangle from the most recent render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkZone {
    pub rect: Rect,
    pub url: String,
}

/// Per-document, per-viewport layout engine.
#[derive(Debug, Clone)]
pub struct Renderer {
    viewport: Viewport,
    line_height: i32,
    scroll_offset: i32,
    layout: LayoutState,
    search: SearchState,
    link_zones: Vec<LinkZone>,
}

impl Renderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            line_height: LINE_HEIGHT,
            scroll_offset: 0,
            layout: LayoutState::Unmeasured,
            search: SearchState::default(),
            link_zones: Vec::new(),
        }
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub const fn line_height(&self) -> i32 {
        self.line_height
    }

    pub const fn layout(&self) -> &LayoutState {
        &self.layout
    }

    /// Total laid-out height, 0 until the first measurement.
    pub const fn content_height(&self) -> i32 {
        self.layout.content_height()
    }

    pub const fn max_scroll(&self) -> i32 {
        viewport::max_scroll(self.content_height(), self.viewport.height)
    }

    pub const fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// Set the scroll offset, clamped to the document once it is measured.
    ///
    /// Before measurement only the lower bound applies; the next render
    /// clamps the rest.
    pub fn set_scroll_offset(&mut self, offset: i32) {
        self.scroll_offset = if self.layout.is_measured() {
            viewport::clamp_offset(offset, self.max_scroll())
        } else {
            offset.max(0)
        };
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.set_scroll_offset(self.scroll_offset.saturating_add(delta));
    }

    pub fn scroll_up(&mut self) {
        self.scroll_by(-SCROLL_STEP);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_by(SCROLL_STEP);
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_by(-self.viewport.height);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_by(self.viewport.height);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    /// Jump to `ratio` of the scrollable range; 1.0 lands exactly on the end.
    pub fn scroll_to_ratio(&mut self, ratio: f64) {
        self.scroll_offset = viewport::ratio_offset(ratio, self.max_scroll());
    }

    /// Scroll progress, 0 to 100.
    pub fn progress_percent(&self) -> u8 {
        viewport::progress_percent(self.scroll_offset, self.max_scroll())
    }

    /// Cached content-Y of source line `line`.
    ///
    /// Lines past the end map to the content height. `None` until a
    /// measurement has built the cache.
    pub fn line_offset(&self, line: usize) -> Option<i32> {
        let lines = self.layout.lines()?;
        Some(lines.y_of(line).unwrap_or_else(|| self.content_height()))
    }

    /// URL of the link drawn under screen point `(x, y)` in the last frame.
    pub fn link_at(&self, x: i32, y: i32) -> Option<&str> {
        self.link_zones
            .iter()
            .find(|zone| zone.rect.contains(x, y))
            .map(|zone| zone.url.as_str())
    }

    pub fn link_zones(&self) -> &[LinkZone] {
        &self.link_zones
    }

    pub const fn search(&self) -> &SearchState {
        &self.search
    }

    /// Replace the search term. Match positions are rebuilt by the next
    /// render, which remeasures.
    pub fn set_search(&mut self, term: &str, case_sensitive: bool) {
        self.search = SearchState::new(term, case_sensitive);
        self.invalidate("search term changed");
    }

    /// Drop the search term and its matches. Layout is unaffected.
    pub fn clear_search(&mut self) {
        self.search = SearchState::default();
    }

    /// Advance to the next match, wrapping, and scroll it into view.
    pub fn next_match(&mut self) -> Option<i32> {
        let position = self.search.advance()?;
        self.set_scroll_offset(position);
        Some(position)
    }

    /// Force the next render to remeasure.
    pub fn invalidate(&mut self, reason: &'static str) {
        if self.layout.is_measured() {
            tracing::debug!(reason, "layout invalidated");
            perf::log_event("render.invalidate", reason);
        }
        self.layout = LayoutState::Unmeasured;
    }

    /// Render one frame of `content`.
    pub fn render(&mut self, content: &str, mut target: Target<'_>) {
        let _scope = perf::scope("render.frame");
        let lines: Vec<&str> = content.split('\n').collect();
        self.layout.check_line_count(lines.len());

        let was_cached = self.layout.is_cached();
        self.draw_frame(&lines, &mut target);
        if was_cached {
            return;
        }
        // A full walk may have shortened the document under the offset.
        let max = self.max_scroll();
        if self.scroll_offset > max {
            tracing::debug!(
                requested = self.scroll_offset,
                max,
                "scroll past end after full walk, clamping"
            );
            self.scroll_offset = max;
            self.draw_frame(&lines, &mut target);
        }
    }

    fn draw_frame(&mut self, lines: &[&str], target: &mut Target<'_>) {
        target.surface.begin_frame();
        let bg = target.palette.get(ColorRole::Background);
        target.surface.draw_rect(self.viewport.rect(), bg, bg);
        self.link_zones.clear();

        match self.layout {
            LayoutState::Unmeasured => self.measure(lines, target),
            LayoutState::Cached { .. } => self.render_cached(lines, target),
            LayoutState::Stale { .. } => self.render_stale(lines, target),
        }

        scrollbar::draw(
            &mut *target.surface,
            target.palette,
            &self.viewport,
            self.content_height(),
            self.scroll_offset,
            self.search.positions(),
            target.bookmarks,
        );
    }

    /// Walk every line from the top, recording the offset table.
    fn measure(&mut self, lines: &[&str], target: &mut Target<'_>) {
        let _scope = perf::scope("render.measure");
        let started = Instant::now();
        self.search.reset_positions();

        let mut cache = LineCache::with_capacity(lines.len());
        let mut pass = Pass::new(
            self.viewport,
            self.line_height,
            self.scroll_offset,
            true,
            target,
            &mut self.search,
            &mut self.link_zones,
        );
        for &line in lines {
            cache.push(pass.content_y(), pass.fence.state());
            pass.render_line(line);
        }
        cache.set_end_fence(pass.fence.state());
        pass.finish();
        let content_height = pass.content_y();

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            lines = lines.len(),
            content_height,
            matches = self.search.positions().len(),
            elapsed_ms,
            "measured layout"
        );
        perf::log_event(
            "render.measure",
            format!(
                "lines={} content_height={content_height} elapsed_ms={elapsed_ms:.3}",
                lines.len()
            ),
        );
        self.layout = LayoutState::Cached {
            content_height,
            lines: cache,
        };
    }

    /// Resume from the cached offset table near the scroll position.
    fn render_cached(&mut self, lines: &[&str], target: &mut Target<'_>) {
        let LayoutState::Cached {
            content_height,
            lines: cache,
        } = &self.layout
        else {
            return;
        };
        let target_y = (self.scroll_offset - LOOKBACK_MARGIN).max(0);
        let start = cache.resume_point(lines, target_y);
        let start_y = cache.y_of(start).unwrap_or(*content_height);
        let opener = cache.fence_opener(start).and_then(|i| lines.get(i).copied());
        let fence = Fence::restore(cache.fence_at(start), opener);

        let mut pass = Pass::new(
            self.viewport,
            self.line_height,
            self.scroll_offset,
            false,
            target,
            &mut self.search,
            &mut self.link_zones,
        );
        pass.resume_at(start_y, fence);
        let mut visited = 0usize;
        for &line in &lines[start..] {
            if pass.past_bottom() {
                break;
            }
            pass.render_line(line);
            visited += 1;
        }
        pass.finish();

        tracing::trace!(start, visited, scroll = self.scroll_offset, "cached render");
        perf::log_event("render.cached", format!("start={start} visited={visited}"));
    }

    /// Full walk for a cache that no longer matches the text.
    fn render_stale(&mut self, lines: &[&str], target: &mut Target<'_>) {
        let _scope = perf::scope("render.stale");
        let mut pass = Pass::new(
            self.viewport,
            self.line_height,
            self.scroll_offset,
            false,
            target,
            &mut self.search,
            &mut self.link_zones,
        );
        for &line in lines {
            pass.render_line(line);
        }
        pass.finish();
        let content_height = pass.content_y();
        tracing::debug!(lines = lines.len(), content_height, "stale full walk");
        self.layout = LayoutState::Stale { content_height };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::PlainFormula;
    use crate::surface::{DrawCommand, FontId, RecordingSurface};

    struct Harness {
        surface: RecordingSurface,
        palette: Palette,
        renderer: Renderer,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                surface: RecordingSurface::new(),
                palette: Palette::light(),
                renderer: Renderer::new(Viewport::default()),
            }
        }

        fn render(&mut self, content: &str) {
            self.renderer.render(
                content,
                Target {
                    surface: &mut self.surface,
                    palette: &self.palette,
                    formula: &PlainFormula,
                    bookmarks: &[],
                },
            );
        }

        fn text_at(&self, text: &str) -> Option<(i32, i32)> {
            self.surface
                .texts()
                .into_iter()
                .find(|(_, _, t)| *t == text)
                .map(|(x, y, _)| (x, y))
        }
    }

    fn numbered(count: usize) -> String {
        (0..count).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_first_render_measures_heading_blank_paragraph() {
        let mut h = Harness::new();
        h.render("# Title\n\nHello **world**.");
        assert_eq!(h.renderer.content_height(), 30 + 6 + 12);
        let cache = h.renderer.layout().lines().unwrap();
        assert_eq!(cache.line_ys(), &[0, 30, 36]);
        assert_eq!(h.text_at("Title"), Some((5, 8)));
    }

    #[test]
    fn test_bold_is_drawn_twice() {
        let mut h = Harness::new();
        h.render("Hello **world**.");
        let xs: Vec<_> = h
            .surface
            .texts()
            .into_iter()
            .filter(|(_, _, t)| *t == "world")
            .map(|(x, _, _)| x)
            .collect();
        assert_eq!(xs, vec![41, 42]);
    }

    #[test]
    fn test_heading_heights_by_level() {
        let mut h = Harness::new();
        h.render("# A\n## B\n### C");
        assert_eq!(h.renderer.layout().lines().unwrap().line_ys(), &[0, 30, 55]);
        assert_eq!(h.renderer.content_height(), 74);
    }

    #[test]
    fn test_cached_render_visits_only_window() {
        let mut h = Harness::new();
        let doc = numbered(1000);
        h.render(&doc);
        assert_eq!(h.renderer.content_height(), 12_000);

        h.renderer.set_scroll_offset(6000);
        h.render(&doc);
        let texts = h.surface.texts();
        assert_eq!(texts.first().map(|t| t.2), Some("line500"));
        assert!(texts.len() < 40, "drew {} texts", texts.len());
        assert!(h.renderer.layout().is_cached());
    }

    #[test]
    fn test_scroll_clamps_after_measure() {
        let mut h = Harness::new();
        h.renderer.set_scroll_offset(1_000_000);
        let doc = numbered(100);
        h.render(&doc);
        assert_eq!(h.renderer.scroll_offset(), 1200 - 230);
        assert_eq!(h.text_at("line99").map(|p| p.1), Some(5 + 1188 - 970));
    }

    #[test]
    fn test_line_count_change_takes_stale_path() {
        let mut h = Harness::new();
        h.render("a\nb");
        h.render("a\nb\nc");
        assert_eq!(h.renderer.layout(), &LayoutState::Stale { content_height: 36 });
        assert!(h.text_at("c").is_some());
    }

    #[test]
    fn test_link_zone_hit_test() {
        let mut h = Harness::new();
        h.render("see [docs](https://example.com)");
        assert_eq!(h.renderer.link_at(30, 10), Some("https://example.com"));
        assert_eq!(h.renderer.link_at(6, 10), None);
    }

    #[test]
    fn test_search_records_positions_only_while_measuring() {
        let mut h = Harness::new();
        let doc = format!("{}\nneedle", numbered(50));
        h.render(&doc);
        h.renderer.set_search("NEEDLE", false);
        h.render(&doc);
        assert_eq!(h.renderer.search().positions(), &[600]);

        h.renderer.set_scroll_offset(600);
        h.render(&doc);
        assert_eq!(h.renderer.search().positions(), &[600]);
        let highlight = h.palette.get(ColorRole::SearchHighlight);
        assert_eq!(h.surface.rects_filled_with(highlight).len(), 1);
    }

    #[test]
    fn test_invalidate_forces_remeasure() {
        let mut h = Harness::new();
        h.render("a");
        h.renderer.invalidate("test");
        assert!(!h.renderer.layout().is_measured());
        h.render("a");
        assert!(h.renderer.layout().is_cached());
    }

    #[test]
    fn test_nested_quote_draws_bar_per_depth() {
        let mut h = Harness::new();
        h.render("> > deep");
        let bars = h.surface.rects_filled_with(h.palette.get(ColorRole::BlockquoteBar));
        assert_eq!(bars, vec![Rect::new(8, 5, 2, 12), Rect::new(18, 5, 2, 12)]);
        assert_eq!(h.text_at("deep"), Some((25, 5)));
    }

    #[test]
    fn test_list_bullets_and_tasks() {
        let mut h = Harness::new();
        h.render("- one\n  - two\n- [x] done\n3. three");
        assert_eq!(h.text_at(BULLET), Some((15, 5)));
        assert_eq!(h.text_at("one"), Some((30, 5)));
        assert_eq!(h.text_at("two"), Some((42, 17)));
        assert_eq!(h.text_at("done"), Some((28, 29)));
        assert_eq!(h.text_at("3."), Some((15, 41)));
        let done = h.surface.rects_filled_with(h.palette.get(ColorRole::TaskDone));
        assert_eq!(done, vec![Rect::new(17, 33, 4, 4)]);
    }

    #[test]
    fn test_rule_advances_ten() {
        let mut h = Harness::new();
        h.render("---\nafter");
        assert_eq!(h.text_at("after"), Some((5, 15)));
    }

    #[test]
    fn test_code_fence_unknown_language_draws_plain() {
        let mut h = Harness::new();
        h.render("```nope-lang\nlet x\n```");
        assert_eq!(h.text_at("let x"), Some((9, 5)));
        assert_eq!(h.renderer.content_height(), 12);
    }

    #[test]
    fn test_formula_fence_draws_box() {
        let mut h = Harness::new();
        h.render("```math\nx*y\n```\nafter");
        assert_eq!(h.text_at("x·y"), Some((9, 9)));
        // Box of one row plus padding, then the gap.
        assert_eq!(h.text_at("after"), Some((5, 5 + 20 + 4)));
    }

    #[test]
    fn test_unclosed_formula_flushes_at_end() {
        let mut h = Harness::new();
        h.render("```math\na\nb");
        assert_eq!(h.renderer.content_height(), 24 + 8 + 4);
    }

    #[test]
    fn test_heading_uses_large_font() {
        let mut h = Harness::new();
        h.render("# Big");
        let font = h.surface.commands().iter().find_map(|cmd| match cmd {
            DrawCommand::Text { text, style, .. } if text == "Big" => Some(style.font),
            _ => None,
        });
        assert_eq!(font, Some(FontId::Large));
    }
}
