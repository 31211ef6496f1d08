//! Markdown document ownership and viewer operations.
//!
//! This module handles:
//! - Owning the raw text, the renderer and the drawing collaborators
//! - Classifying lines into blocks ([`block`]) and inline runs ([`inline`])
//! - Table of contents and statistics ([`outline`])

pub mod block;
pub mod inline;
pub mod outline;

use std::path::Path;

pub use outline::{DocumentStats, Heading};

use crate::error::LoadError;
use crate::formula::{FormulaFormatter, PlainFormula};
use crate::render::{Renderer, Target, Viewport};
use crate::source::TextSource;
use crate::surface::Surface;
use crate::theme::Palette;

/// Image file extensions shown as a single inline image.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "tif"];

/// Prepare file content for rendering based on its extension.
///
/// Recognized source files are wrapped in a code fence so they render with
/// syntax coloring, and image files become an image reference. Markdown and
/// unrecognized files pass through unchanged.
pub fn prepare_content(file_path: &Path, content: String) -> String {
    if is_image_file(file_path) {
        return image_markdown(file_path);
    }
    let Some(language) = crate::highlight::language_for_file(file_path) else {
        return content;
    };
    format!("```{language}\n{content}\n```")
}

/// Returns true if the file extension is a recognized image format.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Markdown that displays an image file inline.
pub fn image_markdown(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("![{name}]({name})")
}

/// Text shown in place of a document that failed to load.
pub fn error_document(name: &str) -> String {
    format!("# Error\n\nCould not load file: {name}")
}

/// An open markdown document bound to a drawing surface.
///
/// The renderer is created on first use and torn down when the content is
/// replaced or the viewport changes. Every operation that moves the view
/// renders a fresh frame.
pub struct Document<S> {
    content: String,
    /// Name last passed to [`Document::load_from`].
    name: Option<String>,
    renderer: Option<Renderer>,
    surface: S,
    palette: Palette,
    formula: Box<dyn FormulaFormatter>,
    viewport: Viewport,
    bookmarks: Vec<i32>,
}

impl<S: Surface> Document<S> {
    pub fn new(surface: S) -> Self {
        Self {
            content: String::new(),
            name: None,
            renderer: None,
            surface,
            palette: Palette::default(),
            formula: Box::new(PlainFormula),
            viewport: Viewport::default(),
            bookmarks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_formula(mut self, formula: Box<dyn FormulaFormatter>) -> Self {
        self.formula = formula;
        self
    }

    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Replace the content wholesale. Scroll, search and layout reset.
    pub fn load(&mut self, text: impl Into<String>) {
        self.content = text.into();
        if self.renderer.take().is_some() {
            tracing::debug!("content replaced, renderer reset");
        }
    }

    /// Load content from `source`.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the source fails. The document then holds a
    /// short error page so it can still be rendered.
    pub fn load_from(&mut self, source: &dyn TextSource, name: &str) -> Result<(), LoadError> {
        let _scope = crate::perf::scope("document.load");
        self.name = Some(name.to_string());
        match source.load_raw_text(name) {
            Ok(text) => {
                self.load(text);
                Ok(())
            }
            Err(source_err) => {
                tracing::warn!(name, error = %source_err, "failed to load document");
                self.load(error_document(name));
                Err(LoadError::Io {
                    name: name.to_string(),
                    source: source_err,
                })
            }
        }
    }

    /// Read the last loaded name from `source` again.
    ///
    /// Does nothing if the document was never loaded from a source.
    ///
    /// # Errors
    /// Returns [`LoadError`] under the same conditions as
    /// [`Document::load_from`].
    pub fn reload(&mut self, source: &dyn TextSource) -> Result<(), LoadError> {
        let Some(name) = self.name.clone() else {
            return Ok(());
        };
        self.load_from(source, &name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Draw one frame at the current scroll offset.
    pub fn render(&mut self) {
        let viewport = self.viewport;
        let renderer = self.renderer.get_or_insert_with(|| Renderer::new(viewport));
        renderer.render(
            &self.content,
            Target {
                surface: &mut self.surface,
                palette: &self.palette,
                formula: self.formula.as_ref(),
                bookmarks: &self.bookmarks,
            },
        );
    }

    fn renderer_mut(&mut self) -> &mut Renderer {
        let viewport = self.viewport;
        self.renderer.get_or_insert_with(|| Renderer::new(viewport))
    }

    /// Render once if the layout has not been measured, so scroll bounds
    /// are known.
    fn ensure_measured(&mut self) {
        if !self.renderer.as_ref().is_some_and(|r| r.layout().is_measured()) {
            self.render();
        }
    }

    fn scroll_with(&mut self, step: impl FnOnce(&mut Renderer)) {
        self.ensure_measured();
        step(self.renderer_mut());
        self.render();
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll_with(|r| r.scroll_by(delta));
    }

    pub fn scroll_up(&mut self) {
        self.scroll_with(Renderer::scroll_up);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_with(Renderer::scroll_down);
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_with(Renderer::scroll_page_up);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_with(Renderer::scroll_page_down);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_with(Renderer::scroll_to_top);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_with(Renderer::scroll_to_bottom);
    }

    /// Jump to `ratio` (0.0 top, 1.0 bottom) of the scrollable range.
    pub fn scroll_to_ratio(&mut self, ratio: f64) {
        self.scroll_with(|r| r.scroll_to_ratio(ratio));
    }

    /// Scroll so source line `line` starts at the top of the viewport.
    ///
    /// The position comes from the layout cache, which is built first if
    /// needed. Lines past the end scroll to the bottom.
    pub fn scroll_to_line(&mut self, line: usize) {
        if self.content.is_empty() {
            return;
        }
        self.ensure_measured();
        if self.renderer.as_ref().and_then(|r| r.line_offset(line)).is_none() {
            // A stale layout has no offset table; rebuild it.
            self.renderer_mut().invalidate("line offsets requested");
            self.render();
        }
        let renderer = self.renderer_mut();
        if let Some(offset) = renderer.line_offset(line) {
            renderer.set_scroll_offset(offset);
        }
        self.render();
    }

    /// Search for `term` and jump to the first match.
    ///
    /// Returns whether any match was found. An empty term clears the search.
    pub fn search(&mut self, term: &str, case_sensitive: bool) -> bool {
        if term.is_empty() {
            self.clear_search();
            return false;
        }
        self.renderer_mut().set_search(term, case_sensitive);
        self.render();

        let renderer = self.renderer_mut();
        let Some(first) = renderer.search().current() else {
            tracing::debug!(term, "no matches");
            return false;
        };
        renderer.set_scroll_offset(first);
        self.render();
        true
    }

    /// Jump to the next match, wrapping to the first.
    pub fn search_next(&mut self) {
        if self.renderer_mut().next_match().is_some() {
            self.render();
        }
    }

    pub fn clear_search(&mut self) {
        self.renderer_mut().clear_search();
        self.render();
    }

    /// Content-Y of every line holding a match, from the last measurement.
    pub fn search_positions(&self) -> &[i32] {
        self.renderer
            .as_ref()
            .map_or(&[], |r| r.search().positions())
    }

    /// Scroll progress, 0 to 100.
    pub fn progress_percent(&self) -> u8 {
        self.renderer.as_ref().map_or(0, Renderer::progress_percent)
    }

    /// URL of a link drawn at screen point `(x, y)` in the last frame.
    pub fn link_at(&self, x: i32, y: i32) -> Option<&str> {
        self.renderer.as_ref()?.link_at(x, y)
    }

    /// Headings in document order, from a scan of the raw text.
    pub fn headers(&self) -> Vec<Heading> {
        outline::headings(&self.content)
    }

    pub fn stats(&self) -> DocumentStats {
        outline::stats(&self.content)
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Swap the palette and redraw.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.invalidate("palette changed");
        }
        self.render();
    }

    /// Switch between the built-in light and dark palettes.
    pub fn toggle_theme(&mut self) {
        let mode = self.palette.mode().toggled();
        self.set_palette(Palette::for_mode(mode));
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Change the window. Any change discards the renderer.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if self.renderer.take().is_some() {
            tracing::debug!(?viewport, "viewport changed, renderer reset");
        }
    }

    /// Content-Y positions drawn as scrollbar ticks.
    pub fn set_bookmarks(&mut self, positions: Vec<i32>) {
        self.bookmarks = positions;
    }

    pub fn bookmarks(&self) -> &[i32] {
        &self.bookmarks
    }

    pub fn scroll_position(&self) -> i32 {
        self.renderer.as_ref().map_or(0, Renderer::scroll_offset)
    }

    /// Restore a saved offset; takes effect on the next render.
    pub fn set_scroll_position(&mut self, position: i32) {
        self.renderer_mut().set_scroll_offset(position);
    }

    pub fn content_height(&self) -> i32 {
        self.renderer.as_ref().map_or(0, Renderer::content_height)
    }

    pub const fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
