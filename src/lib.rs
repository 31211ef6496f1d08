// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderTarget)
    clippy::module_name_repetitions
)]

//! # Pocketmd
//!
//! An incremental markdown layout engine for small fixed-size displays
//! (320x240 logical pixels).
//!
//! Pocketmd turns plain markdown text into positioned draw calls with:
//! - Single-pass word wrap with inline emphasis, code and links
//! - Pipe tables, blockquotes, nested and task lists, images
//! - Code fences with syntax coloring and formula fences
//! - A per-line offset cache so scrolling only lays out the visible window
//!
//! ## Architecture
//!
//! Data flows one way per frame:
//! `Document::render` → block classifier → inline parser / table / fence
//! handlers → word wrap → [`surface::Surface`] draw calls and cache updates →
//! scrollbar overlay.
//!
//! ## Modules
//!
//! - [`document`]: Document ownership, block classification, inline parsing
//! - [`render`]: Layout cache and incremental renderer
//! - [`surface`]: Drawing collaborator boundary and bundled surfaces
//! - [`theme`]: Semantic color palettes
//! - [`highlight`]: Syntax coloring for code fences
//! - [`formula`]: Formula fence formatting boundary
//! - [`source`]: Raw text loading boundary
//! - [`config`]: Persisted default flags

pub mod config;
pub mod document;
pub mod error;
pub mod formula;
pub mod highlight;
pub mod perf;
pub mod render;
pub mod source;
pub mod surface;
pub mod theme;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, DocumentStats, Heading};
    pub use crate::formula::{FormulaFormatter, PlainFormula};
    pub use crate::render::{Renderer, Viewport};
    pub use crate::surface::{FontId, RecordingSurface, Rect, Surface};
    pub use crate::theme::{ColorRole, Palette, Rgb, ThemeMode};
}
