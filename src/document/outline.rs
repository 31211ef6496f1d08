//! Table of contents and document statistics.
//!
//! Both are pure scans over the raw text and never touch the layout cache.

use super::block::{fence_marker, heading_level};

/// Average reading speed used for [`DocumentStats::read_minutes`].
pub const WORDS_PER_MINUTE: usize = 200;

/// A heading reference for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (1-6)
    pub level: usize,
    /// Heading text without the `#` run
    pub title: String,
    /// Zero-based source line index
    pub line: usize,
}

/// Line, word and reading-time counts for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub lines: usize,
    pub words: usize,
    pub read_minutes: usize,
}

/// Extract headings, skipping lines inside code or formula fences.
pub fn headings(content: &str) -> Vec<Heading> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for (line_index, line) in content.split('\n').enumerate() {
        if fence_marker(line).is_some() {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let stripped = line.trim();
        if !stripped.starts_with('#') {
            continue;
        }
        let level = heading_level(stripped);
        let title = stripped[level..].trim();
        if !title.is_empty() {
            out.push(Heading {
                level,
                title: title.to_string(),
                line: line_index,
            });
        }
    }
    out
}

/// Count lines and whitespace-separated words.
pub fn stats(content: &str) -> DocumentStats {
    if content.is_empty() {
        return DocumentStats::default();
    }
    let lines = content.split('\n').count();
    let words = content.split_whitespace().count();
    let read_minutes = if words == 0 {
        0
    } else {
        words.div_ceil(WORDS_PER_MINUTE).max(1)
    };
    DocumentStats {
        lines,
        words,
        read_minutes,
    }
}
