//! Layout cache state machine.
//!
//! A measurement pass records, for every source line, the content-Y at
//! which the line starts and the fence it starts inside. Later frames
//! binary-search that table to resume rendering near the scroll offset.

use crate::document::block::is_table_line;

/// Which fence a line was entered inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FenceState {
    #[default]
    None,
    Code,
    Formula,
}

/// Per-line start offsets and fence states from one measurement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCache {
    line_y: Vec<i32>,
    fence: Vec<FenceState>,
    /// Fence state after the last line.
    end_fence: FenceState,
}

impl LineCache {
    pub fn with_capacity(lines: usize) -> Self {
        Self {
            line_y: Vec::with_capacity(lines),
            fence: Vec::with_capacity(lines),
            end_fence: FenceState::None,
        }
    }

    pub fn push(&mut self, content_y: i32, fence: FenceState) {
        self.line_y.push(content_y);
        self.fence.push(fence);
    }

    pub const fn set_end_fence(&mut self, fence: FenceState) {
        self.end_fence = fence;
    }

    pub fn len(&self) -> usize {
        self.line_y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_y.is_empty()
    }

    pub fn line_ys(&self) -> &[i32] {
        &self.line_y
    }

    pub fn fences(&self) -> &[FenceState] {
        &self.fence
    }

    pub fn y_of(&self, line: usize) -> Option<i32> {
        self.line_y.get(line).copied()
    }

    /// Fence state on entry to `line`; one past the end gives the final state.
    pub fn fence_at(&self, line: usize) -> FenceState {
        self.fence.get(line).copied().unwrap_or(self.end_fence)
    }

    /// Index of the first line whose start offset is at or below `y`.
    pub fn first_at_or_below(&self, y: i32) -> usize {
        self.line_y.partition_point(|&ly| ly < y)
    }

    /// Line index to restart rendering from so that content at `target_y`
    /// is laid out correctly.
    ///
    /// Starts at the first line beginning exactly at `target_y`, else at the
    /// line whose block spans it. Buffered blocks cannot be entered midway:
    /// the start then backs up over table rows and over lines inside a
    /// formula fence until it reaches the row or fence opener that begins
    /// the block.
    pub fn resume_point(&self, lines: &[&str], target_y: i32) -> usize {
        let mut idx = self.first_at_or_below(target_y);
        if idx > 0 && self.y_of(idx).is_none_or(|y| y > target_y) {
            idx -= 1;
        }
        while idx > 0 {
            let in_formula = self.fence_at(idx) == FenceState::Formula;
            let after_table_row =
                self.fence[idx - 1] == FenceState::None && lines.get(idx - 1).is_some_and(|l| is_table_line(l));
            if !(in_formula || after_table_row) {
                break;
            }
            idx -= 1;
        }
        idx
    }

    /// For a line inside a code fence, the index of the fence's opening line.
    pub fn fence_opener(&self, line: usize) -> Option<usize> {
        if self.fence_at(line) != FenceState::Code {
            return None;
        }
        (0..line.min(self.len())).rev().find(|&i| self.fence[i] == FenceState::None)
    }
}

/// Layout cache state, transitioned only by measurement and invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayoutState {
    /// No measurement yet, or invalidated. The next render measures.
    #[default]
    Unmeasured,
    /// Measured; `lines` matches the current line count.
    Cached {
        content_height: i32,
        lines: LineCache,
    },
    /// Measured, but the text changed underneath; renders walk from the top.
    Stale { content_height: i32 },
}

impl LayoutState {
    /// Total laid-out height, 0 while unmeasured.
    pub const fn content_height(&self) -> i32 {
        match self {
            Self::Unmeasured => 0,
            Self::Cached { content_height, .. } | Self::Stale { content_height } => {
                *content_height
            }
        }
    }

    pub const fn is_measured(&self) -> bool {
        !matches!(self, Self::Unmeasured)
    }

    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }

    pub const fn lines(&self) -> Option<&LineCache> {
        match self {
            Self::Cached { lines, .. } => Some(lines),
            _ => None,
        }
    }

    /// Demote a cache whose length no longer matches `line_count`.
    ///
    /// Returns true if the state changed.
    pub fn check_line_count(&mut self, line_count: usize) -> bool {
        if let Self::Cached {
            content_height,
            lines,
        } = self
        {
            if lines.len() != line_count {
                tracing::debug!(
                    cached = lines.len(),
                    actual = line_count,
                    "line count changed, layout cache is stale"
                );
                *self = Self::Stale {
                    content_height: *content_height,
                };
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(entries: &[(i32, FenceState)]) -> LineCache {
        let mut cache = LineCache::with_capacity(entries.len());
        for &(y, fence) in entries {
            cache.push(y, fence);
        }
        cache
    }

    #[test]
    fn test_first_at_or_below_uses_lower_bound() {
        let c = cache(&[(0, FenceState::None), (12, FenceState::None), (24, FenceState::None)]);
        assert_eq!(c.first_at_or_below(-5), 0);
        assert_eq!(c.first_at_or_below(12), 1);
        assert_eq!(c.first_at_or_below(13), 2);
        assert_eq!(c.first_at_or_below(100), 3);
    }

    #[test]
    fn test_resume_backs_up_to_table_start() {
        let lines = ["intro", "| a |", "| b |", "| c |", "after"];
        // Buffered table rows do not advance the cursor.
        let c = cache(&[
            (0, FenceState::None),
            (12, FenceState::None),
            (12, FenceState::None),
            (12, FenceState::None),
            (12, FenceState::None),
        ]);
        assert_eq!(c.resume_point(&lines, 12), 1);
    }

    #[test]
    fn test_resume_backs_up_to_formula_opener() {
        let lines = ["text", "```math", "x+1", "y+2", "```", "tail"];
        let c = cache(&[
            (0, FenceState::None),
            (12, FenceState::None),
            (12, FenceState::Formula),
            (12, FenceState::Formula),
            (12, FenceState::Formula),
            (40, FenceState::None),
        ]);
        assert_eq!(c.resume_point(&lines, 12), 1);
        assert_eq!(c.resume_point(&lines, 40), 5);
    }

    #[test]
    fn test_resume_past_end_backs_into_trailing_table() {
        let lines = ["x", "| a |", "| b |"];
        let c = cache(&[(0, FenceState::None), (12, FenceState::None), (12, FenceState::None)]);
        assert_eq!(c.resume_point(&lines, 500), 1);
    }

    #[test]
    fn test_resume_past_end_backs_into_unclosed_formula() {
        let lines = ["```math", "x"];
        let mut c = cache(&[(0, FenceState::None), (0, FenceState::Formula)]);
        c.set_end_fence(FenceState::Formula);
        assert_eq!(c.resume_point(&lines, 500), 0);
    }

    #[test]
    fn test_resume_inside_tall_table_backs_up_to_first_row() {
        let lines = ["| h |", "| 1 |", "| 2 |", "", "after"];
        // A 3-row table at 0..46, the blank line flushes it.
        let c = cache(&[
            (0, FenceState::None),
            (0, FenceState::None),
            (0, FenceState::None),
            (0, FenceState::None),
            (52, FenceState::None),
        ]);
        assert_eq!(c.resume_point(&lines, 30), 0);
    }

    #[test]
    fn test_resume_inside_tall_line_starts_at_that_line() {
        let lines = ["a", "![img](big.png)", "b"];
        let c = cache(&[(0, FenceState::None), (12, FenceState::None), (200, FenceState::None)]);
        assert_eq!(c.resume_point(&lines, 100), 1);
    }

    #[test]
    fn test_pipe_inside_code_fence_is_not_table() {
        let lines = ["```", "| not table", "code"];
        let c = cache(&[(0, FenceState::None), (0, FenceState::Code), (12, FenceState::Code)]);
        assert_eq!(c.resume_point(&lines, 12), 2);
    }

    #[test]
    fn test_fence_opener_for_code_line() {
        let c = cache(&[
            (0, FenceState::None),
            (0, FenceState::Code),
            (12, FenceState::Code),
        ]);
        assert_eq!(c.fence_opener(2), Some(0));
        assert_eq!(c.fence_opener(0), None);
    }

    #[test]
    fn test_line_count_mismatch_goes_stale() {
        let mut state = LayoutState::Cached {
            content_height: 120,
            lines: cache(&[(0, FenceState::None)]),
        };
        assert!(!state.check_line_count(1));
        assert!(state.check_line_count(2));
        assert_eq!(state, LayoutState::Stale { content_height: 120 });
        assert_eq!(state.content_height(), 120);
    }

    #[test]
    fn test_unmeasured_height_is_zero() {
        assert_eq!(LayoutState::Unmeasured.content_height(), 0);
        assert!(!LayoutState::Unmeasured.is_measured());
    }
}
