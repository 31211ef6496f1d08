//! Search term and match bookkeeping.

/// Active search term and the content-Y of every line holding a match.
///
/// Positions are collected by the measurement pass only, so they describe
/// the layout as of the last remeasure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    term: Option<String>,
    needle: String,
    case_sensitive: bool,
    positions: Vec<i32>,
    index: usize,
}

impl SearchState {
    pub fn new(term: &str, case_sensitive: bool) -> Self {
        if term.is_empty() {
            return Self::default();
        }
        let needle = if case_sensitive {
            term.to_string()
        } else {
            term.to_lowercase()
        };
        Self {
            term: Some(term.to_string()),
            needle,
            case_sensitive,
            positions: Vec::new(),
            index: 0,
        }
    }

    pub const fn is_active(&self) -> bool {
        self.term.is_some()
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub const fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Whether `word` contains the term.
    pub fn matches(&self, word: &str) -> bool {
        if self.term.is_none() {
            return false;
        }
        if self.case_sensitive {
            word.contains(&self.needle)
        } else {
            word.to_lowercase().contains(&self.needle)
        }
    }

    /// Record a match at content-Y `y`, keeping positions sorted and unique.
    pub fn record(&mut self, y: i32) {
        if let Err(at) = self.positions.binary_search(&y) {
            self.positions.insert(at, y);
        }
    }

    /// Drop collected positions ahead of a remeasure.
    pub fn reset_positions(&mut self) {
        self.positions.clear();
        self.index = 0;
    }

    pub fn positions(&self) -> &[i32] {
        &self.positions
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<i32> {
        self.positions.get(self.index).copied()
    }

    /// Move to the next match, wrapping to the first, and return its position.
    pub fn advance(&mut self) -> Option<i32> {
        if self.positions.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.positions.len();
        self.current()
    }
}
