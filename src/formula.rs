//! Formula fence formatting boundary.
//!
//! Formula fences (```` ```math ````, ```` ```formula ````, ```` ```cas ````)
//! hold one expression per line. The renderer hands each expression to a
//! [`FormulaFormatter`] and stacks the results inside a bordered box.

/// Converts CAS expressions to display text.
pub trait FormulaFormatter {
    /// Display string for `expr`.
    fn format_formula(&self, expr: &str) -> String;

    /// Pixel size of the formatted `expr`, when the formatter lays it out
    /// itself. `None` falls back to measuring the display string as one
    /// text line.
    fn measure_formula(&self, expr: &str) -> Option<(i32, i32)>;
}

/// Formatter that prettifies common operators and leaves the rest as typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormula;

const REPLACEMENTS: &[(&str, &str)] = &[
    ("sqrt", "√"),
    ("<=", "≤"),
    (">=", "≥"),
    ("!=", "≠"),
    ("->", "→"),
    ("*", "·"),
];

impl FormulaFormatter for PlainFormula {
    fn format_formula(&self, expr: &str) -> String {
        let collapsed = expr.split_whitespace().collect::<Vec<_>>().join(" ");
        REPLACEMENTS
            .iter()
            .fold(collapsed, |acc, (from, to)| acc.replace(from, to))
    }

    fn measure_formula(&self, _expr: &str) -> Option<(i32, i32)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_formula_collapses_whitespace() {
        assert_eq!(PlainFormula.format_formula("x  +   1"), "x + 1");
    }

    #[test]
    fn test_plain_formula_replaces_operators() {
        assert_eq!(PlainFormula.format_formula("a*b <= sqrt(2)"), "a·b ≤ √(2)");
    }

    #[test]
    fn test_plain_formula_does_not_measure() {
        assert_eq!(PlainFormula.measure_formula("x"), None);
    }
}
