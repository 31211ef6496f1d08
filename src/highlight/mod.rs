//! Syntax highlighting for code fence lines.
//!
//! Uses syntect with Sublime Text syntax definitions. Each line is colored
//! on its own, with no parser state carried over from earlier lines, so a
//! render that resumes mid-fence colors a line exactly like a full pass.

use std::path::Path;
use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::theme::{Rgb, ThemeMode};

/// A colored run of a highlighted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub color: Rgb,
    pub text: String,
}

/// Highlight one code line in `language`.
///
/// Returns `None` when the language tag is unknown, in which case the caller
/// draws the line unstyled.
pub fn highlight_line(language: &str, line: &str, mode: ThemeMode) -> Option<Vec<Token>> {
    let syntax_set = syntax_set();
    let syntax = find_syntax(syntax_set, language)?;

    let mut highlighter = HighlightLines::new(syntax, theme(mode));
    let with_newline = format!("{line}\n");
    let ranges = highlighter
        .highlight_line(&with_newline, syntax_set)
        .ok()?;

    let mut tokens: Vec<Token> = Vec::with_capacity(ranges.len());
    for (style, text) in ranges {
        let text = text.trim_end_matches('\n');
        if text.is_empty() {
            continue;
        }
        let color = adjust_fg_for_background(
            Rgb {
                r: style.foreground.r,
                g: style.foreground.g,
                b: style.foreground.b,
            },
            mode,
        );
        match tokens.last_mut() {
            Some(last) if last.color == color => last.text.push_str(text),
            _ => tokens.push(Token {
                color,
                text: text.to_string(),
            }),
        }
    }
    Some(tokens)
}

/// Whether `language` names a syntax the highlighter knows.
pub fn is_known_language(language: &str) -> bool {
    find_syntax(syntax_set(), language).is_some()
}

/// Syntax name for a source file, by extension.
///
/// Markdown and plain text files yield `None` since they render as
/// documents rather than code.
pub fn language_for_file(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let syntax = syntax_set().find_syntax_by_extension(ext)?;
    match syntax.name.as_str() {
        "Markdown" | "MultiMarkdown" | "Plain Text" => None,
        name => Some(name.to_string()),
    }
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    if language.is_empty() {
        return None;
    }
    syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        ThemeSet::load_defaults()
    })
}

fn theme(mode: ThemeMode) -> &'static Theme {
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    static DARK: OnceLock<Theme> = OnceLock::new();
    let (cell, preferred) = match mode {
        ThemeMode::Dark => (
            &DARK,
            [
                "Monokai Extended",
                "base16-ocean.dark",
                "Solarized (dark)",
            ]
            .as_slice(),
        ),
        ThemeMode::Light => (
            &LIGHT,
            ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice(),
        ),
    };
    cell.get_or_init(|| {
        let themes = &theme_set().themes;
        preferred
            .iter()
            .find_map(|name| themes.get(*name).cloned())
            .or_else(|| themes.values().next().cloned())
            .unwrap_or_default()
    })
}

fn adjust_fg_for_background(color: Rgb, mode: ThemeMode) -> Rgb {
    match mode {
        ThemeMode::Dark => color,
        ThemeMode::Light => {
            let luma = 0.0722f32.mul_add(
                f32::from(color.b),
                0.2126f32.mul_add(f32::from(color.r), 0.7152 * f32::from(color.g)),
            );
            if luma < 155.0 {
                return color;
            }
            Rgb {
                r: (f32::from(color.r) * 0.42).round() as u8,
                g: (f32::from(color.g) * 0.42).round() as u8,
                b: (f32::from(color.b) * 0.42).round() as u8,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust_produces_multiple_colors() {
        let tokens = highlight_line("rust", "fn main() { let x = 1; }", ThemeMode::Dark).unwrap();
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, "fn main() { let x = 1; }");
        let first = tokens[0].color;
        assert!(
            tokens.iter().any(|t| t.color != first),
            "Expected more than one color for Rust"
        );
    }

    #[test]
    fn test_highlight_unknown_language_is_none() {
        assert!(highlight_line("nope-lang", "just text", ThemeMode::Light).is_none());
        assert!(!is_known_language("nope-lang"));
    }

    #[test]
    fn test_highlight_empty_tag_is_none() {
        assert!(highlight_line("", "x = 1", ThemeMode::Light).is_none());
    }

    #[test]
    fn test_highlight_is_stateless_per_line() {
        let a = highlight_line("python", "x = 1", ThemeMode::Dark);
        let b = highlight_line("python", "x = 1", ThemeMode::Dark);
        assert_eq!(a, b);
    }

    #[test]
    fn test_language_for_file_by_extension() {
        assert_eq!(language_for_file(Path::new("main.rs")).as_deref(), Some("Rust"));
        assert_eq!(language_for_file(Path::new("README.md")), None);
        assert_eq!(language_for_file(Path::new("notes.txt")), None);
        assert_eq!(language_for_file(Path::new("Makefile.nope-ext")), None);
    }

    #[test]
    fn test_light_mode_darkens_bright_fg() {
        let bright = Rgb {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = adjust_fg_for_background(bright, ThemeMode::Light);
        assert!(adjusted.r < bright.r);
        assert!(adjusted.g < bright.g);
        assert!(adjusted.b < bright.b);
    }

    #[test]
    fn test_dark_mode_keeps_colors() {
        let color = Rgb::hex(0xF0_E678);
        assert_eq!(adjust_fg_for_background(color, ThemeMode::Dark), color);
    }
}
