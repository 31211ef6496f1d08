//! Block-level classification of single source lines.
//!
//! Classification is stateless: fence and table state live in the
//! renderer, which only asks for a [`Block`] once a line is known to be
//! outside any fence.

/// Leading spaces per nested-list level.
pub const LIST_INDENT_WIDTH: usize = 2;

/// Headings deeper than this are clamped.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Kind of fence opened by a ```` ``` ```` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceKind {
    /// Code, with the syntax tag if one was given.
    Code(Option<String>),
    Formula,
}

impl FenceKind {
    /// Interpret the tag that follows an opening ```` ``` ````.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if ["math", "formula", "cas"]
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
        {
            Self::Formula
        } else if tag.is_empty() {
            Self::Code(None)
        } else {
            Self::Code(Some(tag.to_string()))
        }
    }
}

/// The block a non-fenced source line belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Blank,
    Heading {
        level: usize,
        text: &'a str,
    },
    Rule,
    Quote {
        depth: usize,
        text: &'a str,
    },
    Task {
        checked: bool,
        level: usize,
        text: &'a str,
    },
    Bullet {
        level: usize,
        text: &'a str,
    },
    Ordered {
        level: usize,
        marker: &'a str,
        text: &'a str,
    },
    TableRow(Vec<&'a str>),
    TableSeparator,
    Image {
        source: &'a str,
    },
    Paragraph(&'a str),
}

impl Block<'_> {
    pub const fn is_table(&self) -> bool {
        matches!(self, Self::TableRow(_) | Self::TableSeparator)
    }
}

/// If `line` is a fence toggle, return the text after the backticks.
pub fn fence_marker(line: &str) -> Option<&str> {
    line.trim().strip_prefix("```")
}

/// Whether `line` belongs to a pipe table (data or separator row).
pub fn is_table_line(line: &str) -> bool {
    line.trim_end().starts_with('|')
}

/// Classify one line that is outside any fence.
pub fn classify(line: &str) -> Block<'_> {
    let line = line.trim_end();
    let stripped = line.trim();

    if stripped.is_empty() {
        return Block::Blank;
    }
    if line.starts_with('|') {
        return table_row(line);
    }
    if stripped.starts_with("![") {
        return parse_image(stripped).map_or(Block::Paragraph(stripped), |source| {
            Block::Image { source }
        });
    }
    if line.starts_with('#') {
        return heading(line);
    }
    if matches!(stripped, "---" | "***" | "___") {
        return Block::Rule;
    }
    if stripped.starts_with('>') {
        return quote(stripped);
    }

    let body = line.trim_start_matches(' ');
    let level = (line.len() - body.len()) / LIST_INDENT_WIDTH;

    for (prefix, checked) in [("- [ ] ", false), ("- [x] ", true), ("- [X] ", true)] {
        if let Some(text) = body.strip_prefix(prefix) {
            return Block::Task {
                checked,
                level,
                text,
            };
        }
    }
    if let Some(text) = body.strip_prefix("- ").or_else(|| body.strip_prefix("* ")) {
        return Block::Bullet { level, text };
    }
    if let Some((marker, text)) = ordered_marker(body) {
        return Block::Ordered {
            level,
            marker,
            text,
        };
    }
    Block::Paragraph(line)
}

/// Split a pipe-delimited row into trimmed cells, dropping the empty cells
/// produced by leading and trailing pipes.
pub fn split_cells(line: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = line.split('|').collect();
    if parts.first().is_some_and(|c| c.trim().is_empty()) {
        parts.remove(0);
    }
    if parts.last().is_some_and(|c| c.trim().is_empty()) {
        parts.pop();
    }
    parts.into_iter().map(str::trim).collect()
}

/// Extract the source of `![alt](source)`, or `None` if malformed.
pub fn parse_image(line: &str) -> Option<&str> {
    let bracket_end = line.find(']')?;
    let paren_start = line[bracket_end..].find('(')? + bracket_end;
    let paren_end = line.rfind(')')?;
    (paren_end > paren_start).then(|| &line[paren_start + 1..paren_end])
}

/// Count a leading `#` run, capped at [`MAX_HEADING_LEVEL`].
pub fn heading_level(line: &str) -> usize {
    line.bytes()
        .take_while(|&b| b == b'#')
        .count()
        .min(MAX_HEADING_LEVEL)
}

fn table_row(line: &str) -> Block<'_> {
    let cells = split_cells(line);
    let separator = cells
        .iter()
        .all(|c| c.chars().all(|ch| matches!(ch, '-' | ':' | ' ')));
    if separator {
        Block::TableSeparator
    } else {
        Block::TableRow(cells)
    }
}

fn heading(line: &str) -> Block<'_> {
    let level = heading_level(line);
    Block::Heading {
        level,
        text: line[level..].trim(),
    }
}

fn quote(stripped: &str) -> Block<'_> {
    let mut depth = 0;
    let mut rest = stripped;
    while let Some(after) = rest.strip_prefix('>') {
        depth += 1;
        rest = after.strip_prefix(' ').unwrap_or(after);
    }
    Block::Quote {
        depth,
        text: rest.trim(),
    }
}

/// `12. text` → `("12.", "text")`.
fn ordered_marker(body: &str) -> Option<(&str, &str)> {
    let dot = body.find('.')?;
    if dot == 0 || !body[..dot].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if body.as_bytes().get(dot + 1) != Some(&b' ') {
        return None;
    }
    Some((&body[..=dot], body[dot + 1..].trim_start()))
}
