//! Inline emphasis parsing.
//!
//! A single left-to-right scan with no nesting. At each position the
//! markers are tried in priority order: `~~strike~~`, `[text](url)`,
//! `**bold**`, `*italic*`, `` `code` ``. A marker whose closing half is
//! missing on the same line is literal text.

/// Kind of an inline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Normal,
    Bold,
    Italic,
    Code,
    Strikethrough,
    Link,
}

/// A typed run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Target of a [`SegmentKind::Link`] segment.
    pub url: Option<&'a str>,
}

impl<'a> Segment<'a> {
    pub const fn new(kind: SegmentKind, text: &'a str) -> Self {
        Self {
            kind,
            text,
            url: None,
        }
    }

    pub const fn link(text: &'a str, url: &'a str) -> Self {
        Self {
            kind: SegmentKind::Link,
            text,
            url: Some(url),
        }
    }
}

/// Split `text` into styled segments.
///
/// A line without markers yields exactly one `Normal` segment, even when
/// empty.
pub fn parse_inline(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    // Start of the pending plain run. Markers are ASCII so byte offsets
    // always land on char boundaries.
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];

        if rest.starts_with("~~") {
            if let Some(end) = text[i + 2..].find("~~") {
                push_plain(&mut segments, text, plain_start, i);
                let inner = &text[i + 2..i + 2 + end];
                segments.push(Segment::new(SegmentKind::Strikethrough, inner));
                i += 2 + end + 2;
                plain_start = i;
                continue;
            }
        }

        if bytes[i] == b'[' {
            if let Some((label, url, consumed)) = parse_link(rest) {
                push_plain(&mut segments, text, plain_start, i);
                segments.push(Segment::link(label, url));
                i += consumed;
                plain_start = i;
                continue;
            }
        }

        if rest.starts_with("**") {
            if let Some(end) = text[i + 2..].find("**") {
                push_plain(&mut segments, text, plain_start, i);
                segments.push(Segment::new(SegmentKind::Bold, &text[i + 2..i + 2 + end]));
                i += 2 + end + 2;
                plain_start = i;
                continue;
            }
        } else if let Some(kind) = single_marker_kind(bytes[i]) {
            if let Some(end) = text[i + 1..].find(char::from(bytes[i])) {
                push_plain(&mut segments, text, plain_start, i);
                segments.push(Segment::new(kind, &text[i + 1..i + 1 + end]));
                i += 1 + end + 1;
                plain_start = i;
                continue;
            }
        }

        i += rest.chars().next().map_or(1, char::len_utf8);
    }

    push_plain(&mut segments, text, plain_start, text.len());
    if segments.is_empty() {
        segments.push(Segment::new(SegmentKind::Normal, text));
    }
    segments
}

/// Concatenated visible text of a line, markers removed.
pub fn plain_text(text: &str) -> String {
    parse_inline(text).iter().map(|s| s.text).collect()
}

const fn single_marker_kind(byte: u8) -> Option<SegmentKind> {
    match byte {
        b'*' => Some(SegmentKind::Italic),
        b'`' => Some(SegmentKind::Code),
        _ => None,
    }
}

/// Parse `[label](url)` at the start of `rest`; returns bytes consumed.
fn parse_link(rest: &str) -> Option<(&str, &str, usize)> {
    let bracket_end = rest[1..].find(']')? + 1;
    if rest.as_bytes().get(bracket_end + 1) != Some(&b'(') {
        return None;
    }
    let paren_end = rest[bracket_end + 2..].find(')')? + bracket_end + 2;
    Some((
        &rest[1..bracket_end],
        &rest[bracket_end + 2..paren_end],
        paren_end + 1,
    ))
}

fn push_plain<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str, start: usize, end: usize) {
    if end > start {
        segments.push(Segment::new(SegmentKind::Normal, &text[start..end]));
    }
}
