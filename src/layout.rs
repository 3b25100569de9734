//! Text measurement and fitting against a column budget.
//!
//! Text handed to the renderer may contain escape sequences (preview output, styled
//! status text). Everything here walks text as a sequence of [`Fragment`]s so that an
//! escape sequence is never cut in half and never counted as visible width, and a
//! multi-column glyph is either emitted whole or not at all.

use crate::capability::CapabilitySet;
use crate::style::Style;
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// Number of columns a tab expands to.
const TAB_WIDTH: usize = 4;

/// A piece of text that is either visible characters or one escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    Text(&'a str),
    Escape(&'a str),
}

/// Split `text` into visible runs and escape sequences.
///
/// A lone ESC that does not start a recognizable sequence is dropped.
pub fn fragments(text: &str) -> Vec<Fragment<'_>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != 0x1b {
            i += 1;
            continue;
        }
        if run_start < i {
            out.push(Fragment::Text(&text[run_start..i]));
        }
        let end = escape_end(bytes, i);
        if let Some(end) = end {
            out.push(Fragment::Escape(&text[i..end]));
            i = end;
        } else {
            i += 1;
        }
        run_start = i;
    }
    if run_start < bytes.len() {
        out.push(Fragment::Text(&text[run_start..]));
    }
    out
}

/// End offset of the escape sequence starting at `start`, if it is well formed.
fn escape_end(bytes: &[u8], start: usize) -> Option<usize> {
    let next = *bytes.get(start + 1)?;
    match next {
        b'[' => {
            let mut i = start + 2;
            while i < bytes.len() && (0x30..=0x3f).contains(&bytes[i]) {
                i += 1;
            }
            while i < bytes.len() && (0x20..=0x2f).contains(&bytes[i]) {
                i += 1;
            }
            match bytes.get(i) {
                Some(0x40..=0x7e) => Some(i + 1),
                _ => None,
            }
        }
        0x40..=0x5a | 0x5c..=0x5f => Some(start + 2),
        _ => None,
    }
}

/// True for SGR ("select graphic rendition") sequences such as `ESC[1;31m`.
pub fn is_sgr(escape: &str) -> bool {
    escape
        .strip_prefix("\x1b[")
        .and_then(|rest| rest.strip_suffix('m'))
        .is_some_and(|params| params.bytes().all(|b| b.is_ascii_digit() || b == b';'))
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Visible width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    fragments(text)
        .into_iter()
        .map(|fragment| match fragment {
            Fragment::Text(run) => run.chars().map(char_width).sum(),
            Fragment::Escape(_) => 0,
        })
        .sum()
}

/// Keep styling escapes, drop every other escape and control character, expand tabs.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for fragment in fragments(text) {
        match fragment {
            Fragment::Escape(escape) if is_sgr(escape) => out.push_str(escape),
            Fragment::Escape(_) => {}
            Fragment::Text(run) => {
                for ch in run.chars() {
                    match ch {
                        '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
                        '\n' => out.push('\n'),
                        ch if ch.is_control() => {}
                        ch => out.push(ch),
                    }
                }
            }
        }
    }
    out
}

/// Cut `text` to at most `max_width` columns.
///
/// Returns the truncated text and its visible width. Escape sequences before the cut are
/// preserved; a glyph that would straddle the limit is left out entirely.
pub fn truncate(text: &str, max_width: usize) -> (String, usize) {
    let mut out = String::with_capacity(text.len().min(max_width * 4));
    let mut width = 0;
    for fragment in fragments(text) {
        match fragment {
            Fragment::Escape(escape) => out.push_str(escape),
            Fragment::Text(run) => {
                for ch in run.chars() {
                    let w = char_width(ch);
                    if width + w > max_width {
                        return (out, width);
                    }
                    width += w;
                    out.push(ch);
                }
            }
        }
    }
    (out, width)
}

/// Truncate and pad with spaces to exactly `width` columns.
pub fn fit(text: &str, width: usize) -> String {
    let (mut out, used) = truncate(text, width);
    out.push_str(&" ".repeat(width - used));
    out
}

/// Break `text` into lines of at most `width` columns.
///
/// Explicit newlines always start a new line. Escape sequences stay attached to the line
/// on which they occur.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for source_line in text.split('\n') {
        let mut current = String::new();
        let mut used = 0;
        for fragment in fragments(source_line) {
            match fragment {
                Fragment::Escape(escape) => current.push_str(escape),
                Fragment::Text(run) => {
                    for ch in run.chars() {
                        let w = char_width(ch);
                        if used + w > width && used > 0 {
                            lines.push(std::mem::take(&mut current));
                            used = 0;
                        }
                        current.push(ch);
                        used += w;
                    }
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Split plain `text` into pieces flagged as inside or outside the given byte `spans`.
///
/// Spans may be unsorted or overlapping and may point past the end of `text`; offsets
/// that fall inside a multi-byte character are moved to the next character boundary.
pub fn split_spans<'a>(text: &'a str, spans: &[Range<usize>]) -> Vec<(&'a str, bool)> {
    let mut ranges: Vec<Range<usize>> = spans
        .iter()
        .map(|span| ceil_boundary(text, span.start)..ceil_boundary(text, span.end))
        .filter(|span| span.start < span.end)
        .collect();
    ranges.sort_by_key(|span| span.start);

    let mut pieces = Vec::new();
    let mut pos = 0;
    for span in ranges {
        let start = span.start.max(pos);
        if start >= span.end {
            continue;
        }
        if pos < start {
            pieces.push((&text[pos..start], false));
        }
        pieces.push((&text[start..span.end], true));
        pos = span.end;
    }
    if pos < text.len() {
        pieces.push((&text[pos..], false));
    }
    pieces
}

fn ceil_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}

/// Assembles one terminal line from styled pieces within a fixed column budget.
pub struct LineBuilder<'c> {
    caps: &'c CapabilitySet,
    budget: usize,
    used: usize,
    out: String,
}

impl<'c> LineBuilder<'c> {
    pub fn new(caps: &'c CapabilitySet, budget: usize) -> Self {
        Self {
            caps,
            budget,
            used: 0,
            out: String::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.budget - self.used
    }

    pub fn width(&self) -> usize {
        self.used
    }

    /// Append `text`, styled when `style` is given, cut to the remaining budget.
    pub fn push(&mut self, text: &str, style: Option<&Style>) -> &mut Self {
        let (piece, width) = truncate(text, self.remaining());
        if piece.is_empty() {
            return self;
        }
        match style {
            Some(style) => self.out.push_str(&self.caps.paint(style, &piece)),
            None => self.out.push_str(&piece),
        }
        self.used += width;
        self
    }

    /// Append text that already carries its own escapes, resetting attributes after it.
    pub fn push_styled_text(&mut self, text: &str) -> &mut Self {
        let (piece, width) = truncate(text, self.remaining());
        self.out.push_str(&piece);
        if piece.contains('\x1b') {
            self.out.push_str(self.caps.exit_style());
        }
        self.used += width;
        self
    }

    pub fn pad_to(&mut self, width: usize) -> &mut Self {
        let target = width.min(self.budget);
        if target > self.used {
            self.out.push_str(&" ".repeat(target - self.used));
            self.used = target;
        }
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ignores_escapes_and_counts_wide_glyphs() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("\x1b[31mred\x1b[0m"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("e\u{301}"), 1);
    }

    #[test]
    fn fragments_separate_escapes() {
        assert_eq!(
            fragments("a\x1b[1mb\x1bMc"),
            vec![
                Fragment::Text("a"),
                Fragment::Escape("\x1b[1m"),
                Fragment::Text("b"),
                Fragment::Escape("\x1bM"),
                Fragment::Text("c"),
            ]
        );
        // Unterminated CSI loses only the ESC byte.
        assert_eq!(
            fragments("x\x1b[12"),
            vec![Fragment::Text("x"), Fragment::Text("[12")]
        );
    }

    #[test]
    fn truncate_never_splits_glyphs_or_escapes() {
        assert_eq!(truncate("hello", 3), ("hel".to_string(), 3));
        assert_eq!(truncate("日本語", 5), ("日本".to_string(), 4));
        assert_eq!(
            truncate("\x1b[31mabcdef", 2),
            ("\x1b[31mab".to_string(), 2)
        );
        assert_eq!(truncate("abc", 0), (String::new(), 0));
    }

    #[test]
    fn truncate_is_idempotent() {
        let once = truncate("\x1b[1m日本語 text", 6).0;
        let twice = truncate(&once, 6).0;
        assert_eq!(once, twice);
    }

    #[test]
    fn fit_pads_to_width() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abcd");
    }

    #[test]
    fn sanitize_keeps_only_styling() {
        let raw = "\x1b[2J\x1b[32mok\x1b[0m\tend\x07";
        assert_eq!(sanitize(raw), "\x1b[32mok\x1b[0m    end");
        assert!(is_sgr("\x1b[1;31m"));
        assert!(is_sgr("\x1b[m"));
        assert!(!is_sgr("\x1b[2J"));
    }

    #[test]
    fn wrap_breaks_on_width_and_newlines() {
        assert_eq!(wrap("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap("ab\ncd", 4), vec!["ab", "cd"]);
        assert_eq!(wrap("日本語", 4), vec!["日本", "語"]);
        assert!(wrap("text", 0).is_empty());
    }

    #[test]
    fn split_spans_marks_matches() {
        assert_eq!(
            split_spans("banana", &[1..3, 3..5]),
            vec![("b", false), ("an", true), ("an", true), ("a", false)]
        );
        assert_eq!(split_spans("abc", &[]), vec![("abc", false)]);
        assert_eq!(
            split_spans("abc", &[1..10]),
            vec![("a", false), ("bc", true)]
        );
    }

    #[test]
    fn split_spans_respects_char_boundaries() {
        // "é" is two bytes; an offset of 1 lands inside it.
        assert_eq!(
            split_spans("éa", &[1..3]),
            vec![("é", false), ("a", true)]
        );
    }

    #[test]
    fn line_builder_applies_styles_within_budget() {
        let caps = CapabilitySet::ansi();
        let bold = Style::parse_list("bold").unwrap();
        let mut line = LineBuilder::new(&caps, 5);
        line.push("ab", None).push("cdef", Some(&bold));
        assert_eq!(line.width(), 5);
        assert_eq!(line.finish(), "ab\x1b[0m\x1b[1mcde\x1b[0m");
    }
}
