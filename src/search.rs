//! Entry filtering with regular expressions.
//!
//! Patterns are compiled with `grep-regex`, the same engine ripgrep uses. Matching is
//! done on the display text only; case folding affects matching, never the text shown.

use crate::entry::MenuEntry;
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use std::ops::Range;
use thiserror::Error;

/// A search pattern that failed to compile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid search pattern \"{pattern}\": {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    text: String,
    case_sensitive: bool,
    matcher: RegexMatcher,
}

impl SearchPattern {
    pub fn compile(text: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(!case_sensitive)
            .build(text)
            .map_err(|err| PatternError {
                pattern: text.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            text: text.to_string(),
            case_sensitive,
            matcher,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// An empty pattern matches everything and highlights nothing.
    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    /// Byte ranges of every non-empty match in `haystack`, or `None` if it does not match.
    pub fn find_spans(&self, haystack: &str) -> Option<Vec<Range<usize>>> {
        if !self.is_active() {
            return Some(Vec::new());
        }
        // RegexMatcher never fails at match time.
        if !self.matcher.is_match(haystack.as_bytes()).unwrap_or(false) {
            return None;
        }
        let mut spans = Vec::new();
        let _ = self.matcher.find_iter(haystack.as_bytes(), |m| {
            if m.start() < m.end() {
                spans.push(m.start()..m.end());
            }
            true
        });
        Some(spans)
    }
}

/// One entry of the filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredEntry {
    /// Position in the original entry list
    pub index: usize,
    /// Byte ranges of the display text to highlight
    pub spans: Vec<Range<usize>>,
}

/// Entries matching `pattern` in original order; empty-flagged entries never match.
pub fn filter(entries: &[MenuEntry], pattern: Option<&SearchPattern>) -> Vec<FilteredEntry> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_empty())
        .filter_map(|(index, entry)| {
            let spans = match pattern {
                Some(pattern) => pattern.find_spans(entry.text())?,
                None => Vec::new(),
            };
            Some(FilteredEntry { index, spans })
        })
        .collect()
}

/// Search text as typed plus the view it currently produces.
///
/// When the typed text does not compile, the last valid view stays in place and
/// [`SearchState::is_invalid`] reports the problem.
#[derive(Debug, Clone)]
pub struct SearchState {
    text: String,
    case_sensitive: bool,
    pattern: Option<SearchPattern>,
    invalid: Option<PatternError>,
    view: Vec<FilteredEntry>,
}

impl SearchState {
    pub fn new(entries: &[MenuEntry], case_sensitive: bool) -> Self {
        Self {
            text: String::new(),
            case_sensitive,
            pattern: None,
            invalid: None,
            view: filter(entries, None),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn view(&self) -> &[FilteredEntry] {
        &self.view
    }

    pub fn pattern(&self) -> Option<&SearchPattern> {
        self.pattern.as_ref()
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid.is_some()
    }

    pub fn error(&self) -> Option<&PatternError> {
        self.invalid.as_ref()
    }

    /// Replace the typed text and re-filter.
    pub fn set_text(&mut self, text: impl Into<String>, entries: &[MenuEntry]) {
        self.text = text.into();
        if self.text.is_empty() {
            self.pattern = None;
            self.invalid = None;
            self.view = filter(entries, None);
            return;
        }
        match SearchPattern::compile(&self.text, self.case_sensitive) {
            Ok(pattern) => {
                self.view = filter(entries, Some(&pattern));
                self.pattern = Some(pattern);
                self.invalid = None;
            }
            Err(err) => {
                log::debug!("keeping previous view: {}", err);
                self.invalid = Some(err);
            }
        }
    }

    pub fn push(&mut self, ch: char, entries: &[MenuEntry]) {
        let mut text = std::mem::take(&mut self.text);
        text.push(ch);
        self.set_text(text, entries);
    }

    /// Remove the last character; returns false when there was nothing to remove.
    pub fn pop(&mut self, entries: &[MenuEntry]) -> bool {
        let mut text = std::mem::take(&mut self.text);
        let removed = text.pop().is_some();
        self.set_text(text, entries);
        removed
    }

    pub fn clear(&mut self, entries: &[MenuEntry]) {
        self.set_text(String::new(), entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(texts: &[&str]) -> Vec<MenuEntry> {
        texts.iter().map(|text| MenuEntry::parse(text, true)).collect()
    }

    fn indices(view: &[FilteredEntry]) -> Vec<usize> {
        view.iter().map(|entry| entry.index).collect()
    }

    #[test]
    fn inactive_pattern_keeps_all_non_empty_entries() {
        let entries = entries(&["a", "", "b"]);
        assert_eq!(indices(&filter(&entries, None)), vec![0, 2]);

        let empty = SearchPattern::compile("", false).unwrap();
        assert!(!empty.is_active());
        assert_eq!(indices(&filter(&entries, Some(&empty))), vec![0, 2]);
    }

    #[test]
    fn filter_preserves_original_indices_and_order() {
        let entries = entries(&["apple", "banana", "cherry", "grape"]);
        let pattern = SearchPattern::compile("ap", false).unwrap();
        let view = filter(&entries, Some(&pattern));
        assert_eq!(indices(&view), vec![0, 3]);
        assert_eq!(view[1].spans, vec![2..4]);
    }

    #[test]
    fn reports_every_match() {
        let entries = entries(&["banana"]);
        let pattern = SearchPattern::compile("an", true).unwrap();
        assert_eq!(filter(&entries, Some(&pattern))[0].spans, vec![1..3, 3..5]);
    }

    #[test]
    fn case_folding_only_affects_matching() {
        let entries = entries(&["README.md", "notes"]);
        let insensitive = SearchPattern::compile("readme", false).unwrap();
        let view = filter(&entries, Some(&insensitive));
        assert_eq!(indices(&view), vec![0]);
        assert_eq!(entries[0].text(), "README.md");

        let sensitive = SearchPattern::compile("readme", true).unwrap();
        assert!(filter(&entries, Some(&sensitive)).is_empty());
    }

    #[test]
    fn invalid_pattern_keeps_previous_view() {
        let entries = entries(&["alpha", "beta", "[x] gamma"]);
        let mut state = SearchState::new(&entries, false);
        state.set_text("a", &entries);
        let before = state.view().to_vec();

        state.set_text("a[", &entries);
        assert!(state.is_invalid());
        assert_eq!(state.text(), "a[");
        assert_eq!(state.view(), before.as_slice());

        state.pop(&entries);
        assert!(!state.is_invalid());
    }

    #[test]
    fn pop_on_empty_text_reports_nothing_removed() {
        let entries = entries(&["one"]);
        let mut state = SearchState::new(&entries, false);
        assert!(!state.pop(&entries));
        state.push('o', &entries);
        assert!(state.pop(&entries));
        assert_eq!(state.view().len(), 1);
    }
}
