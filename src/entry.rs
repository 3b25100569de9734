//! Menu entries and the raw entry syntax.
//!
//! A raw entry string may carry a shortcut prefix and a data payload:
//!
//! ```text
//! [k] display text|preview data
//! ```
//!
//! An unescaped `|` separates display text from data (`\|` is a literal bar), and a
//! trailing bare `|` declares an empty payload that disables the preview for that entry.

/// One selectable menu line. Its position in the menu's entry list is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    text: String,
    data: Option<String>,
    shortcut: Option<char>,
    empty: bool,
}

impl MenuEntry {
    /// Parse a raw entry string.
    ///
    /// With `skip_empty` set, entries whose display text is blank are flagged empty and
    /// will never be shown under the cursor or selected.
    pub fn parse(raw: &str, skip_empty: bool) -> Self {
        let (display, data) = split_data(raw);
        let (shortcut, text) = split_shortcut(&display);
        let empty = skip_empty && text.trim().is_empty();
        Self {
            text,
            data,
            shortcut,
            empty,
        }
    }

    /// Build an entry without interpreting any syntax.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
            shortcut: None,
            empty: false,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn shortcut(&self) -> Option<char> {
        self.shortcut
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The argument handed to the preview source, if this entry has a preview at all.
    pub fn preview_argument(&self) -> Option<&str> {
        match self.data.as_deref() {
            Some("") => None,
            Some(data) => Some(data),
            None if self.empty => None,
            None => Some(&self.text),
        }
    }
}

fn split_data(raw: &str) -> (String, Option<String>) {
    let mut parts: Vec<String> = vec![String::new()];
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        let current = parts.len() - 1;
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                parts[current].push('|');
            }
            // A bar in the very first position is display text, not a separator.
            '|' if !(current == 0 && parts[0].is_empty()) => parts.push(String::new()),
            _ => parts[current].push(ch),
        }
    }
    let mut parts = parts.into_iter();
    let display = parts.next().unwrap_or_default();
    (display, parts.next())
}

fn split_shortcut(display: &str) -> (Option<char>, String) {
    let mut chars = display.chars();
    if chars.next() == Some('[') {
        if let (Some(key), Some(']')) = (chars.next(), chars.next()) {
            if !key.is_whitespace() {
                let rest = chars.as_str().trim_start();
                if !rest.is_empty() {
                    return (Some(key), rest.to_string());
                }
            }
        }
    }
    (None, display.to_string())
}
