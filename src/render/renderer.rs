//! Menu state to [`Frame`] rendering.
//!
//! Rendering is a pure function of its inputs: the same state, capabilities and terminal
//! size always yield the same frame. Rows are laid out top to bottom as title, entries,
//! search line, status bar and preview pane (the status bar may move below the preview).

use super::frame::Frame;
use super::theme::MenuTheme;
use crate::capability::CapabilitySet;
use crate::config::{HintPlacement, MenuConfig, SearchKey, StatusBar};
use crate::entry::MenuEntry;
use crate::input::KeyEvent;
use crate::layout::{self, LineBuilder};
use crate::preview::PreviewContent;
use crate::search::{FilteredEntry, SearchState};
use crate::selection::SelectionModel;
use crate::style::Style;

/// Smallest preview pane, borders included.
pub const MIN_PREVIEW_ROWS: usize = 3;
/// Entry rows kept visible when a preview pane is shown.
pub const MIN_ENTRY_ROWS: usize = 3;

const INVALID_PATTERN_MARK: &str = " (invalid pattern)";
const SEARCH_HINT: &str = "(Press {key} to search)";
const ANY_LETTER_SEARCH_HINT: &str = "(Press any letter key to search)";
const MULTI_SELECT_HINT: &str =
    "Press {multi_select_keys} for multi-selection and {accept_keys} to accept";

/// State of the preview pane for the highlighted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPane<'a> {
    /// No preview for this entry (or none configured)
    Hidden,
    /// A request is in flight
    Loading,
    Ready(&'a PreviewContent),
}

/// Everything that changes between frames.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub entries: &'a [MenuEntry],
    pub search: &'a SearchState,
    pub selection: &'a SelectionModel,
    /// True while the user is typing a search pattern
    pub searching: bool,
    pub preview: PreviewPane<'a>,
    /// Terminal size as (columns, rows)
    pub size: (u16, u16),
}

impl<'a> RenderInput<'a> {
    fn view(&self) -> &'a [FilteredEntry] {
        self.search.view()
    }

    fn current_entry(&self) -> Option<&'a MenuEntry> {
        self.selection
            .current_index(self.view())
            .map(|index| &self.entries[index])
    }
}

/// Row budget of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutMetrics {
    pub title_rows: usize,
    /// Height of the scrolled entry viewport
    pub entry_rows: usize,
    pub search_rows: usize,
    pub status_rows: usize,
    /// Rows reserved for the preview pane (0 when hidden)
    pub preview_rows: usize,
}

impl LayoutMetrics {
    pub fn total(&self) -> usize {
        self.title_rows + self.entry_rows + self.search_rows + self.status_rows + self.preview_rows
    }

    /// Drop status, title and search rows, in that order, until the frame fits `height`.
    ///
    /// One entry row always survives.
    fn fit_height(&mut self, height: usize) {
        let mut excess = self.total().saturating_sub(height.max(1));
        for rows in [
            &mut self.status_rows,
            &mut self.title_rows,
            &mut self.search_rows,
        ] {
            let cut = excess.min(*rows);
            *rows -= cut;
            excess -= cut;
        }
    }
}

/// Configuration-derived, immutable part of rendering.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: MenuTheme,
    cursor: String,
    multi_select_cursor: Option<String>,
    title_lines: Vec<String>,
    /// Shortcut hints shown in the status bar rather than the title
    status_hints: Option<String>,
    multi_select_hint: Option<String>,
    status_bar: Option<StatusBar>,
    status_bar_below_preview: bool,
    search_key: SearchKey,
    show_search_hint: bool,
    search_hint: String,
    shortcut_column: bool,
    preview_size: f64,
    preview_title: String,
    preview_border: bool,
    displayable: usize,
}

fn key_names(keys: &[KeyEvent]) -> String {
    keys.iter()
        .map(|key| format!("\"{}\"", key))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Renderer {
    pub fn new(config: &MenuConfig, entries: &[MenuEntry]) -> Self {
        let shortcut_hints = entries
            .iter()
            .filter_map(|entry| {
                entry
                    .shortcut()
                    .map(|key| format!("[{}]: {}", key, entry.text()))
            })
            .collect::<Vec<_>>();
        let hint_line = (config.show_shortcut_hints && !shortcut_hints.is_empty())
            .then(|| format!("({})", shortcut_hints.join(", ")));

        let mut title_lines: Vec<String> = config
            .title
            .as_deref()
            .map(|title| title.split('\n').map(str::to_string).collect())
            .unwrap_or_default();
        let mut status_hints = None;
        match (hint_line, config.shortcut_hint_placement) {
            (Some(line), HintPlacement::Title) => title_lines.push(line),
            (Some(line), HintPlacement::StatusBar) => status_hints = Some(line),
            (None, _) => {}
        }

        let multi_select_hint = (config.multi_select && config.show_multi_select_hint).then(|| {
            config
                .multi_select_hint_text
                .as_deref()
                .unwrap_or(MULTI_SELECT_HINT)
                .replace("{multi_select_keys}", &key_names(&config.multi_select_keys))
                .replace("{accept_keys}", &key_names(&config.accept_keys))
        });
        let search_hint = match config.search_key {
            SearchKey::Key(key) => config
                .search_hint_text
                .as_deref()
                .unwrap_or(SEARCH_HINT)
                .replace("{key}", &format!("\"{}\"", key)),
            SearchKey::AnyLetter => config
                .search_hint_text
                .clone()
                .unwrap_or_else(|| ANY_LETTER_SEARCH_HINT.to_string()),
        };

        Self {
            theme: config.theme.clone(),
            cursor: config.cursor.clone(),
            multi_select_cursor: config
                .multi_select
                .then(|| config.multi_select_cursor.clone()),
            title_lines,
            status_hints,
            multi_select_hint,
            status_bar: config.status_bar.clone(),
            status_bar_below_preview: config.status_bar_below_preview,
            search_key: config.search_key,
            show_search_hint: config.show_search_hint,
            search_hint,
            shortcut_column: entries.iter().any(|entry| entry.shortcut().is_some()),
            preview_size: config.preview_size,
            preview_title: config.preview_title.clone(),
            preview_border: config.preview_border,
            displayable: entries.iter().filter(|entry| !entry.is_empty()).count(),
        }
    }

    /// Replace the configured theme, e.g. with a monochrome one.
    pub fn with_theme(mut self, theme: MenuTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Status bar text for the highlighted entry, hints included.
    fn status_text(&self, input: &RenderInput<'_>) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(status_bar) = &self.status_bar {
            let text = status_bar.text(input.current_entry().map(MenuEntry::text));
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.extend(self.status_hints.clone());
        parts.extend(self.multi_select_hint.clone());
        (!parts.is_empty()).then(|| parts.join("\n"))
    }

    fn status_lines(&self, input: &RenderInput<'_>, width: usize) -> Vec<String> {
        self.status_text(input)
            .map(|text| layout::wrap(&layout::sanitize(&text), width))
            .unwrap_or_default()
    }

    fn preview_lines(content: &PreviewContent) -> Vec<String> {
        layout::sanitize(&content.display_text())
            .split('\n')
            .map(str::to_string)
            .collect()
    }

    /// Compute the row budget for `input`.
    pub fn layout(&self, input: &RenderInput<'_>) -> LayoutMetrics {
        let (width, height) = (input.size.0 as usize, input.size.1 as usize);
        let title_rows = self.title_lines.len();
        let search_rows = usize::from(input.searching || self.show_search_hint);
        let status_rows = self.status_lines(input, width.max(1)).len();
        let fixed = title_rows + search_rows + status_rows;
        let available = height.saturating_sub(fixed);

        let mut preview_rows = match input.preview {
            PreviewPane::Hidden => 0,
            pane => {
                let reserved = (height as f64 * self.preview_size).floor() as usize;
                let reserved = reserved.min(available.saturating_sub(MIN_ENTRY_ROWS));
                if reserved < MIN_PREVIEW_ROWS {
                    0
                } else {
                    let border = if self.preview_border { 2 } else { 0 };
                    let wanted = match pane {
                        PreviewPane::Ready(content) => Self::preview_lines(content).len() + border,
                        _ => border.max(1),
                    };
                    wanted.min(reserved)
                }
            }
        };
        let entry_rows = available
            .saturating_sub(preview_rows)
            .min(self.displayable)
            .max(1);
        if entry_rows + preview_rows > available {
            preview_rows = 0;
        }

        let mut metrics = LayoutMetrics {
            title_rows,
            entry_rows,
            search_rows,
            status_rows,
            preview_rows,
        };
        metrics.fit_height(height);
        metrics
    }

    /// Render one frame.
    pub fn render(&self, input: &RenderInput<'_>, caps: &CapabilitySet) -> Frame {
        let metrics = self.layout(input);
        let width = input.size.0 as usize;
        let mut lines = Vec::with_capacity(metrics.total());

        for title in self.title_lines.iter().take(metrics.title_rows) {
            let mut line = LineBuilder::new(caps, width);
            line.push(title, None);
            lines.push(line.finish());
        }

        let view = input.view();
        let offset = input.selection.offset();
        let cursor = input.selection.cursor();
        let mut cursor_row = lines.len();
        for row in 0..metrics.entry_rows {
            let position = offset + row;
            let text = match view.get(position) {
                Some(item) => {
                    let highlighted = cursor == Some(position);
                    if highlighted {
                        cursor_row = lines.len();
                    }
                    self.entry_line(input, item, highlighted, caps, width)
                }
                None => String::new(),
            };
            lines.push(text);
        }

        if metrics.search_rows > 0 {
            lines.push(self.search_line(input, caps, width));
        }

        let status: Vec<String> = self
            .status_lines(input, width.max(1))
            .iter()
            .take(metrics.status_rows)
            .map(|text| {
                let mut line = LineBuilder::new(caps, width);
                line.push(&layout::fit(text, width), Some(&self.theme.status_bar));
                line.finish()
            })
            .collect();
        let preview = self.preview_block(input, metrics.preview_rows, caps, width);

        if self.status_bar_below_preview {
            lines.extend(preview);
            lines.extend(status);
        } else {
            lines.extend(status);
            lines.extend(preview);
        }

        Frame::new(lines, cursor_row)
    }

    fn entry_line(
        &self,
        input: &RenderInput<'_>,
        item: &FilteredEntry,
        highlighted: bool,
        caps: &CapabilitySet,
        width: usize,
    ) -> String {
        let entry = &input.entries[item.index];
        let mut line = LineBuilder::new(caps, width);

        if highlighted {
            line.push(&self.cursor, Some(&self.theme.cursor));
        } else {
            line.push(&" ".repeat(layout::display_width(&self.cursor)), None);
        }

        if let Some(marker) = &self.multi_select_cursor {
            if input.selection.is_selected(item.index) {
                self.push_marker(&mut line, marker);
            } else {
                line.push(&" ".repeat(layout::display_width(marker)), None);
            }
        }

        if self.shortcut_column {
            match entry.shortcut() {
                Some(key) => {
                    line.push("[", Some(&self.theme.shortcut_brackets))
                        .push(&key.to_string(), Some(&self.theme.shortcut_key))
                        .push("]", Some(&self.theme.shortcut_brackets))
                        .push(" ", None);
                }
                None => {
                    line.push("    ", None);
                }
            }
        }

        let base = highlighted.then_some(&self.theme.highlight);
        let matched = match base {
            Some(base) => base.then(&self.theme.search_highlight),
            None => self.theme.search_highlight.clone(),
        };
        // Spans index the raw text, so each piece is cleaned up on its own.
        for (piece, is_match) in layout::split_spans(entry.text(), &item.spans) {
            let style: Option<&Style> = if is_match { Some(&matched) } else { base };
            line.push(&layout::sanitize(piece).replace('\n', " "), style);
        }
        line.finish()
    }

    /// Draw the multi-select marker, styling bracket characters separately.
    fn push_marker(&self, line: &mut LineBuilder<'_>, marker: &str) {
        for ch in marker.chars() {
            let style = match ch {
                '[' | ']' | '(' | ')' | '{' | '}' | '<' | '>' => {
                    &self.theme.multi_select_cursor_brackets
                }
                _ => &self.theme.multi_select_cursor,
            };
            line.push(&ch.to_string(), Some(style));
        }
    }

    fn search_line(&self, input: &RenderInput<'_>, caps: &CapabilitySet, width: usize) -> String {
        let mut line = LineBuilder::new(caps, width);
        if input.searching {
            let prefix = match self.search_key {
                SearchKey::Key(key) => key.printable().unwrap_or('/'),
                SearchKey::AnyLetter => '/',
            };
            line.push(&format!("{}{}", prefix, input.search.text()), None);
            if input.search.is_invalid() {
                line.push(INVALID_PATTERN_MARK, Some(&self.theme.cursor));
            }
        } else {
            line.push(&self.search_hint, None);
        }
        line.finish()
    }

    fn preview_block(
        &self,
        input: &RenderInput<'_>,
        rows: usize,
        caps: &CapabilitySet,
        width: usize,
    ) -> Vec<String> {
        if rows == 0 {
            return Vec::new();
        }
        let content = match input.preview {
            PreviewPane::Ready(content) => Self::preview_lines(content),
            _ => Vec::new(),
        };

        if !self.preview_border {
            return (0..rows)
                .map(|row| {
                    let mut line = LineBuilder::new(caps, width);
                    if let Some(text) = content.get(row) {
                        line.push_styled_text(text);
                    }
                    line.finish()
                })
                .collect();
        }

        let chars = caps.box_chars();
        let inner = width.saturating_sub(2);
        let horizontal = chars.horizontal.to_string();
        let mut top = format!("{}{}", horizontal, horizontal);
        if !self.preview_title.is_empty() {
            top.push(' ');
            top.push_str(&self.preview_title);
            top.push(' ');
        }
        let mut block = Vec::with_capacity(rows);
        block.push(
            layout::truncate(
                &format!(
                    "{}{}{}",
                    chars.upper_left,
                    layout::fit(&format!("{}{}", top, horizontal.repeat(inner)), inner),
                    chars.upper_right
                ),
                width,
            )
            .0,
        );

        let text_width = width.saturating_sub(4);
        for row in 0..rows.saturating_sub(2) {
            let mut line = LineBuilder::new(caps, width);
            line.push(&format!("{} ", chars.vertical), None);
            if let Some(text) = content.get(row) {
                line.push_styled_text(&layout::truncate(text, text_width).0);
            }
            line.pad_to(width.saturating_sub(2));
            line.push(&format!(" {}", chars.vertical), None);
            block.push(line.finish());
        }

        if rows >= 2 {
            block.push(
                layout::truncate(
                    &format!(
                        "{}{}{}",
                        chars.lower_left,
                        horizontal.repeat(inner),
                        chars.lower_right
                    ),
                    width,
                )
                .0,
            );
        }
        block
    }
}
