//! Cursor, scroll offset and multi-select bookkeeping.
//!
//! The cursor addresses a position in the current filtered view. Original entry indices
//! only appear at the edges: the multi-select set stores them, and [`SelectionModel::accept`]
//! returns them.

use crate::entry::MenuEntry;
use crate::error::{MenuError, Result};
use crate::search::FilteredEntry;
use std::collections::BTreeSet;

/// What an accept produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(usize),
    /// Sorted original indices
    Multiple(Vec<usize>),
}

/// Entry to preselect in multi-select mode, by position or by display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preselect {
    Index(usize),
    Text(String),
}

impl Preselect {
    /// Interpret a command line value: numbers are indices, anything else is text.
    pub fn from_arg(value: &str) -> Self {
        match value.parse::<usize>() {
            Ok(index) => Preselect::Index(index),
            Err(_) => Preselect::Text(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOptions {
    pub cycle: bool,
    pub multi_select: bool,
    /// Add the entry under the cursor to the selection on accept
    pub select_on_accept: bool,
    /// Allow a multi-select accept that returns no entries
    pub allow_empty: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            cycle: true,
            multi_select: false,
            select_on_accept: true,
            allow_empty: false,
        }
    }
}

/// Mutable selection state owned by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Position in the filtered view; `None` when the view is empty
    pub cursor: Option<usize>,
    /// First view position shown in the viewport
    pub offset: usize,
    pub selected: BTreeSet<usize>,
}

#[derive(Debug, Clone)]
pub struct SelectionModel {
    options: SelectionOptions,
    state: SelectionState,
}

impl SelectionModel {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            options,
            state: SelectionState::default(),
        }
    }

    /// Resolve the initial cursor and preselected entries against the full view.
    ///
    /// `initial_index` and `preselected` refer to original entry indices; both must name
    /// displayable entries.
    pub fn initialize(
        &mut self,
        entries: &[MenuEntry],
        view: &[FilteredEntry],
        initial_index: Option<usize>,
        preselected: &[Preselect],
    ) -> Result<()> {
        if !preselected.is_empty() && !self.options.multi_select {
            return Err(MenuError::config(
                "preselected entries require multi-select mode",
            ));
        }

        self.state.cursor = match initial_index {
            None => (!view.is_empty()).then_some(0),
            Some(index) => Some(position_of(view, index).ok_or_else(|| {
                MenuError::config(format!(
                    "cursor index {} does not name a displayable entry",
                    index
                ))
            })?),
        };

        for wanted in preselected {
            let index = match wanted {
                Preselect::Index(index) => *index,
                Preselect::Text(text) => entries
                    .iter()
                    .position(|entry| entry.text() == text)
                    .ok_or_else(|| {
                        MenuError::config(format!("no entry with the text \"{}\"", text))
                    })?,
            };
            if position_of(view, index).is_none() {
                return Err(MenuError::config(format!(
                    "preselected index {} does not name a displayable entry",
                    index
                )));
            }
            self.state.selected.insert(index);
        }
        Ok(())
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.cursor
    }

    pub fn offset(&self) -> usize {
        self.state.offset
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.state.selected.contains(&index)
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.state.selected
    }

    /// Original index of the entry under the cursor.
    pub fn current_index(&self, view: &[FilteredEntry]) -> Option<usize> {
        self.state
            .cursor
            .and_then(|position| view.get(position))
            .map(|entry| entry.index)
    }

    pub fn move_up(&mut self, len: usize) {
        if let Some(cursor) = self.state.cursor {
            self.state.cursor = Some(match cursor {
                0 if self.options.cycle => len.saturating_sub(1),
                0 => 0,
                n => n - 1,
            });
        }
    }

    pub fn move_down(&mut self, len: usize) {
        if let Some(cursor) = self.state.cursor {
            self.state.cursor = Some(if cursor + 1 < len {
                cursor + 1
            } else if self.options.cycle {
                0
            } else {
                cursor
            });
        }
    }

    pub fn page_up(&mut self, page: usize) {
        if let Some(cursor) = self.state.cursor {
            self.state.cursor = Some(cursor.saturating_sub(page.max(1)));
        }
    }

    pub fn page_down(&mut self, len: usize, page: usize) {
        if let Some(cursor) = self.state.cursor {
            let last = len.saturating_sub(1);
            self.state.cursor = Some((cursor + page.max(1)).min(last));
        }
    }

    pub fn home(&mut self) {
        if self.state.cursor.is_some() {
            self.state.cursor = Some(0);
        }
    }

    pub fn end(&mut self, len: usize) {
        if self.state.cursor.is_some() {
            self.state.cursor = Some(len.saturating_sub(1));
        }
    }

    /// Flip multi-select membership of the entry under the cursor.
    pub fn toggle(&mut self, view: &[FilteredEntry]) {
        if let Some(index) = self.current_index(view) {
            if !self.state.selected.remove(&index) {
                self.state.selected.insert(index);
            }
        }
    }

    /// Produce the result of an accept, or `None` when there is nothing to accept.
    pub fn accept(&mut self, view: &[FilteredEntry]) -> Option<Selection> {
        let current = self.current_index(view);
        if !self.options.multi_select {
            return current.map(Selection::Single);
        }

        if self.options.select_on_accept {
            if let Some(index) = current {
                self.state.selected.insert(index);
            }
        }
        if self.state.selected.is_empty() && !self.options.allow_empty {
            let index = current?;
            self.state.selected.insert(index);
        }
        Some(Selection::Multiple(
            self.state.selected.iter().copied().collect(),
        ))
    }

    /// Move the cursor to the entry declaring `key` as its shortcut.
    pub fn jump_to_shortcut(
        &mut self,
        entries: &[MenuEntry],
        view: &[FilteredEntry],
        key: char,
    ) -> Option<usize> {
        let position = view
            .iter()
            .position(|item| entries[item.index].shortcut() == Some(key))?;
        self.state.cursor = Some(position);
        Some(view[position].index)
    }

    /// Re-anchor the cursor after the view changed.
    ///
    /// The cursor stays on `previous` (an original index) when it is still in the view and
    /// falls back to the first entry otherwise.
    pub fn reconcile(&mut self, previous: Option<usize>, view: &[FilteredEntry]) {
        self.state.cursor = if view.is_empty() {
            None
        } else {
            Some(
                previous
                    .and_then(|index| position_of(view, index))
                    .unwrap_or(0),
            )
        };
        if view.is_empty() {
            self.state.offset = 0;
        }
    }

    /// Adjust the scroll offset so the cursor row lies inside a viewport of `height` rows.
    pub fn keep_visible(&mut self, len: usize, height: usize) {
        let height = height.max(1);
        let max_offset = len.saturating_sub(height);
        let mut offset = self.state.offset.min(max_offset);
        if let Some(cursor) = self.state.cursor {
            if cursor < offset {
                offset = cursor;
            } else if cursor >= offset + height {
                offset = cursor + 1 - height;
            }
        }
        self.state.offset = offset;
    }
}

fn position_of(view: &[FilteredEntry], index: usize) -> Option<usize> {
    view.iter().position(|entry| entry.index == index)
}
