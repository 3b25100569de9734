//! Style theme for the menu's visual elements.
//!
//! Every element is a [`Style`] resolved against the terminal's capabilities at draw
//! time, so a theme can be shared between color and monochrome terminals.

use crate::error::Result;
use crate::style::Style;

/// Styles for each visual element of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTheme {
    /// Cursor glyph in front of the highlighted entry
    pub cursor: Style,
    /// The highlighted entry line
    pub highlight: Style,
    /// Search matches inside entries
    pub search_highlight: Style,
    /// Shortcut key inside `[k]`
    pub shortcut_key: Style,
    /// The brackets around a shortcut key
    pub shortcut_brackets: Style,
    pub status_bar: Style,
    /// Marker glyph of a selected entry in multi-select mode
    pub multi_select_cursor: Style,
    /// The brackets of the multi-select marker
    pub multi_select_cursor_brackets: Style,
}

impl Default for MenuTheme {
    fn default() -> Self {
        Self {
            cursor: style("fg_red,bold"),
            highlight: style("standout"),
            search_highlight: style("fg_black,bg_yellow,bold"),
            shortcut_key: style("fg_blue"),
            shortcut_brackets: style("fg_gray"),
            status_bar: style("fg_yellow,bg_black"),
            multi_select_cursor: style("fg_yellow,bold"),
            multi_select_cursor_brackets: style("fg_gray"),
        }
    }
}

impl MenuTheme {
    /// A theme using only decorations, for terminals without color.
    pub fn monochrome() -> Self {
        Self {
            cursor: style("bold"),
            highlight: style("standout"),
            search_highlight: style("underline,bold"),
            shortcut_key: style("bold"),
            shortcut_brackets: Style::plain(),
            status_bar: style("standout"),
            multi_select_cursor: style("bold"),
            multi_select_cursor_brackets: Style::plain(),
        }
    }

    /// Look up a theme element by its configuration name.
    pub fn element_mut(&mut self, name: &str) -> Option<&mut Style> {
        let element = match name {
            "cursor" => &mut self.cursor,
            "highlight" => &mut self.highlight,
            "search_highlight" => &mut self.search_highlight,
            "shortcut_key" => &mut self.shortcut_key,
            "shortcut_brackets" => &mut self.shortcut_brackets,
            "status_bar" => &mut self.status_bar,
            "multi_select_cursor" => &mut self.multi_select_cursor,
            "multi_select_cursor_brackets" => &mut self.multi_select_cursor_brackets,
            _ => return None,
        };
        Some(element)
    }

    /// Replace the element called `name` with the parsed style list.
    pub fn set(&mut self, name: &str, list: &str) -> Result<()> {
        let parsed = Style::parse_list(list)?;
        match self.element_mut(name) {
            Some(element) => {
                *element = parsed;
                Ok(())
            }
            None => Err(crate::error::MenuError::config(format!(
                "unknown theme element \"{}\"",
                name
            ))),
        }
    }
}

fn style(list: &str) -> Style {
    // The lists above are literals made of known tag names.
    Style::parse_list(list).unwrap_or_default()
}
