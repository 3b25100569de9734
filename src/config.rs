//! Menu configuration.
//!
//! [`MenuConfig`] is a plain struct with public fields; start from `MenuConfig::default()`
//! and override what you need. Validation happens in `TerminalMenu::new`, before the
//! terminal is touched.
//!
//! With the `config` feature enabled, [`file::FileConfig`] reads style and key defaults
//! from `$XDG_CONFIG_HOME/termmenu/config.toml`.

use crate::capability::CapabilityProfile;
use crate::error::{MenuError, Result};
use crate::input::KeyEvent;
use crate::preview::PreviewSource;
use crate::render::MenuTheme;
use crate::selection::Preselect;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default wait for the rest of an escape sequence after a lone ESC byte.
pub const DEFAULT_ESCAPE_TIMEOUT_MS: u64 = 25;
pub const DEFAULT_PREVIEW_SIZE: f64 = 0.25;
pub const DEFAULT_CURSOR: &str = "> ";
pub const DEFAULT_MULTI_SELECT_CURSOR: &str = "[*] ";

/// How search mode is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    /// A dedicated key starts an empty search
    Key(KeyEvent),
    /// Any letter starts a search with that letter; letter bindings and shortcuts are off
    AnyLetter,
}

/// Status bar content.
#[derive(Clone)]
pub enum StatusBar {
    /// Fixed text; may contain newlines
    Static(String),
    /// Text computed from the highlighted entry's display text
    Computed(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl StatusBar {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        StatusBar::Computed(Arc::new(f))
    }

    /// The text to show while `entry` is highlighted.
    pub fn text(&self, entry: Option<&str>) -> String {
        match self {
            StatusBar::Static(text) => text.clone(),
            StatusBar::Computed(f) => entry.map(|entry| f(entry)).unwrap_or_default(),
        }
    }
}

impl fmt::Debug for StatusBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusBar::Static(text) => f.debug_tuple("Static").field(text).finish(),
            StatusBar::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Where shortcut hints are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HintPlacement {
    #[default]
    Title,
    StatusBar,
}

/// Everything that shapes a menu's look and behavior.
#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// Title lines above the entries; may contain newlines
    pub title: Option<String>,
    pub theme: MenuTheme,
    /// Glyph in front of the highlighted entry
    pub cursor: String,
    /// Marker in front of selected entries in multi-select mode
    pub multi_select_cursor: String,
    /// Wrap around at the ends of the list
    pub cycle_cursor: bool,
    /// Clear the screen before the menu is shown and after it exits
    pub clear_screen: bool,
    pub clear_menu_on_exit: bool,
    /// Original index of the entry the cursor starts on
    pub cursor_index: Option<usize>,
    pub accept_keys: Vec<KeyEvent>,
    pub quit_keys: Vec<KeyEvent>,
    pub multi_select_keys: Vec<KeyEvent>,
    pub search_key: SearchKey,
    pub search_case_sensitive: bool,
    pub show_search_hint: bool,
    /// Custom search hint; `{key}` is replaced by the search key
    pub search_hint_text: Option<String>,
    pub show_shortcut_hints: bool,
    pub shortcut_hint_placement: HintPlacement,
    /// Accept immediately when a shortcut key is pressed
    pub exit_on_shortcut: bool,
    pub preview: Option<PreviewSource>,
    /// Fraction of the terminal height reserved for the preview pane
    pub preview_size: f64,
    pub preview_title: String,
    pub preview_border: bool,
    pub multi_select: bool,
    pub multi_select_select_on_accept: bool,
    pub multi_select_empty_ok: bool,
    pub show_multi_select_hint: bool,
    /// Custom multi-select hint with `{multi_select_keys}` and `{accept_keys}` placeholders
    pub multi_select_hint_text: Option<String>,
    pub preselected_entries: Vec<Preselect>,
    pub skip_empty_entries: bool,
    pub status_bar: Option<StatusBar>,
    pub status_bar_below_preview: bool,
    /// Report ctrl-c as `MenuError::Interrupted` instead of a cancellation
    pub raise_on_interrupt: bool,
    pub escape_timeout: Duration,
    /// Terminal facts to use instead of the environment
    pub capability_profile: Option<CapabilityProfile>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: None,
            theme: MenuTheme::default(),
            cursor: DEFAULT_CURSOR.to_string(),
            multi_select_cursor: DEFAULT_MULTI_SELECT_CURSOR.to_string(),
            cycle_cursor: true,
            clear_screen: false,
            clear_menu_on_exit: true,
            cursor_index: None,
            accept_keys: vec![KeyEvent::ENTER],
            quit_keys: vec![KeyEvent::ESCAPE, KeyEvent::Char('q')],
            multi_select_keys: vec![
                KeyEvent::Named(crate::input::NamedKey::Space),
                KeyEvent::Named(crate::input::NamedKey::Tab),
            ],
            search_key: SearchKey::Key(KeyEvent::Char('/')),
            search_case_sensitive: false,
            show_search_hint: false,
            search_hint_text: None,
            show_shortcut_hints: false,
            shortcut_hint_placement: HintPlacement::Title,
            exit_on_shortcut: true,
            preview: None,
            preview_size: DEFAULT_PREVIEW_SIZE,
            preview_title: "preview".to_string(),
            preview_border: true,
            multi_select: false,
            multi_select_select_on_accept: true,
            multi_select_empty_ok: false,
            show_multi_select_hint: false,
            multi_select_hint_text: None,
            preselected_entries: Vec::new(),
            skip_empty_entries: false,
            status_bar: None,
            status_bar_below_preview: false,
            raise_on_interrupt: false,
            escape_timeout: Duration::from_millis(DEFAULT_ESCAPE_TIMEOUT_MS),
            capability_profile: None,
        }
    }
}

impl MenuConfig {
    /// Check values that do not depend on the entry list.
    pub fn validate(&self) -> Result<()> {
        if !(self.preview_size > 0.0 && self.preview_size <= 1.0) {
            return Err(MenuError::config(format!(
                "preview size must be in (0, 1], got {}",
                self.preview_size
            )));
        }
        if self.accept_keys.is_empty() {
            return Err(MenuError::config("at least one accept key is required"));
        }
        if self.multi_select && self.multi_select_keys.is_empty() {
            return Err(MenuError::config(
                "multi-select mode needs at least one multi-select key",
            ));
        }
        if !self.preselected_entries.is_empty() && !self.multi_select {
            return Err(MenuError::config(
                "preselected entries require multi-select mode",
            ));
        }
        Ok(())
    }

    /// Parse a comma separated key list, mapping failures to a configuration error.
    pub fn parse_keys(list: &str) -> Result<Vec<KeyEvent>> {
        KeyEvent::parse_list(list).map_err(|err| MenuError::InvalidKey { key: err.0 })
    }

    /// Interpret a search key setting; `None` means "activate on any letter".
    pub fn parse_search_key(name: Option<&str>) -> Result<SearchKey> {
        match name {
            None => Ok(SearchKey::AnyLetter),
            Some(name) => name
                .parse()
                .map(SearchKey::Key)
                .map_err(|_| MenuError::InvalidKey {
                    key: name.to_string(),
                }),
        }
    }
}

#[cfg(feature = "config")]
pub mod file {
    //! Optional configuration file support.

    use super::MenuConfig;
    use crate::error::{MenuError, Result};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    const APPLICATION: &str = "termmenu";
    const CONFIG_DIR_ENV: &str = "TERMMENU_CONFIG_DIR";

    /// Values read from `config.toml`; every field is optional.
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct FileConfig {
        pub cursor: Option<String>,
        pub multi_select_cursor: Option<String>,
        pub accept_keys: Option<String>,
        pub quit_keys: Option<String>,
        pub multi_select_keys: Option<String>,
        pub search_key: Option<String>,
        pub search_case_sensitive: Option<bool>,
        pub cycle_cursor: Option<bool>,
        pub preview_size: Option<f64>,
        pub escape_timeout_ms: Option<u64>,
        /// Theme element name to comma separated style list
        pub styles: HashMap<String, String>,
    }

    impl FileConfig {
        /// Default location of the configuration file.
        pub fn path() -> Option<PathBuf> {
            if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
                return Some(PathBuf::from(dir).join("config.toml"));
            }
            dirs::config_dir().map(|dir| dir.join(APPLICATION).join("config.toml"))
        }

        /// Load the file at the default location; a missing file is not an error.
        pub fn load() -> Result<Option<Self>> {
            match Self::path() {
                Some(path) if path.exists() => Self::load_from(&path).map(Some),
                _ => Ok(None),
            }
        }

        pub fn load_from(path: &Path) -> Result<Self> {
            let text = std::fs::read_to_string(path)
                .map_err(|err| MenuError::io(format!("reading {}", path.display()), err))?;
            toml::from_str(&text)
                .map_err(|err| MenuError::config(format!("{}: {}", path.display(), err)))
        }

        /// Override fields of `config` with the values present in this file.
        pub fn apply(&self, config: &mut MenuConfig) -> Result<()> {
            if let Some(cursor) = &self.cursor {
                config.cursor = cursor.clone();
            }
            if let Some(cursor) = &self.multi_select_cursor {
                config.multi_select_cursor = cursor.clone();
            }
            if let Some(keys) = &self.accept_keys {
                config.accept_keys = MenuConfig::parse_keys(keys)?;
            }
            if let Some(keys) = &self.quit_keys {
                config.quit_keys = MenuConfig::parse_keys(keys)?;
            }
            if let Some(keys) = &self.multi_select_keys {
                config.multi_select_keys = MenuConfig::parse_keys(keys)?;
            }
            if let Some(key) = &self.search_key {
                config.search_key = MenuConfig::parse_search_key(Some(key))?;
            }
            if let Some(value) = self.search_case_sensitive {
                config.search_case_sensitive = value;
            }
            if let Some(value) = self.cycle_cursor {
                config.cycle_cursor = value;
            }
            if let Some(size) = self.preview_size {
                config.preview_size = size;
            }
            if let Some(ms) = self.escape_timeout_ms {
                config.escape_timeout = std::time::Duration::from_millis(ms);
            }
            for (element, list) in &self.styles {
                config.theme.set(element, list)?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::input::KeyEvent;
        use std::io::Write;

        #[test]
        fn applies_present_values_only() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(
                file,
                "cursor = \"-> \"\nquit_keys = \"q\"\n[styles]\ncursor = \"fg_green\""
            )
            .unwrap();

            let loaded = FileConfig::load_from(file.path()).unwrap();
            let mut config = MenuConfig::default();
            loaded.apply(&mut config).unwrap();

            assert_eq!(config.cursor, "-> ");
            assert_eq!(config.quit_keys, vec![KeyEvent::Char('q')]);
            assert_eq!(config.theme.cursor.to_string(), "fg_green");
            assert_eq!(config.accept_keys, vec![KeyEvent::ENTER]);
        }

        #[test]
        fn rejects_unknown_fields_and_styles() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "bogus = 1").unwrap();
            assert!(FileConfig::load_from(file.path()).is_err());

            let config = FileConfig {
                styles: [("cursor".to_string(), "fg_pink".to_string())].into(),
                ..FileConfig::default()
            };
            assert!(config.apply(&mut MenuConfig::default()).is_err());
        }
    }
}
