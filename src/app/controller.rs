//! Key-driven menu state machine.
//!
//! The controller owns the search and selection state and interprets one [`KeyEvent`] at
//! a time. It never touches the terminal, so a whole menu session can be replayed from a
//! key script.

use crate::config::{MenuConfig, SearchKey};
use crate::entry::MenuEntry;
use crate::error::{MenuError, Result};
use crate::input::{KeyEvent, NamedKey};
use crate::render::{PreviewPane, RenderInput};
use crate::search::SearchState;
use crate::selection::{Selection, SelectionModel, SelectionOptions};

/// How the menu was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Accepted(Selection),
    Cancelled,
    /// ctrl-c with re-raising enabled
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    Browsing,
    Searching,
    Exited(ExitReason),
}

/// Keys that drive navigation, independent of configuration.
const UP_KEYS: [KeyEvent; 3] = [
    KeyEvent::Named(NamedKey::Up),
    KeyEvent::Ctrl('k'),
    KeyEvent::Char('k'),
];
const DOWN_KEYS: [KeyEvent; 3] = [
    KeyEvent::Named(NamedKey::Down),
    KeyEvent::Ctrl('j'),
    KeyEvent::Char('j'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Accept,
    Quit,
    Toggle,
    StartSearch,
}

/// Key sets of a menu, resolved from its configuration.
#[derive(Debug, Clone)]
struct KeyBindings {
    accept: Vec<KeyEvent>,
    quit: Vec<KeyEvent>,
    multi_select: Vec<KeyEvent>,
    search: SearchKey,
    exit_on_shortcut: bool,
    raise_on_interrupt: bool,
}

impl KeyBindings {
    fn from_config(config: &MenuConfig) -> Self {
        let lower = |keys: &[KeyEvent]| -> Vec<KeyEvent> {
            keys.iter().map(|key| key.to_lowercase()).collect()
        };
        Self {
            accept: config.accept_keys.clone(),
            quit: lower(&config.quit_keys),
            multi_select: if config.multi_select {
                config.multi_select_keys.clone()
            } else {
                Vec::new()
            },
            search: config.search_key,
            exit_on_shortcut: config.exit_on_shortcut,
            raise_on_interrupt: config.raise_on_interrupt,
        }
    }

    /// Shortcuts and letter bindings are only live when a dedicated search key exists.
    fn letters_enabled(&self) -> bool {
        matches!(self.search, SearchKey::Key(_))
    }

    /// Resolve a non-search keypress to an action.
    ///
    /// `letters` controls whether printable keys may match bindings at all.
    fn action(&self, key: KeyEvent, letters: bool) -> Option<Action> {
        if !letters && key.printable().is_some() && key != KeyEvent::Named(NamedKey::Space) {
            return None;
        }
        let lowered = key.to_lowercase();
        if self.accept.contains(&key) {
            return Some(Action::Accept);
        }
        if self.multi_select.contains(&key) {
            return Some(Action::Toggle);
        }
        if UP_KEYS.contains(&lowered) {
            return Some(Action::Up);
        }
        if DOWN_KEYS.contains(&lowered) {
            return Some(Action::Down);
        }
        match key {
            KeyEvent::Named(NamedKey::PageUp) => return Some(Action::PageUp),
            KeyEvent::Named(NamedKey::PageDown) => return Some(Action::PageDown),
            KeyEvent::Named(NamedKey::Home) => return Some(Action::Home),
            KeyEvent::Named(NamedKey::End) => return Some(Action::End),
            _ => {}
        }
        if self.quit.contains(&lowered) {
            return Some(Action::Quit);
        }
        if let SearchKey::Key(search) = self.search {
            if key == search {
                return Some(Action::StartSearch);
            }
        }
        None
    }
}

/// Drives one menu session from keypresses to an [`ExitReason`].
#[derive(Debug)]
pub struct MenuController<'a> {
    entries: &'a [MenuEntry],
    bindings: KeyBindings,
    search: SearchState,
    selection: SelectionModel,
    state: MenuState,
    viewport_height: usize,
    accept_key: Option<KeyEvent>,
}

impl<'a> MenuController<'a> {
    /// Validate `entries` against `config` and place the cursor.
    pub fn new(entries: &'a [MenuEntry], config: &MenuConfig) -> Result<Self> {
        if entries.is_empty() {
            return Err(MenuError::NoEntries);
        }
        let search = SearchState::new(entries, config.search_case_sensitive);
        if search.view().is_empty() {
            return Err(MenuError::NoDisplayableEntries {
                count: entries.len(),
            });
        }

        let mut selection = SelectionModel::new(SelectionOptions {
            cycle: config.cycle_cursor,
            multi_select: config.multi_select,
            select_on_accept: config.multi_select_select_on_accept,
            allow_empty: config.multi_select_empty_ok,
        });
        selection.initialize(
            entries,
            search.view(),
            config.cursor_index,
            &config.preselected_entries,
        )?;

        let viewport_height = search.view().len();
        Ok(Self {
            entries,
            bindings: KeyBindings::from_config(config),
            search,
            selection,
            state: MenuState::Browsing,
            viewport_height,
            accept_key: None,
        })
    }

    pub fn entries(&self) -> &'a [MenuEntry] {
        self.entries
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn is_searching(&self) -> bool {
        self.state == MenuState::Searching
    }

    pub fn is_exited(&self) -> bool {
        matches!(self.state, MenuState::Exited(_))
    }

    /// The exit reason once the session has ended.
    pub fn outcome(&self) -> Option<&ExitReason> {
        match &self.state {
            MenuState::Exited(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// The accept key that ended the session, if it ended by an accept key.
    pub fn accept_key(&self) -> Option<KeyEvent> {
        self.accept_key
    }

    /// Original index of the entry under the cursor.
    pub fn current_index(&self) -> Option<usize> {
        self.selection.current_index(self.search.view())
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Record the number of entry rows on screen and scroll the cursor into view.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.selection
            .keep_visible(self.search.view().len(), self.viewport_height);
    }

    /// Snapshot of the state the renderer needs.
    pub fn render_input<'s>(
        &'s self,
        preview: PreviewPane<'s>,
        size: (u16, u16),
    ) -> RenderInput<'s> {
        RenderInput {
            entries: self.entries,
            search: &self.search,
            selection: &self.selection,
            searching: self.is_searching(),
            preview,
            size,
        }
    }

    /// Feed one keypress.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key == KeyEvent::INTERRUPT {
            log::debug!("interrupted");
            self.state = MenuState::Exited(if self.bindings.raise_on_interrupt {
                ExitReason::Interrupted
            } else {
                ExitReason::Cancelled
            });
            return;
        }
        match self.state {
            MenuState::Browsing => self.handle_browsing(key),
            MenuState::Searching => self.handle_searching(key),
            MenuState::Exited(_) => {}
        }
        self.selection
            .keep_visible(self.search.view().len(), self.viewport_height);
    }

    fn handle_browsing(&mut self, key: KeyEvent) {
        let letters = self.bindings.letters_enabled();
        if letters {
            if let KeyEvent::Char(ch) = key.to_lowercase() {
                if self.try_shortcut(ch) {
                    return;
                }
            }
        }

        match self.bindings.action(key, letters) {
            Some(Action::StartSearch) => {
                log::debug!("search started");
                self.state = MenuState::Searching;
            }
            Some(Action::Quit) => self.state = MenuState::Exited(ExitReason::Cancelled),
            Some(action) => self.apply(action, key),
            None if !letters => {
                // Any printable key starts a search; "/" starts it empty.
                if let KeyEvent::Char(ch) = key {
                    self.state = MenuState::Searching;
                    if ch != '/' {
                        self.edit_search(|search, entries| search.push(ch, entries));
                    }
                }
            }
            None => {}
        }
    }

    fn handle_searching(&mut self, key: KeyEvent) {
        match key {
            KeyEvent::Named(NamedKey::Escape) => {
                self.leave_search();
                return;
            }
            KeyEvent::Named(NamedKey::Backspace) => {
                if self.search.text().is_empty() {
                    self.state = MenuState::Browsing;
                } else {
                    self.edit_search(|search, entries| {
                        search.pop(entries);
                    });
                }
                return;
            }
            _ => {}
        }

        if let Some(ch) = key.printable() {
            let is_search_key = self.bindings.search == SearchKey::Key(key)
                || (self.bindings.search == SearchKey::AnyLetter && ch == '/');
            if !(is_search_key && self.search.text().is_empty()) {
                self.edit_search(|search, entries| search.push(ch, entries));
            }
            return;
        }

        match self.bindings.action(key, false) {
            Some(Action::Quit) => self.leave_search(),
            Some(Action::StartSearch) | None => {}
            Some(action) => self.apply(action, key),
        }
    }

    /// Drop the pattern and go back to browsing the full list.
    fn leave_search(&mut self) {
        self.edit_search(|search, entries| search.clear(entries));
        self.state = MenuState::Browsing;
    }

    /// Jump to the entry whose shortcut is `ch`; true when one matched.
    fn try_shortcut(&mut self, ch: char) -> bool {
        let entries = self.entries;
        let declared = self.search.view().iter().find_map(|item| {
            entries[item.index]
                .shortcut()
                .filter(|shortcut| shortcut.to_lowercase().eq(ch.to_lowercase()))
        });
        let Some(shortcut) = declared else {
            return false;
        };
        let index = self
            .selection
            .jump_to_shortcut(entries, self.search.view(), shortcut);
        log::debug!("shortcut {} selected entry {:?}", ch, index);

        if self.bindings.exit_on_shortcut {
            if let Some(selection) = self.selection.accept(self.search.view()) {
                self.state = MenuState::Exited(ExitReason::Accepted(selection));
            }
        }
        true
    }

    fn apply(&mut self, action: Action, key: KeyEvent) {
        let len = self.search.view().len();
        let page = self.viewport_height;
        match action {
            Action::Up => self.selection.move_up(len),
            Action::Down => self.selection.move_down(len),
            Action::PageUp => self.selection.page_up(page),
            Action::PageDown => self.selection.page_down(len, page),
            Action::Home => self.selection.home(),
            Action::End => self.selection.end(len),
            Action::Toggle => self.selection.toggle(self.search.view()),
            Action::Accept => {
                if let Some(selection) = self.selection.accept(self.search.view()) {
                    log::debug!("accepted {:?} with {}", selection, key);
                    self.accept_key = Some(key);
                    self.state = MenuState::Exited(ExitReason::Accepted(selection));
                }
            }
            Action::Quit => self.state = MenuState::Exited(ExitReason::Cancelled),
            Action::StartSearch => self.state = MenuState::Searching,
        }
    }

    /// Change the search text and keep the cursor on the same entry where possible.
    fn edit_search<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut SearchState, &[MenuEntry]),
    {
        let previous = self.current_index();
        edit(&mut self.search, self.entries);
        self.selection.reconcile(previous, self.search.view());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(texts: &[&str]) -> Vec<MenuEntry> {
        texts.iter().map(|text| MenuEntry::parse(text, true)).collect()
    }

    fn run(controller: &mut MenuController<'_>, keys: &[KeyEvent]) {
        for key in keys {
            controller.handle_key(*key);
        }
    }

    const DOWN: KeyEvent = KeyEvent::Named(NamedKey::Down);
    const UP: KeyEvent = KeyEvent::Named(NamedKey::Up);

    #[test]
    fn rejects_empty_and_undisplayable_lists() {
        let config = MenuConfig::default();
        assert!(matches!(
            MenuController::new(&[], &config),
            Err(MenuError::NoEntries)
        ));
        let blanks = entries(&["", "  "]);
        assert!(matches!(
            MenuController::new(&blanks, &config),
            Err(MenuError::NoDisplayableEntries { count: 2 })
        ));
    }

    #[test]
    fn rejects_cursor_index_on_empty_entry() {
        let list = entries(&["a", "", "b"]);
        let config = MenuConfig {
            cursor_index: Some(1),
            ..MenuConfig::default()
        };
        assert!(MenuController::new(&list, &config)
            .unwrap_err()
            .is_config_error());
    }

    #[test]
    fn letter_bindings_navigate_case_insensitively() {
        let list = entries(&["a", "b", "c"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(&mut controller, &[KeyEvent::Char('J'), KeyEvent::Char('j')]);
        assert_eq!(controller.current_index(), Some(2));
        run(&mut controller, &[KeyEvent::Ctrl('k')]);
        assert_eq!(controller.current_index(), Some(1));
    }

    #[test]
    fn quit_cancels_only_while_browsing() {
        let list = entries(&["quail", "other"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(&mut controller, &[KeyEvent::Char('/'), KeyEvent::Char('q')]);
        assert!(controller.is_searching());
        assert_eq!(controller.search().text(), "q");

        run(&mut controller, &[KeyEvent::ESCAPE]);
        assert_eq!(controller.state(), &MenuState::Browsing);
        assert_eq!(controller.search().text(), "");
        run(&mut controller, &[KeyEvent::ESCAPE]);
        assert_eq!(controller.outcome(), Some(&ExitReason::Cancelled));
    }

    #[test]
    fn custom_quit_key_leaves_search() {
        let list = entries(&["apple", "banana", "cherry"]);
        let config = MenuConfig {
            quit_keys: vec![KeyEvent::Ctrl('g')],
            ..MenuConfig::default()
        };
        let mut controller = MenuController::new(&list, &config).unwrap();

        run(&mut controller, &[KeyEvent::Char('/'), KeyEvent::Char('n')]);
        assert!(controller.is_searching());
        assert_eq!(controller.search().view().len(), 1);

        run(&mut controller, &[KeyEvent::Ctrl('g')]);
        assert_eq!(controller.state(), &MenuState::Browsing);
        assert_eq!(controller.search().text(), "");
        assert_eq!(controller.search().view().len(), 3);
        assert_eq!(controller.current_index(), Some(1));

        run(&mut controller, &[KeyEvent::Ctrl('g')]);
        assert_eq!(controller.outcome(), Some(&ExitReason::Cancelled));
    }

    #[test]
    fn searching_treats_letters_as_text() {
        let list = entries(&["jam", "kiwi", "jelly"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(
            &mut controller,
            &[KeyEvent::Char('/'), KeyEvent::Char('j'), KeyEvent::Char('e')],
        );
        assert_eq!(controller.search().text(), "je");
        assert_eq!(controller.current_index(), Some(2));

        // Named navigation keys still work while typing; the view wraps around.
        run(&mut controller, &[KeyEvent::Named(NamedKey::Backspace), DOWN]);
        assert_eq!(controller.search().text(), "j");
        assert_eq!(controller.current_index(), Some(0));
    }

    #[test]
    fn search_key_on_empty_pattern_is_ignored() {
        let list = entries(&["a/b", "c"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(&mut controller, &[KeyEvent::Char('/'), KeyEvent::Char('/')]);
        assert_eq!(controller.search().text(), "");
        run(&mut controller, &[KeyEvent::Char('a'), KeyEvent::Char('/')]);
        assert_eq!(controller.search().text(), "a/");
    }

    #[test]
    fn backspace_on_empty_pattern_leaves_search() {
        let list = entries(&["a"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(
            &mut controller,
            &[KeyEvent::Char('/'), KeyEvent::Named(NamedKey::Backspace)],
        );
        assert_eq!(controller.state(), &MenuState::Browsing);
    }

    #[test]
    fn any_letter_mode_starts_search_with_letter() {
        let list = entries(&["[a] apple", "quince"]);
        let config = MenuConfig {
            search_key: SearchKey::AnyLetter,
            ..MenuConfig::default()
        };
        let mut controller = MenuController::new(&list, &config).unwrap();
        run(&mut controller, &[KeyEvent::Char('q')]);
        assert!(controller.is_searching());
        assert_eq!(controller.search().text(), "q");
        assert_eq!(controller.current_index(), Some(1));
    }

    #[test]
    fn refilter_keeps_cursor_on_same_entry() {
        let list = entries(&["apple", "banana", "apricot"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(&mut controller, &[DOWN, DOWN, KeyEvent::Char('/'), KeyEvent::Char('a')]);
        assert_eq!(controller.current_index(), Some(2));
        run(&mut controller, &[KeyEvent::Char('p')]);
        assert_eq!(controller.current_index(), Some(2));
        run(&mut controller, &[KeyEvent::Char('p')]);
        // "app" no longer matches apricot; the cursor falls back to the first match.
        assert_eq!(controller.current_index(), Some(0));
    }

    #[test]
    fn accept_with_empty_view_is_ignored() {
        let list = entries(&["a", "b"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(
            &mut controller,
            &[KeyEvent::Char('/'), KeyEvent::Char('z'), KeyEvent::ENTER],
        );
        assert!(!controller.is_exited());
        assert_eq!(controller.current_index(), None);
    }

    #[test]
    fn interrupt_cancels_or_raises() {
        let list = entries(&["a"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        run(&mut controller, &[KeyEvent::INTERRUPT]);
        assert_eq!(controller.outcome(), Some(&ExitReason::Cancelled));

        let config = MenuConfig {
            raise_on_interrupt: true,
            ..MenuConfig::default()
        };
        let mut controller = MenuController::new(&list, &config).unwrap();
        run(&mut controller, &[KeyEvent::Char('/'), KeyEvent::INTERRUPT]);
        assert_eq!(controller.outcome(), Some(&ExitReason::Interrupted));
    }

    #[test]
    fn accept_key_is_recorded() {
        let list = entries(&["a", "b"]);
        let config = MenuConfig {
            accept_keys: vec![KeyEvent::ENTER, KeyEvent::Alt('d')],
            ..MenuConfig::default()
        };
        let mut controller = MenuController::new(&list, &config).unwrap();
        run(&mut controller, &[UP, KeyEvent::Alt('d')]);
        assert_eq!(controller.accept_key(), Some(KeyEvent::Alt('d')));
        assert_eq!(
            controller.outcome(),
            Some(&ExitReason::Accepted(Selection::Single(1)))
        );
    }

    #[test]
    fn page_keys_move_by_viewport_height() {
        let list = entries(&["0", "1", "2", "3", "4", "5", "6"]);
        let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();
        controller.set_viewport_height(3);
        run(&mut controller, &[KeyEvent::Named(NamedKey::PageDown)]);
        assert_eq!(controller.current_index(), Some(3));
        assert_eq!(controller.selection().offset(), 1);
        run(&mut controller, &[KeyEvent::Named(NamedKey::End)]);
        assert_eq!(controller.selection().offset(), 4);
        run(&mut controller, &[KeyEvent::Named(NamedKey::PageUp)]);
        assert_eq!(controller.current_index(), Some(3));
        run(&mut controller, &[KeyEvent::Named(NamedKey::Home)]);
        assert_eq!(controller.selection().offset(), 0);
    }

    #[test]
    fn shortcut_without_exit_only_moves() {
        let list = entries(&["[a] apple", "[b] banana"]);
        let config = MenuConfig {
            exit_on_shortcut: false,
            ..MenuConfig::default()
        };
        let mut controller = MenuController::new(&list, &config).unwrap();
        run(&mut controller, &[KeyEvent::Char('B')]);
        assert_eq!(controller.current_index(), Some(1));
        assert!(!controller.is_exited());
    }
}
