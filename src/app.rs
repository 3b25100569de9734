//! Application orchestration layer.
//!
//! [`TerminalMenu`] is the public entry point. It validates the entries and configuration
//! up front, then wires the controller, renderer, preview runner and terminal session
//! together for one interactive run.

pub mod controller;
pub mod messages;
pub mod runtime;
pub mod terminal;

pub use controller::{ExitReason, MenuController, MenuState};
pub use terminal::{SessionOptions, TerminalSession};

use crate::capability::{CapabilityProfile, CapabilitySet, Operation};
use crate::config::MenuConfig;
use crate::entry::MenuEntry;
use crate::error::{MenuError, Result};
use crate::input::KeyEvent;
use crate::preview::PreviewRunner;
use crate::render::{MenuTheme, Renderer};
use crate::selection::Selection;
use crate::style::ColorName;

/// The outcome of showing a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuResult {
    /// Original index of the accepted entry
    Single(usize),
    /// Sorted original indices of the selected entries (multi-select mode)
    Multiple(Vec<usize>),
    Cancelled,
}

impl MenuResult {
    /// The chosen indices, empty when cancelled.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            MenuResult::Single(index) => vec![*index],
            MenuResult::Multiple(indices) => indices.clone(),
            MenuResult::Cancelled => Vec::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MenuResult::Cancelled)
    }
}

impl From<Selection> for MenuResult {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Single(index) => MenuResult::Single(index),
            Selection::Multiple(indices) => MenuResult::Multiple(indices),
        }
    }
}

/// An interactive menu over a fixed list of entries.
#[derive(Debug)]
pub struct TerminalMenu {
    entries: Vec<MenuEntry>,
    config: MenuConfig,
    chosen: Option<MenuResult>,
    chosen_accept_key: Option<KeyEvent>,
}

impl TerminalMenu {
    /// Parse raw entry strings and validate them against `config`.
    ///
    /// Every configuration problem is reported here, before the terminal is touched.
    pub fn new<I, S>(entries: I, config: MenuConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|raw| MenuEntry::parse(raw.as_ref(), config.skip_empty_entries))
            .collect();
        Self::with_entries(entries, config)
    }

    /// Use already constructed entries.
    pub fn with_entries(entries: Vec<MenuEntry>, config: MenuConfig) -> Result<Self> {
        config.validate()?;
        MenuController::new(&entries, &config)?;
        Ok(Self {
            entries,
            config,
            chosen: None,
            chosen_accept_key: None,
        })
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Show the menu and wait for the user, inside an existing tokio runtime.
    pub async fn run(&mut self) -> Result<MenuResult> {
        self.chosen = None;
        self.chosen_accept_key = None;

        let profile = self
            .config
            .capability_profile
            .clone()
            .unwrap_or_else(CapabilityProfile::from_env);
        let caps = CapabilitySet::resolve(&profile)?;
        let tty = terminal::open_tty()?;

        let mut controller = MenuController::new(&self.entries, &self.config)?;
        let mut renderer = Renderer::new(&self.config, &self.entries);
        if !caps.supports(Operation::Foreground(ColorName::Red))
            && self.config.theme == MenuTheme::default()
        {
            log::debug!("terminal has no colors, using the monochrome theme");
            renderer = renderer.with_theme(MenuTheme::monochrome());
        }
        let mut preview = self.config.preview.clone().map(PreviewRunner::new);

        let mut session = TerminalSession::start(
            tty,
            caps,
            SessionOptions {
                clear_screen: self.config.clear_screen,
                clear_menu_on_exit: self.config.clear_menu_on_exit,
            },
        )?;
        let looped = runtime::run_event_loop(
            &mut controller,
            &renderer,
            &mut session,
            preview.as_mut(),
            self.config.escape_timeout,
        )
        .await;
        drop(preview);
        let closed = session.close();
        looped?;
        closed?;

        self.chosen_accept_key = controller.accept_key();
        let result = match controller.outcome() {
            Some(ExitReason::Accepted(selection)) => MenuResult::from(selection.clone()),
            Some(ExitReason::Interrupted) => return Err(MenuError::Interrupted),
            Some(ExitReason::Cancelled) | None => MenuResult::Cancelled,
        };
        log::debug!("menu finished with {:?}", result);
        self.chosen = Some(result.clone());
        Ok(result)
    }

    /// Show the menu and block until the user is done.
    ///
    /// Builds a private single-threaded runtime, so it must not be called from within an
    /// async context; use [`run`](Self::run) there.
    pub fn show(&mut self) -> Result<MenuResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| MenuError::io("starting the async runtime", err))?;
        runtime.block_on(self.run())
    }

    /// The accept key pressed to leave the last run, if it ended by an accept key.
    pub fn chosen_accept_key(&self) -> Option<KeyEvent> {
        self.chosen_accept_key
    }

    /// Result of the last run.
    pub fn chosen(&self) -> Option<&MenuResult> {
        self.chosen.as_ref()
    }

    /// Display texts of the entries chosen in the last run.
    pub fn chosen_entries(&self) -> Option<Vec<&str>> {
        match self.chosen.as_ref()? {
            MenuResult::Cancelled => None,
            result => Some(
                result
                    .indices()
                    .into_iter()
                    .map(|index| self.entries[index].text())
                    .collect(),
            ),
        }
    }
}
