//! # termmenu - Interactive Terminal Menus
//!
//! Draws a selectable list of entries inline in the terminal and returns the user's
//! choice. Menus support regex search, shortcut keys, multi-selection and a live preview
//! pane fed by an external command or an in-process converter.
//!
//! ## Features
//!
//! - **Inline Rendering**: No alternate screen; only changed lines are redrawn
//! - **Search**: Regular expression filtering powered by the ripgrep core libraries
//! - **Multi-Select**: Toggle several entries and accept them together
//! - **Previews**: Asynchronous preview generation that never shows stale output
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`capability`] and [`style`] - Terminal control sequences and style tags
//! - [`entry`] - Entry syntax (`[k] text|data`)
//! - [`input`] - Raw terminal reads, key decoding and key names
//! - [`layout`] - Width measurement, truncation and wrapping
//! - [`search`] - Pattern compilation and filtering
//! - [`selection`] - Cursor, scrolling and multi-select state
//! - [`preview`] - Preview commands and converters
//! - [`render`] - Frame construction and incremental output
//! - [`app`] - The menu controller, event loop and [`TerminalMenu`] façade
//!
//! ## Example
//!
//! ```no_run
//! use termmenu::{MenuConfig, MenuResult, TerminalMenu};
//!
//! let mut menu = TerminalMenu::new(["entry 1", "entry 2"], MenuConfig::default())?;
//! if let MenuResult::Single(index) = menu.show()? {
//!     println!("picked {}", index);
//! }
//! # Ok::<(), termmenu::MenuError>(())
//! ```

// Core modules
pub mod capability;
pub mod config;
pub mod entry;
pub mod error;
pub mod style;

// Subsystems
pub mod input;
pub mod layout;
pub mod preview;
pub mod render;
pub mod search;
pub mod selection;

pub mod app;

// Re-export commonly used types for convenience
pub use error::{MenuError, Result};

// Public API surface for external usage
pub use app::{MenuResult, TerminalMenu};
pub use config::{HintPlacement, MenuConfig, SearchKey, StatusBar};
pub use entry::MenuEntry;
pub use input::{KeyEvent, NamedKey};
pub use preview::{PreviewConverter, PreviewSource};
pub use selection::Preselect;
pub use style::Style;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
