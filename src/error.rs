//! Error types and handling infrastructure for termmenu.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary wraps these with `anyhow` for top-level context.
//!
//! ## Error classes
//!
//! - **Configuration**: rejected by `TerminalMenu::new` before any terminal state is touched
//! - **Terminal**: no controlling terminal or an unsupported `TERM`, detected before raw mode
//! - **Interrupted**: ctrl-c while the menu runs, only surfaced when re-raising is enabled
//!
//! Search pattern errors and preview failures are never returned from here; they are
//! displayed inside the menu instead.

use thiserror::Error;

/// The main error type for termmenu operations.
#[derive(Error, Debug)]
pub enum MenuError {
    /// Terminal I/O failed (reading keys, writing frames, switching modes)
    #[error("Terminal I/O failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The menu was constructed without any entries
    #[error("No menu entries given")]
    NoEntries,

    /// Every entry is empty, so there is nothing the cursor could land on
    #[error("No displayable menu entries (all {count} entries are empty)")]
    NoDisplayableEntries { count: usize },

    /// A style tag name could not be resolved
    #[error("{message}")]
    InvalidStyle { message: String },

    /// A key name could not be resolved
    #[error("Cannot interpret the key \"{key}\"")]
    InvalidKey { key: String },

    /// Configuration values that contradict each other or the entry list
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// No controlling terminal is available
    #[error("Not connected to a terminal: {message}")]
    NotATerminal { message: String },

    /// The terminal lacks the cursor movement or styling this menu needs
    #[error("Unsupported terminal: {message}")]
    UnsupportedTerminal { message: String },

    /// The user pressed ctrl-c and the menu is configured to re-raise it
    #[error("Menu interrupted")]
    Interrupted,

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for termmenu operations.
pub type Result<T> = std::result::Result<T, MenuError>;

impl MenuError {
    /// Create an Io error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InvalidStyle error naming every unknown style tag
    pub fn invalid_styles(names: &[String]) -> Self {
        let message = match names {
            [single] => format!("The style \"{}\" does not exist.", single),
            many => format!("The styles (\"{}\") do not exist.", many.join("\", \"")),
        };
        Self::InvalidStyle { message }
    }

    /// Create a NotATerminal error with a descriptive message
    pub fn not_a_terminal(message: impl Into<String>) -> Self {
        Self::NotATerminal {
            message: message.into(),
        }
    }

    /// Create an UnsupportedTerminal error with a descriptive message
    pub fn unsupported_terminal(message: impl Into<String>) -> Self {
        Self::UnsupportedTerminal {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// True for errors raised while validating a configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NoEntries
                | Self::NoDisplayableEntries { .. }
                | Self::InvalidStyle { .. }
                | Self::InvalidKey { .. }
                | Self::ConfigError { .. }
        )
    }
}

// Automatic conversion from io::Error to MenuError
impl From<std::io::Error> for MenuError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "terminal operation failed".to_string(),
            source: err,
        }
    }
}
