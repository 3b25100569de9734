//! Terminal capability negotiation.
//!
//! The terminal database lookup is replaced by a [`CapabilityProfile`]: a handful of facts
//! about the terminal (its name, the number of colors, whether the locale allows Unicode box
//! drawing). [`CapabilitySet::resolve`] turns a profile into a frozen map from logical
//! operations to literal control sequences. Operations the terminal does not support are
//! simply absent and render as nothing.

use crate::error::{MenuError, Result};
use crate::style::{ColorName, Decoration, Style};
use ratatui::crossterm::{
    cursor,
    style::{Attribute, SetAttribute},
    terminal::{Clear, ClearType},
    Command,
};
use std::collections::HashMap;
use std::env;

/// Logical display operations the renderer may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Move the cursor one line up, never scrolling
    CursorUp,
    /// Move the cursor one line down, never scrolling
    CursorDown,
    /// Erase from the cursor to the end of the line
    ClearLine,
    /// Erase from the cursor to the end of the screen
    ClearBelow,
    ClearScreen,
    HideCursor,
    ShowCursor,
    ResetAttributes,
    Decoration(Decoration),
    Foreground(ColorName),
    Background(ColorName),
}

/// Facts about the terminal that decide which operations are usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityProfile {
    /// Terminal name as found in `TERM`
    pub term: Option<String>,
    /// Number of supported colors (0 for monochrome)
    pub colors: u16,
    /// Whether the italics attribute is usable
    pub italics: bool,
    /// Whether Unicode box drawing characters can be printed
    pub unicode: bool,
}

impl CapabilityProfile {
    /// Build a profile from the process environment.
    pub fn from_env() -> Self {
        let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.is_empty());
        Self::from_vars(
            env::var("TERM").ok(),
            env::var("COLORTERM").ok(),
            env::var_os("NO_COLOR").is_some(),
            locale,
        )
    }

    /// Build a profile from explicit environment values.
    pub fn from_vars(
        term: Option<String>,
        colorterm: Option<String>,
        no_color: bool,
        locale: Option<String>,
    ) -> Self {
        let term = term.filter(|name| !name.is_empty());
        let name = term.as_deref().unwrap_or("");
        let monochrome = name.starts_with("vt") || name.ends_with("-m") || name.ends_with("-mono");

        let colors = if no_color || monochrome {
            0
        } else if colorterm.is_some_and(|value| !value.is_empty())
            || name.contains("256color")
            || name.contains("direct")
        {
            256
        } else {
            8
        };

        let italics = !(name.starts_with("linux") || name.starts_with("vt"));
        let unicode = locale.is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("utf-8") || value.contains("utf8")
        });

        Self {
            term,
            colors,
            italics,
            unicode,
        }
    }
}

/// Characters used to draw the preview border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub horizontal: char,
    pub vertical: char,
    pub upper_left: char,
    pub upper_right: char,
    pub lower_left: char,
    pub lower_right: char,
}

impl BoxChars {
    pub const UNICODE: BoxChars = BoxChars {
        horizontal: '─',
        vertical: '│',
        upper_left: '┌',
        upper_right: '┐',
        lower_left: '└',
        lower_right: '┘',
    };

    pub const ASCII: BoxChars = BoxChars {
        horizontal: '-',
        vertical: '|',
        upper_left: '+',
        upper_right: '+',
        lower_left: '+',
        lower_right: '+',
    };
}

/// Frozen mapping from [`Operation`] to the literal sequence that performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySet {
    sequences: HashMap<Operation, String>,
    unicode: bool,
}

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}

impl CapabilitySet {
    /// Resolve the usable operations for `profile`.
    ///
    /// Terminals without cursor addressing (`TERM` unset or `dumb`) are rejected here, so a
    /// caller can fail before switching the terminal into raw mode.
    pub fn resolve(profile: &CapabilityProfile) -> Result<Self> {
        match profile.term.as_deref() {
            None => {
                return Err(MenuError::unsupported_terminal(
                    "TERM is not set, cannot determine terminal capabilities",
                ))
            }
            Some("dumb") => {
                return Err(MenuError::unsupported_terminal(
                    "the \"dumb\" terminal has no cursor addressing",
                ))
            }
            Some(_) => {}
        }

        let mut sequences = HashMap::new();
        sequences.insert(Operation::CursorUp, ansi(cursor::MoveUp(1)));
        sequences.insert(Operation::CursorDown, ansi(cursor::MoveDown(1)));
        sequences.insert(Operation::ClearLine, ansi(Clear(ClearType::UntilNewLine)));
        sequences.insert(Operation::ClearBelow, ansi(Clear(ClearType::FromCursorDown)));
        sequences.insert(
            Operation::ClearScreen,
            ansi(Clear(ClearType::All)) + &ansi(cursor::MoveTo(0, 0)),
        );
        sequences.insert(Operation::HideCursor, ansi(cursor::Hide));
        sequences.insert(Operation::ShowCursor, ansi(cursor::Show));
        sequences.insert(
            Operation::ResetAttributes,
            ansi(SetAttribute(Attribute::Reset)),
        );

        for decoration in Decoration::ALL {
            let attribute = match decoration {
                Decoration::Bold => Attribute::Bold,
                Decoration::Underline => Attribute::Underlined,
                Decoration::Standout => Attribute::Reverse,
                Decoration::Italics if profile.italics => Attribute::Italic,
                Decoration::Italics => continue,
            };
            sequences.insert(
                Operation::Decoration(decoration),
                ansi(SetAttribute(attribute)),
            );
        }

        if profile.colors >= 8 {
            for color in ColorName::ALL {
                let index = color.ansi_index();
                sequences.insert(Operation::Foreground(color), format!("\x1b[{}m", 30 + index));
                sequences.insert(Operation::Background(color), format!("\x1b[{}m", 40 + index));
            }
        }

        Ok(Self {
            sequences,
            unicode: profile.unicode,
        })
    }

    /// A full ANSI set with Unicode borders, independent of the environment.
    pub fn ansi() -> Self {
        let profile = CapabilityProfile {
            term: Some("xterm-256color".to_string()),
            colors: 256,
            italics: true,
            unicode: true,
        };
        match Self::resolve(&profile) {
            Ok(set) => set,
            Err(_) => unreachable!("xterm-256color always resolves"),
        }
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.sequences.contains_key(&operation)
    }

    /// The sequence for `operation`, or an empty string when unsupported.
    pub fn sequence(&self, operation: Operation) -> &str {
        self.sequences
            .get(&operation)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// `operation` repeated `count` times.
    pub fn repeat(&self, operation: Operation, count: usize) -> String {
        self.sequence(operation).repeat(count)
    }

    /// Sequence that resets attributes and then applies `style`.
    ///
    /// Tags the terminal cannot render are skipped.
    pub fn enter_style(&self, style: &Style) -> String {
        let resolved = style.resolve();
        let mut out = self.sequence(Operation::ResetAttributes).to_string();
        if let Some(color) = resolved.foreground {
            out.push_str(self.sequence(Operation::Foreground(color)));
        }
        if let Some(color) = resolved.background {
            out.push_str(self.sequence(Operation::Background(color)));
        }
        for decoration in resolved.decorations {
            out.push_str(self.sequence(Operation::Decoration(decoration)));
        }
        out
    }

    /// Sequence that leaves any styled region.
    pub fn exit_style(&self) -> &str {
        self.sequence(Operation::ResetAttributes)
    }

    /// Wrap `text` in `style`, or return it unchanged for a plain style.
    pub fn paint(&self, style: &Style, text: &str) -> String {
        if text.is_empty() || style.resolve().is_plain() {
            return text.to_string();
        }
        format!("{}{}{}", self.enter_style(style), text, self.exit_style())
    }

    pub fn box_chars(&self) -> BoxChars {
        if self.unicode {
            BoxChars::UNICODE
        } else {
            BoxChars::ASCII
        }
    }
}
