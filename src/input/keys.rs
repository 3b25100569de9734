//! Logical key events and the key names used in configuration.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Keys that do not produce a printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Insert,
    Delete,
    /// Function keys F1 to F12
    F(u8),
}

/// One decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    Named(NamedKey),
    /// Control plus an ASCII character, always stored lowercase
    Ctrl(char),
    /// Alt (meta) plus a character
    Alt(char),
}

/// Returned when a key name cannot be interpreted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown key name \"{0}\"")]
pub struct KeyParseError(pub String);

const NAMED_KEYS: &[(&str, NamedKey)] = &[
    ("up", NamedKey::Up),
    ("down", NamedKey::Down),
    ("left", NamedKey::Left),
    ("right", NamedKey::Right),
    ("home", NamedKey::Home),
    ("end", NamedKey::End),
    ("page_up", NamedKey::PageUp),
    ("page_down", NamedKey::PageDown),
    ("enter", NamedKey::Enter),
    ("escape", NamedKey::Escape),
    ("tab", NamedKey::Tab),
    ("space", NamedKey::Space),
    ("backspace", NamedKey::Backspace),
    ("insert", NamedKey::Insert),
    ("delete", NamedKey::Delete),
];

const NAME_ALIASES: &[(&str, &str)] = &[
    ("esc", "escape"),
    ("return", "enter"),
    ("pgup", "page_up"),
    ("pageup", "page_up"),
    ("pgdn", "page_down"),
    ("pagedown", "page_down"),
    ("del", "delete"),
    ("ins", "insert"),
];

impl KeyEvent {
    pub const ENTER: KeyEvent = KeyEvent::Named(NamedKey::Enter);
    pub const ESCAPE: KeyEvent = KeyEvent::Named(NamedKey::Escape);
    pub const INTERRUPT: KeyEvent = KeyEvent::Ctrl('c');

    /// The character this key would insert into a text field.
    pub fn printable(self) -> Option<char> {
        match self {
            KeyEvent::Char(ch) => Some(ch),
            KeyEvent::Named(NamedKey::Space) => Some(' '),
            _ => None,
        }
    }

    /// Letter keys folded to lowercase, everything else unchanged.
    pub fn to_lowercase(self) -> KeyEvent {
        match self {
            KeyEvent::Char(ch) if ch.is_uppercase() => {
                KeyEvent::Char(ch.to_lowercase().next().unwrap_or(ch))
            }
            other => other,
        }
    }

    /// Parse a comma separated list of key names.
    pub fn parse_list(list: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
        // A bare "," names the comma key itself.
        if list.trim() == "," {
            return Ok(vec![KeyEvent::Char(',')]);
        }
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || KeyParseError(s.to_string());

        let mut chars = s.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(match ch {
                ' ' => KeyEvent::Named(NamedKey::Space),
                '\t' => KeyEvent::Named(NamedKey::Tab),
                ch if ch.is_control() => return Err(error()),
                ch => KeyEvent::Char(ch),
            });
        }

        let lowered = s.trim().to_ascii_lowercase();
        for (prefix, modifier) in [("ctrl", true), ("alt", false)] {
            let rest = lowered
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(['-', '+']));
            if let Some(rest) = rest {
                let mut chars = rest.chars();
                return match (chars.next(), chars.next()) {
                    (Some(ch), None) if ch.is_ascii_graphic() => Ok(if modifier {
                        KeyEvent::Ctrl(ch)
                    } else {
                        KeyEvent::Alt(ch)
                    }),
                    _ => Err(error()),
                };
            }
        }

        let canonical = NAME_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, name)| *name)
            .unwrap_or(lowered.as_str())
            .replace('-', "_");
        if let Some((_, key)) = NAMED_KEYS.iter().find(|(name, _)| *name == canonical) {
            return Ok(KeyEvent::Named(*key));
        }

        if let Some(number) = canonical.strip_prefix('f') {
            if let Ok(n @ 1..=12) = number.parse::<u8>() {
                return Ok(KeyEvent::Named(NamedKey::F(n)));
            }
        }
        Err(error())
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let NamedKey::F(n) = self {
            return write!(f, "f{}", n);
        }
        let name = NAMED_KEYS
            .iter()
            .find(|(_, key)| key == self)
            .map(|(name, _)| *name)
            .unwrap_or("?");
        f.write_str(name)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Char(ch) => write!(f, "{}", ch),
            KeyEvent::Named(key) => write!(f, "{}", key),
            KeyEvent::Ctrl(ch) => write!(f, "ctrl-{}", ch),
            KeyEvent::Alt(ch) => write!(f, "alt-{}", ch),
        }
    }
}
