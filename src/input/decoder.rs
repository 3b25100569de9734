//! Byte stream to key event decoding.
//!
//! The decoder keeps undecoded bytes between calls, so input may arrive in arbitrary
//! chunks. A lone ESC byte is ambiguous (escape key or the start of a sequence); the
//! decoder holds it back and reports [`KeyDecoder::is_pending`]. The caller decides how
//! long to wait for more bytes and calls [`KeyDecoder::flush`] once that time is up.

use super::keys::{KeyEvent, NamedKey};

const ESC: u8 = 0x1b;

/// Outcome of decoding one unit from the front of the buffer.
#[derive(Debug, PartialEq)]
enum Step {
    /// `consumed` bytes form one keypress, or noise when `key` is `None`
    Complete { key: Option<KeyEvent>, consumed: usize },
    /// The buffer ends in the middle of a unit
    Incomplete,
}

#[derive(Debug, Default)]
pub struct KeyDecoder {
    buffer: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every key that is now complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<KeyEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut keys = Vec::new();
        let mut offset = 0;

        while offset < self.buffer.len() {
            match decode_one(&self.buffer[offset..]) {
                Step::Complete { key, consumed } => {
                    keys.extend(key);
                    offset += consumed;
                }
                Step::Incomplete => break,
            }
        }
        self.buffer.drain(..offset);
        keys
    }

    /// True while bytes are held back waiting for a continuation.
    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Resolve held-back bytes after the continuation timeout expired.
    ///
    /// A lone ESC becomes the escape key; a truncated sequence or character is dropped.
    pub fn flush(&mut self) -> Option<KeyEvent> {
        let pending = std::mem::take(&mut self.buffer);
        match pending.as_slice() {
            [ESC] => Some(KeyEvent::ESCAPE),
            _ => None,
        }
    }
}

fn decode_one(bytes: &[u8]) -> Step {
    let complete = |key: Option<KeyEvent>, consumed: usize| Step::Complete { key, consumed };

    match bytes[0] {
        ESC => decode_escape(bytes),
        0x0d => complete(Some(KeyEvent::ENTER), 1),
        0x09 => complete(Some(KeyEvent::Named(NamedKey::Tab)), 1),
        0x7f | 0x08 => complete(Some(KeyEvent::Named(NamedKey::Backspace)), 1),
        b' ' => complete(Some(KeyEvent::Named(NamedKey::Space)), 1),
        0x00 => complete(Some(KeyEvent::Ctrl('@')), 1),
        byte @ 0x01..=0x1a => complete(Some(KeyEvent::Ctrl((b'a' + byte - 1) as char)), 1),
        byte @ 0x1c..=0x1f => complete(Some(KeyEvent::Ctrl((b'\\' + byte - 0x1c) as char)), 1),
        byte @ 0x21..=0x7e => complete(Some(KeyEvent::Char(byte as char)), 1),
        lead => decode_utf8(bytes, lead),
    }
}

fn decode_utf8(bytes: &[u8], lead: u8) -> Step {
    let width = match lead {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => {
            return Step::Complete {
                key: None,
                consumed: 1,
            }
        }
    };
    if bytes.len() < width {
        // A continuation byte that is already invalid will not become valid later.
        if bytes[1..].iter().all(|b| b & 0xc0 == 0x80) {
            return Step::Incomplete;
        }
        return Step::Complete {
            key: None,
            consumed: 1,
        };
    }
    match std::str::from_utf8(&bytes[..width]) {
        Ok(text) => Step::Complete {
            key: text.chars().next().map(KeyEvent::Char),
            consumed: width,
        },
        Err(_) => Step::Complete {
            key: None,
            consumed: 1,
        },
    }
}

fn decode_escape(bytes: &[u8]) -> Step {
    let Some(&next) = bytes.get(1) else {
        return Step::Incomplete;
    };
    match next {
        b'[' => decode_csi(bytes),
        b'O' => match bytes.get(2) {
            None => Step::Incomplete,
            Some(&last) => Step::Complete {
                key: ss3_key(last),
                consumed: 3,
            },
        },
        0x21..=0x7e => Step::Complete {
            key: Some(KeyEvent::Alt(next as char)),
            consumed: 2,
        },
        // ESC followed by anything else: the escape key, then decode the rest normally.
        _ => Step::Complete {
            key: Some(KeyEvent::ESCAPE),
            consumed: 1,
        },
    }
}

fn decode_csi(bytes: &[u8]) -> Step {
    let mut i = 2;
    while i < bytes.len() && (0x30..=0x3f).contains(&bytes[i]) {
        i += 1;
    }
    while i < bytes.len() && (0x20..=0x2f).contains(&bytes[i]) {
        i += 1;
    }
    let Some(&last) = bytes.get(i) else {
        return Step::Incomplete;
    };
    if !(0x40..=0x7e).contains(&last) {
        // Malformed: drop the introducer and resynchronise on the next byte.
        return Step::Complete {
            key: None,
            consumed: 2,
        };
    }
    let params = std::str::from_utf8(&bytes[2..i]).unwrap_or("");
    Step::Complete {
        key: csi_key(params, last),
        consumed: i + 1,
    }
}

fn ss3_key(last: u8) -> Option<KeyEvent> {
    let key = match last {
        b'A' => NamedKey::Up,
        b'B' => NamedKey::Down,
        b'C' => NamedKey::Right,
        b'D' => NamedKey::Left,
        b'H' => NamedKey::Home,
        b'F' => NamedKey::End,
        b'P' => NamedKey::F(1),
        b'Q' => NamedKey::F(2),
        b'R' => NamedKey::F(3),
        b'S' => NamedKey::F(4),
        _ => return None,
    };
    Some(KeyEvent::Named(key))
}

fn csi_key(params: &str, last: u8) -> Option<KeyEvent> {
    // Modifier parameters (`1;5A`) are accepted and ignored.
    let first: Option<u32> = params.split(';').next().and_then(|p| p.parse().ok());
    let key = match last {
        b'A' | b'B' | b'C' | b'D' | b'H' | b'F' | b'P' | b'Q' | b'R' | b'S' => {
            return ss3_key(last)
        }
        b'~' => match first? {
            1 | 7 => NamedKey::Home,
            2 => NamedKey::Insert,
            3 => NamedKey::Delete,
            4 | 8 => NamedKey::End,
            5 => NamedKey::PageUp,
            6 => NamedKey::PageDown,
            n @ 11..=15 => NamedKey::F((n - 10) as u8),
            n @ 17..=21 => NamedKey::F((n - 11) as u8),
            n @ 23..=24 => NamedKey::F((n - 12) as u8),
            _ => return None,
        },
        _ => return None,
    };
    Some(KeyEvent::Named(key))
}
