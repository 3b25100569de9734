//! Scoped ownership of the controlling terminal.
//!
//! A [`TerminalSession`] switches `/dev/tty` into raw mode and hides the cursor when it is
//! opened, and puts both back when it is closed or dropped, whichever happens first.

use crate::capability::{CapabilitySet, Operation};
use crate::error::{MenuError, Result};
use crate::input::RawInputReader;
use crate::render::{Frame, FrameWriter};
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::fs::{File, OpenOptions};
use std::io::Write;

const TTY_PATH: &str = "/dev/tty";
/// Fallback size when the terminal cannot report one.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Options applied when entering and leaving the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Clear the whole screen before the first frame and again on exit
    pub clear_screen: bool,
    /// Erase the menu region on exit instead of leaving it on screen
    pub clear_menu_on_exit: bool,
}

/// Raw-mode terminal owned for the lifetime of one menu.
#[derive(Debug)]
pub struct TerminalSession {
    tty: File,
    caps: CapabilitySet,
    writer: FrameWriter,
    options: SessionOptions,
    active: bool,
}

/// Open the controlling terminal for reading and writing.
///
/// Fails with [`MenuError::NotATerminal`] when the process has no controlling terminal.
pub fn open_tty() -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(TTY_PATH)
        .map_err(|err| MenuError::not_a_terminal(format!("cannot open {}: {}", TTY_PATH, err)))
}

impl TerminalSession {
    /// Enter raw mode on `tty`.
    ///
    /// Callers resolve capabilities and open the terminal first, so that every failure
    /// that can be detected up front happens before the terminal mode changes.
    pub fn start(tty: File, caps: CapabilitySet, options: SessionOptions) -> Result<Self> {
        enable_raw_mode().map_err(|err| MenuError::io("enabling raw mode", err))?;
        let mut session = Self {
            tty,
            caps,
            writer: FrameWriter::new(),
            options,
            active: true,
        };

        let mut setup = session.caps.sequence(Operation::HideCursor).to_string();
        if options.clear_screen {
            setup.push_str(session.caps.sequence(Operation::ClearScreen));
        }
        // On failure `session` drops here and restores the terminal.
        session.write(&setup)?;
        log::debug!("terminal session started");
        Ok(session)
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.caps
    }

    /// A reader over a duplicate handle of the same terminal.
    pub fn reader(&self) -> Result<RawInputReader> {
        let tty = self
            .tty
            .try_clone()
            .map_err(|err| MenuError::io("duplicating the terminal handle", err))?;
        Ok(RawInputReader::new(tty))
    }

    /// Current terminal size as (columns, rows).
    pub fn size(&self) -> (u16, u16) {
        ratatui::crossterm::terminal::size().unwrap_or(FALLBACK_SIZE)
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        self.writer
            .write_frame(&mut self.tty, frame, &self.caps)
            .map_err(|err| MenuError::io("writing menu frame", err))
    }

    /// Erase the menu region so the next frame is drawn from scratch.
    pub fn invalidate(&mut self) -> Result<()> {
        let out = self.writer.invalidate(&self.caps);
        self.write(&out)
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.tty
            .write_all(text.as_bytes())
            .and_then(|_| self.tty.flush())
            .map_err(|err| MenuError::io("writing to the terminal", err))
    }

    /// Leave raw mode, reporting the first error.
    pub fn close(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let out = exit_output(&mut self.writer, &self.caps, self.options);
        let written = self.write(&out);
        let mode = disable_raw_mode().map_err(|err| MenuError::io("disabling raw mode", err));
        log::debug!("terminal session ended");
        written.and(mode)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            log::warn!("failed to restore terminal: {}", err);
        }
    }
}

/// Everything written when a session ends: leave the menu region, optionally clear the
/// screen, and show the cursor again.
fn exit_output(
    writer: &mut FrameWriter,
    caps: &CapabilitySet,
    options: SessionOptions,
) -> String {
    let mut out = writer.finish(caps, options.clear_menu_on_exit);
    if options.clear_screen {
        out.push_str(caps.sequence(Operation::ClearScreen));
    }
    out.push_str(caps.sequence(Operation::ShowCursor));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn_writer(caps: &CapabilitySet) -> FrameWriter {
        let mut writer = FrameWriter::new();
        writer.diff(&Frame::new(vec!["> one".into(), "  two".into()], 0), caps);
        writer
    }

    #[test]
    fn exit_clears_screen_when_requested() {
        let caps = CapabilitySet::ansi();
        let mut writer = drawn_writer(&caps);
        let options = SessionOptions {
            clear_screen: true,
            clear_menu_on_exit: false,
        };

        let out = exit_output(&mut writer, &caps, options);

        let clear = caps.sequence(Operation::ClearScreen);
        let show = caps.sequence(Operation::ShowCursor);
        assert!(out.contains(clear), "{:?}", out);
        assert!(out.ends_with(show));
        assert!(out.find(clear) < out.find(show));
    }

    #[test]
    fn exit_keeps_screen_by_default() {
        let caps = CapabilitySet::ansi();
        let mut writer = drawn_writer(&caps);

        let out = exit_output(&mut writer, &caps, SessionOptions::default());

        assert!(!out.contains(caps.sequence(Operation::ClearScreen)));
        assert!(!out.contains(caps.sequence(Operation::ClearBelow)));
        assert!(out.contains("\r\n"));
        assert!(out.ends_with(caps.sequence(Operation::ShowCursor)));
    }

    #[test]
    fn exit_erases_menu_region() {
        let caps = CapabilitySet::ansi();
        let mut writer = drawn_writer(&caps);
        let options = SessionOptions {
            clear_screen: false,
            clear_menu_on_exit: true,
        };

        let out = exit_output(&mut writer, &caps, options);

        assert!(out.contains(caps.sequence(Operation::ClearBelow)));
        assert!(!out.contains(caps.sequence(Operation::ClearScreen)));
    }
}
