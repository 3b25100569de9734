//! Frames and incremental terminal output.
//!
//! The menu is drawn inline below the shell prompt, not on an alternate screen. The
//! [`FrameWriter`] owns a block of terminal rows starting at the line where the menu was
//! opened and tracks which row the terminal cursor is on, so it can move between rows
//! with relative cursor movements only.

use crate::capability::{CapabilitySet, Operation};
use std::io::{self, Write};

/// The complete intended content of the menu region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// One entry per terminal row, each already fitted to the terminal width
    pub lines: Vec<String>,
    /// Row the terminal cursor is parked on after drawing
    pub cursor_row: usize,
}

impl Frame {
    pub fn new(lines: Vec<String>, cursor_row: usize) -> Self {
        Self { lines, cursor_row }
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

/// Writes frames, emitting only the rows that changed since the previous frame.
#[derive(Debug, Default)]
pub struct FrameWriter {
    previous: Vec<String>,
    /// Rows reserved so far, including the row the menu started on
    allocated: usize,
    /// Row the terminal cursor is currently on
    row: usize,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self {
            previous: Vec::new(),
            allocated: 1,
            row: 0,
        }
    }

    /// Rows currently reserved for the menu.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    fn move_to(&mut self, out: &mut String, caps: &CapabilitySet, target: usize) {
        if target < self.row {
            out.push_str(&caps.repeat(Operation::CursorUp, self.row - target));
        } else if target > self.row {
            out.push_str(&caps.repeat(Operation::CursorDown, target - self.row));
        }
        self.row = target;
    }

    /// Build the output that turns the previous frame into `frame`.
    pub fn diff(&mut self, frame: &Frame, caps: &CapabilitySet) -> String {
        let mut out = String::new();
        let clear_line = caps.sequence(Operation::ClearLine);

        if frame.lines.len() > self.allocated {
            // Newlines scroll the terminal when the menu reaches the bottom edge.
            self.move_to(&mut out, caps, self.allocated - 1);
            for _ in self.allocated..frame.lines.len() {
                out.push('\n');
            }
            self.row = frame.lines.len() - 1;
            self.allocated = frame.lines.len();
        }

        for (index, line) in frame.lines.iter().enumerate() {
            if self.previous.get(index) == Some(line) {
                continue;
            }
            self.move_to(&mut out, caps, index);
            out.push('\r');
            out.push_str(clear_line);
            out.push_str(line);
        }
        for index in frame.lines.len()..self.previous.len() {
            self.move_to(&mut out, caps, index);
            out.push('\r');
            out.push_str(clear_line);
        }

        let parked = frame.cursor_row.min(self.allocated - 1);
        self.move_to(&mut out, caps, parked);
        out.push('\r');
        self.previous = frame.lines.clone();
        out
    }

    pub fn write_frame<W: Write>(
        &mut self,
        out: &mut W,
        frame: &Frame,
        caps: &CapabilitySet,
    ) -> io::Result<()> {
        let bytes = self.diff(frame, caps);
        out.write_all(bytes.as_bytes())?;
        out.flush()
    }

    /// Forget what is on screen and blank the menu region, e.g. after a resize reflowed it.
    pub fn invalidate(&mut self, caps: &CapabilitySet) -> String {
        let mut out = String::new();
        self.move_to(&mut out, caps, 0);
        out.push('\r');
        out.push_str(caps.sequence(Operation::ClearBelow));
        self.previous.clear();
        out
    }

    /// Output that leaves the menu region: either erasing it or moving below it.
    pub fn finish(&mut self, caps: &CapabilitySet, clear: bool) -> String {
        let mut out = String::new();
        if clear {
            out.push_str(&self.invalidate(caps));
        } else {
            let last = self.previous.len().max(1) - 1;
            self.move_to(&mut out, caps, last);
            out.push_str("\r\n");
            self.row = 0;
            self.allocated = 1;
            self.previous.clear();
        }
        out
    }
}
