//! Events observed by the menu event loop.

/// One wake-up of the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// Bytes read from the terminal
    Input(Vec<u8>),
    /// The reader thread stopped, so no further input can arrive
    InputClosed,
    /// A lone ESC was not followed by the rest of a sequence in time
    EscapeTimeout,
    /// The preview runner published a new result
    PreviewReady,
    /// Periodic check for terminal size changes
    Tick,
}
