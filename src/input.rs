//! Input subsystem: raw terminal reads, byte decoding and the key model.
//!
//! Bytes flow from [`raw`] (a blocking reader thread) through [`decoder`] (a pure buffer
//! machine) into [`keys::KeyEvent`]s that the menu controller consumes.

pub mod decoder;
pub mod keys;
pub mod raw;

// Public re-exports for convenience. Modules outside this crate should prefer importing
// from `crate::input` rather than reaching into submodules.
pub use decoder::KeyDecoder;
pub use keys::{KeyEvent, KeyParseError, NamedKey};
pub use raw::{spawn_input_thread, RawInputReader};
