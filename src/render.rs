//! Rendering subsystem.
//!
//! [`renderer`] turns menu state into a [`Frame`], [`frame`] writes frames to the terminal
//! incrementally and [`theme`] holds the styles of the visual elements.

pub mod frame;
pub mod renderer;
pub mod theme;

pub use frame::{Frame, FrameWriter};
pub use renderer::{LayoutMetrics, PreviewPane, RenderInput, Renderer};
pub use theme::MenuTheme;
