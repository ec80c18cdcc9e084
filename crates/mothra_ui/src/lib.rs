//! mothra_ui - input, scheduling and software rendering primitives for mothra
//!
//! This crate knows nothing about annotations. It provides the event types an
//! embedding surface feeds in, a generic snapshot undo stack, the per-frame
//! scheduling utilities, and a tiny-skia backed renderer.

pub mod constants;
mod event;
mod image;
mod renderer;
mod scheduler;
mod state;

pub use event::{CursorIcon, Event, Key, Modifiers, MouseButton, Point, PointerEvent, WheelEvent};
pub use image::ImageHandle;
pub use renderer::{load_system_font, Bounds, Color, RenderError, Renderer};
pub use scheduler::{FrameScheduler, Latch};
pub use state::UndoStack;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::event::{CursorIcon, Event, Key, Modifiers, MouseButton, Point};
    pub use crate::image::ImageHandle;
    pub use crate::renderer::{Bounds, Color, Renderer};
    pub use crate::scheduler::{FrameScheduler, Latch};
    pub use crate::state::UndoStack;
}
