//! Pointer gesture interpretation.

mod drag;

pub use drag::{DRAG_THRESHOLD_PX, DragController, GestureEffect, PointerTarget};
