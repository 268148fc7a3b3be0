//! Mutable view state: manual offsets, viewport transform, animations.
//!
//! Layout and focus projection are pure; everything the user perturbs by
//! hand lives here so the base layout can be recomputed at any time without
//! losing interaction state.

pub mod animation;
pub mod offsets;
pub mod viewport;

pub use animation::{Lerp, Tween, ease_out_cubic};
pub use offsets::PositionOffsetStore;
pub use viewport::{MAX_ZOOM, MIN_ZOOM, ViewTransform, ViewportController};
