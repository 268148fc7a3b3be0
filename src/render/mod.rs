//! Scene construction for the drawing layer.
//!
//! The engine resolves geometry, viewport, and interaction state into a flat
//! screen-space scene; the host draws it with whatever 2-D surface it has.

mod scene;

pub use scene::{
    CONNECTION_HANDLE_RADIUS_PX, DIMMED_OPACITY, Scene, SceneLink, SceneNode, SceneParams,
    ScenePreview, build_scene, effective_rect, handle_center,
};
