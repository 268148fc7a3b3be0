//! Display-tree construction and geometry.
//!
//! This module turns the stream hierarchy into 2-D geometry: `display`
//! rebuilds an explicit tree from the arena, `focus` optionally reduces it to
//! one lineage with collapsed placeholders, and `tree` assigns base layout
//! positions. All three are pure functions of their inputs; viewport and
//! manual-offset state live elsewhere.

pub mod display;
pub mod focus;
pub mod tree;

pub use display::{DisplayNode, NodePayload, build_display_tree};
pub use focus::FocusProjection;
pub use tree::{LayoutConfig, TreeLayout, TreeLink, TreeNode};
