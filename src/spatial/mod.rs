//! Spatial indexing for O(log n) hit testing.
//!
//! An R-tree over effective node rectangles backs pointer-target resolution
//! and region queries.

mod rtree;

pub use rtree::{NodeRegion, SpatialIndex};
