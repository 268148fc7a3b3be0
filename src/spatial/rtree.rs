//! R-tree spatial index over node rectangles, using the rstar crate.
//!
//! Backs pointer hit-testing: resolving a pointer-down to the node under the
//! cursor, and region queries over the effective (offset-merged) world-space
//! rects. Rebuilt from scratch whenever geometry changes; nodes carry their
//! draw order so overlapping manually-dragged nodes resolve to the one drawn
//! last.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geom::{Rect, Vec2};

/// One node's effective world-space rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRegion {
    /// The display-tree node id.
    pub id: String,
    /// Effective rect (base layout + manual offset).
    pub rect: Rect,
    /// Document/draw order; higher draws later and wins hit-testing ties.
    pub order: usize,
}

impl NodeRegion {
    pub fn new(id: impl Into<String>, rect: Rect, order: usize) -> Self {
        Self {
            id: id.into(),
            rect,
            order,
        }
    }
}

impl RTreeObject for NodeRegion {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.x, self.rect.y],
            [self.rect.x + self.rect.width, self.rect.y + self.rect.height],
        )
    }
}

impl PointDistance for NodeRegion {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        // Squared distance from the point to the rect (zero inside).
        let clamped_x = point[0].clamp(self.rect.x, self.rect.x + self.rect.width);
        let clamped_y = point[1].clamp(self.rect.y, self.rect.y + self.rect.height);
        let dx = point[0] - clamped_x;
        let dy = point[1] - clamped_y;
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.rect.contains(Vec2::new(point[0], point[1]))
    }
}

/// Spatial index for node hit-testing.
pub struct SpatialIndex {
    tree: RTree<NodeRegion>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Rebuild from a region list; bulk load beats incremental inserts here
    /// since the whole set changes on every relayout.
    pub fn rebuild(&mut self, regions: Vec<NodeRegion>) {
        self.tree = RTree::bulk_load(regions);
    }

    /// The topmost node containing a world-space point.
    pub fn hit_test(&self, point: Vec2) -> Option<&NodeRegion> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .max_by_key(|region| region.order)
    }

    /// The node nearest to a world-space point (by rect distance).
    pub fn nearest(&self, point: Vec2) -> Option<&NodeRegion> {
        self.tree.nearest_neighbor(&[point.x, point.y])
    }

    /// All nodes whose rects intersect a world-space rectangle.
    pub fn in_rect(&self, area: Rect) -> Vec<&NodeRegion> {
        let envelope = AABB::from_corners(
            [area.x, area.y],
            [area.x + area.width, area.y + area.height],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
