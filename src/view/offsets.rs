//! Per-node manual displacement from the base layout.
//!
//! Offsets are additive: `effective = base + offset`. The base layout can be
//! recomputed freely (tree shape changes, focus toggles) and dragged nodes
//! keep their displacement, keyed by id. Absolute persisted positions are
//! converted to offsets once at seed time; the engine reports absolute
//! positions back out at drag end, so storage never sees the offset model.

use std::collections::{HashMap, HashSet};

use crate::geom::Vec2;
use crate::layout::TreeNode;

/// Store of manual per-node displacements.
#[derive(Debug, Default)]
pub struct PositionOffsetStore {
    offsets: HashMap<String, Vec2>,
    /// Ids whose offset was already established this session. Seeding never
    /// overwrites these, which keeps a layout recompute from clobbering an
    /// in-progress or finished drag.
    seeded: HashSet<String>,
}

impl PositionOffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert persisted absolute positions into offsets against the current
    /// base layout. Idempotent per id: the first seed wins for the session.
    pub fn seed_from_persisted(&mut self, nodes: &[TreeNode], persisted: &HashMap<String, Vec2>) {
        for node in nodes {
            let Some(&absolute) = persisted.get(&node.id) else {
                continue;
            };
            if self.seeded.contains(&node.id) {
                continue;
            }
            let offset = absolute - Vec2::new(node.x, node.y);
            self.offsets.insert(node.id.clone(), offset);
            self.seeded.insert(node.id.clone());
        }
    }

    /// Replace the offset for one node; used on drag end.
    pub fn set_offset(&mut self, id: &str, offset: Vec2) {
        self.offsets.insert(id.to_string(), offset);
        self.seeded.insert(id.to_string());
    }

    /// The stored offset, zero when absent.
    pub fn offset_of(&self, id: &str) -> Vec2 {
        self.offsets.get(id).copied().unwrap_or(Vec2::ZERO)
    }

    /// Base layout position plus manual offset.
    pub fn effective_position(&self, node: &TreeNode) -> Vec2 {
        Vec2::new(node.x, node.y) + self.offset_of(&node.id)
    }

    /// Drop offsets (and seed marks) for ids no longer in the hierarchy.
    pub fn retain_ids(&mut self, keep: &HashSet<String>) {
        self.offsets.retain(|id, _| keep.contains(id));
        self.seeded.retain(|id| keep.contains(id));
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
        self.seeded.clear();
    }
}
