//! Focus mode - reduce the display tree to one lineage.
//!
//! Given a focused stream id, the projector keeps the root→focused ancestor
//! chain and the focused node's full subtree, and folds every off-path
//! sibling group into a single collapsed placeholder. The projection is
//! tree→tree so it can feed the normal layout engine; a post-pass pins the
//! chain onto one horizontal row and the placeholders onto a second row,
//! turning the branching layout into a timeline.

use std::collections::HashSet;

use super::display::{DisplayNode, NodePayload};
use super::tree::{LayoutConfig, TreeNode};

/// Result of projecting the display tree through focus state.
#[derive(Debug, Clone)]
pub struct FocusProjection {
    /// The (possibly reduced) display tree.
    pub roots: Vec<DisplayNode>,
    /// Root→focused id chain; empty when unfocused or the target is missing.
    pub ancestor_chain: Vec<String>,
}

impl FocusProjection {
    /// Whether the projection is actually reduced (a focus target was found).
    pub fn is_focused(&self) -> bool {
        !self.ancestor_chain.is_empty()
    }

    /// Whether `id` is present as a real (non-placeholder) node.
    pub fn contains_stream(&self, id: &str) -> bool {
        fn walk(nodes: &[DisplayNode], id: &str) -> bool {
            nodes.iter().any(|n| {
                (!n.is_placeholder() && n.id == id) || walk(&n.children, id)
            })
        }
        walk(&self.roots, id)
    }
}

/// Project the display tree through an optional focus target.
///
/// A missing or unknown id degrades to the unchanged tree with no chain.
pub fn project(roots: &[DisplayNode], focused_id: Option<&str>) -> FocusProjection {
    let Some(focused_id) = focused_id else {
        return FocusProjection {
            roots: roots.to_vec(),
            ancestor_chain: Vec::new(),
        };
    };

    let chain = ancestor_chain(roots, focused_id);
    if chain.is_empty() {
        return FocusProjection {
            roots: roots.to_vec(),
            ancestor_chain: Vec::new(),
        };
    }

    let ancestor_set: HashSet<&str> = chain.iter().map(String::as_str).collect();
    debug_assert_eq!(ancestor_set.len(), chain.len());

    let projected = project_level(roots, None, focused_id, &ancestor_set);
    FocusProjection {
        roots: projected,
        ancestor_chain: chain,
    }
}

/// Root→target id path found by depth-first search, inclusive. Empty when
/// the target id is not in the tree.
pub fn ancestor_chain(roots: &[DisplayNode], target: &str) -> Vec<String> {
    let mut path: Vec<String> = Vec::new();
    fn dfs(node: &DisplayNode, target: &str, path: &mut Vec<String>) -> bool {
        path.push(node.id.clone());
        if node.id == target {
            return true;
        }
        for child in &node.children {
            if dfs(child, target, path) {
                return true;
            }
        }
        path.pop();
        false
    }
    for root in roots {
        if dfs(root, target, &mut path) {
            return path;
        }
    }
    Vec::new()
}

/// Partition one sibling level into on-path nodes and a collapsed remainder.
fn project_level(
    siblings: &[DisplayNode],
    parent_id: Option<&str>,
    focused_id: &str,
    ancestor_set: &HashSet<&str>,
) -> Vec<DisplayNode> {
    let (on_path, off_path): (Vec<&DisplayNode>, Vec<&DisplayNode>) = siblings
        .iter()
        .partition(|n| ancestor_set.contains(n.id.as_str()));

    let mut result: Vec<DisplayNode> = Vec::with_capacity(on_path.len() + 1);

    for node in on_path {
        if node.id == focused_id {
            // The payload the user asked to see: full subtree, unfiltered.
            result.push(node.clone());
        } else {
            // Proper ancestor: only the path toward the focus keeps expanding.
            let mut kept = node.clone();
            kept.children =
                project_level(&node.children, Some(&node.id), focused_id, ancestor_set);
            result.push(kept);
        }
    }

    if !off_path.is_empty() {
        // Re-projecting an already-collapsed level must be a no-op.
        if off_path.len() == 1 && off_path[0].is_placeholder() {
            result.push(off_path[0].clone());
        } else {
            result.push(collapse_group(&off_path, parent_id));
        }
    }

    result
}

/// Fold a group of off-path siblings (and their subtrees) into one node.
fn collapse_group(group: &[&DisplayNode], parent_id: Option<&str>) -> DisplayNode {
    let mut original_ids: Vec<String> = Vec::new();
    let mut count = 0usize;
    for node in group {
        node.collect_stream_ids(&mut original_ids);
        count += node.subtree_stream_count();
    }

    let first = original_ids
        .first()
        .map(String::as_str)
        .unwrap_or("root");
    DisplayNode {
        id: format!("collapsed-{first}"),
        parent_id: parent_id.map(str::to_string),
        payload: NodePayload::Collapsed {
            count,
            original_ids,
        },
        children: Vec::new(),
    }
}

/// Timeline override: pin ancestor-chain nodes to one shared row and
/// collapsed placeholders to a second row below it. This adjusts laid-out
/// y values only; the layout engine's contract is untouched.
pub fn align_timeline_rows(nodes: &mut [TreeNode], chain: &[String], config: &LayoutConfig) {
    if chain.is_empty() {
        return;
    }
    let chain_set: HashSet<&str> = chain.iter().map(String::as_str).collect();
    let chain_row = config.padding;
    let collapsed_row = config.padding + config.node_height + config.vertical_spacing;

    for node in nodes.iter_mut() {
        if node.is_collapsed_placeholder() {
            node.y = collapsed_row;
        } else if chain_set.contains(node.id.as_str()) {
            node.y = chain_row;
        }
    }
}
