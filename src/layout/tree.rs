//! Left-to-right tree layout.
//!
//! Assigns base positions to a display tree: depth picks the column, a single
//! leaf counter running across the whole forest picks the row, and parents
//! center over their children. The result is deterministic for a given tree
//! and config; manual drag offsets and the viewport transform are applied
//! downstream.

use serde::{Deserialize, Serialize};

use super::display::{DisplayNode, NodePayload};
use crate::geom::Rect;

/// Spacing and node-size configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    pub padding: f32,
    /// Collapsed placeholders draw at a smaller fixed size.
    pub collapsed_width: f32,
    pub collapsed_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 320.0,
            node_height: 100.0,
            horizontal_spacing: 60.0,
            vertical_spacing: 40.0,
            padding: 40.0,
            collapsed_width: 200.0,
            collapsed_height: 60.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal distance between column origins.
    #[inline]
    pub fn column_pitch(&self) -> f32 {
        self.node_width + self.horizontal_spacing
    }

    /// Vertical distance between leaf rows.
    #[inline]
    pub fn row_pitch(&self) -> f32 {
        self.node_height + self.vertical_spacing
    }
}

/// A positioned node in base layout coordinates (top-left origin).
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub parent_id: Option<String>,
    pub payload: NodePayload,
}

impl TreeNode {
    pub fn is_collapsed_placeholder(&self) -> bool {
        matches!(self.payload, NodePayload::Collapsed { .. })
    }

    /// Base-layout bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// One parent→child edge of the display tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLink {
    pub source_id: String,
    pub target_id: String,
}

/// Layout output: positioned nodes, links, and the bounding box.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    pub nodes: Vec<TreeNode>,
    pub links: Vec<TreeLink>,
    pub width: f32,
    pub height: f32,
}

impl TreeLayout {
    pub fn node(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Compute base positions for a display tree.
///
/// Depth-first, children before parent: a leaf takes the next free row
/// (`leaf_index * row_pitch + padding`), a parent takes the midpoint of its
/// first and last child's y. The leaf counter is shared across the whole
/// forest, so unrelated branches never collide vertically.
pub fn compute_layout(roots: &[DisplayNode], config: &LayoutConfig) -> TreeLayout {
    let mut layout = TreeLayout::default();
    if roots.is_empty() {
        return layout;
    }

    let mut leaf_index = 0usize;
    for root in roots {
        place_node(root, 0, config, &mut leaf_index, &mut layout.nodes);
    }

    // Links after all positions are known, one per parent→child pair.
    for root in roots {
        collect_links(root, &mut layout.links);
    }

    let mut max_x = 0.0f32;
    let mut max_y = 0.0f32;
    for node in &layout.nodes {
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    layout.width = max_x + config.padding;
    layout.height = max_y + config.padding;

    layout
}

/// Place one subtree; returns the node's y so the parent can center itself.
fn place_node(
    node: &DisplayNode,
    depth: usize,
    config: &LayoutConfig,
    leaf_index: &mut usize,
    out: &mut Vec<TreeNode>,
) -> f32 {
    let x = depth as f32 * config.column_pitch() + config.padding;

    // Reserve the output slot so document order is preserved even though a
    // parent's y is only known after its children are placed.
    let slot = out.len();
    let (width, height) = if node.is_placeholder() {
        (config.collapsed_width, config.collapsed_height)
    } else {
        (config.node_width, config.node_height)
    };
    out.push(TreeNode {
        id: node.id.clone(),
        x,
        y: 0.0,
        width,
        height,
        parent_id: node.parent_id.clone(),
        payload: node.payload.clone(),
    });

    let y = if node.children.is_empty() {
        let y = *leaf_index as f32 * config.row_pitch() + config.padding;
        *leaf_index += 1;
        y
    } else {
        let mut first_y = 0.0;
        let mut last_y = 0.0;
        for (i, child) in node.children.iter().enumerate() {
            let child_y = place_node(child, depth + 1, config, leaf_index, out);
            if i == 0 {
                first_y = child_y;
            }
            last_y = child_y;
        }
        (first_y + last_y) / 2.0
    };

    out[slot].y = y;
    y
}

fn collect_links(node: &DisplayNode, out: &mut Vec<TreeLink>) {
    for child in &node.children {
        out.push(TreeLink {
            source_id: node.id.clone(),
            target_id: child.id.clone(),
        });
        collect_links(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::display::build_display_tree;
    use crate::stream::{Stream, StreamArena};

    fn display(streams: &[Stream]) -> Vec<DisplayNode> {
        build_display_tree(&StreamArena::build(streams))
    }

    fn two_leaf_tree() -> Vec<DisplayNode> {
        display(&[
            Stream::new("a", "A").with_created_at(1),
            Stream::new("b", "B").with_parent("a").with_created_at(2),
            Stream::new("c", "C").with_parent("a").with_created_at(3),
        ])
    }

    #[test]
    fn test_two_leaf_scenario() {
        let layout = compute_layout(&two_leaf_tree(), &LayoutConfig::default());

        let a = layout.node("a").unwrap();
        let b = layout.node("b").unwrap();
        let c = layout.node("c").unwrap();

        assert_eq!(a.x, 40.0);
        assert_eq!(b.x, 420.0);
        assert_eq!(c.x, 420.0);
        assert_eq!(b.y, 40.0);
        assert_eq!(c.y, 180.0);
        assert_eq!(a.y, 110.0); // midpoint of 40 and 180
    }

    #[test]
    fn test_determinism() {
        let tree = two_leaf_tree();
        let config = LayoutConfig::default();
        let first = compute_layout(&tree, &config);
        let second = compute_layout(&tree, &config);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.links, second.links);
        assert_eq!(first.width, second.width);
        assert_eq!(first.height, second.height);
    }

    #[test]
    fn test_leaf_rows_do_not_overlap() {
        // Two unrelated branches with interleaved depths.
        let layout = compute_layout(
            &display(&[
                Stream::new("r1", "R1").with_created_at(1),
                Stream::new("r1a", "R1a").with_parent("r1").with_created_at(2),
                Stream::new("r1b", "R1b").with_parent("r1").with_created_at(3),
                Stream::new("r2", "R2").with_created_at(4),
                Stream::new("r2a", "R2a").with_parent("r2").with_created_at(5),
            ]),
            &LayoutConfig::default(),
        );

        let mut leaves: Vec<&TreeNode> = layout
            .nodes
            .iter()
            .filter(|n| !layout.links.iter().any(|l| l.source_id == n.id))
            .collect();
        leaves.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());

        for pair in leaves.windows(2) {
            assert!(
                pair[0].y + pair[0].height <= pair[1].y,
                "leaf rows overlap: {} and {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    #[test]
    fn test_parent_centering() {
        let layout = compute_layout(
            &display(&[
                Stream::new("p", "P").with_created_at(1),
                Stream::new("c1", "C1").with_parent("p").with_created_at(2),
                Stream::new("c2", "C2").with_parent("p").with_created_at(3),
                Stream::new("c3", "C3").with_parent("p").with_created_at(4),
            ]),
            &LayoutConfig::default(),
        );

        let p = layout.node("p").unwrap();
        let c1 = layout.node("c1").unwrap();
        let c3 = layout.node("c3").unwrap();
        assert_eq!(p.y, (c1.y + c3.y) / 2.0);
    }

    #[test]
    fn test_single_child_parent_shares_row() {
        let layout = compute_layout(
            &display(&[
                Stream::new("p", "P").with_created_at(1),
                Stream::new("c", "C").with_parent("p").with_created_at(2),
            ]),
            &LayoutConfig::default(),
        );
        let p = layout.node("p").unwrap();
        let c = layout.node("c").unwrap();
        assert_eq!(p.y, c.y);
    }

    #[test]
    fn test_links_one_per_edge() {
        let layout = compute_layout(&two_leaf_tree(), &LayoutConfig::default());
        assert_eq!(layout.links.len(), 2);
        assert!(layout
            .links
            .iter()
            .all(|l| l.source_id == "a" && (l.target_id == "b" || l.target_id == "c")));
    }

    #[test]
    fn test_empty_tree() {
        let layout = compute_layout(&[], &LayoutConfig::default());
        assert!(layout.nodes.is_empty());
        assert!(layout.links.is_empty());
        assert_eq!(layout.width, 0.0);
        assert_eq!(layout.height, 0.0);
    }

    #[test]
    fn test_bounding_box_covers_nodes() {
        let layout = compute_layout(&two_leaf_tree(), &LayoutConfig::default());
        for node in &layout.nodes {
            assert!(node.x + node.width <= layout.width);
            assert!(node.y + node.height <= layout.height);
        }
        // Right column at x=420, width 320, padding 40
        assert_eq!(layout.width, 420.0 + 320.0 + 40.0);
    }

    #[test]
    fn test_forest_keeps_counting_rows() {
        let layout = compute_layout(
            &display(&[
                Stream::new("r1", "R1").with_created_at(1),
                Stream::new("r2", "R2").with_created_at(2),
                Stream::new("r3", "R3").with_created_at(3),
            ]),
            &LayoutConfig::default(),
        );
        assert_eq!(layout.node("r1").unwrap().y, 40.0);
        assert_eq!(layout.node("r2").unwrap().y, 180.0);
        assert_eq!(layout.node("r3").unwrap().y, 320.0);
    }
}
