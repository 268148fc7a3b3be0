//! Display tree - the hierarchy actually handed to the layout engine.
//!
//! A display node is either a real stream or a collapsed placeholder standing
//! in for a folded-away subtree group (focus mode). The tree is rebuilt from
//! the arena on every update and owns deep clones of the records it shows.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;

use crate::stream::{Stream, StreamArena};

/// What a display node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// A real stream record.
    Stream(Stream),
    /// A synthetic placeholder for one or more collapsed subtrees.
    Collapsed {
        /// Descendant-inclusive number of streams folded into this node.
        count: usize,
        /// Every stream id inside the collapsed subtrees, document order.
        original_ids: Vec<String>,
    },
}

/// One node of the display tree, carrying its children recursively.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub payload: NodePayload,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.payload, NodePayload::Collapsed { .. })
    }

    /// Display title: the stream title, or "<n> stream(s)" for placeholders.
    pub fn title(&self) -> String {
        match &self.payload {
            NodePayload::Stream(stream) => stream.title.clone(),
            NodePayload::Collapsed { count, .. } => {
                if *count == 1 {
                    "1 stream".to_string()
                } else {
                    format!("{count} streams")
                }
            }
        }
    }

    /// Number of streams this node stands for (1 for a real stream).
    pub fn stream_count(&self) -> usize {
        match &self.payload {
            NodePayload::Stream(_) => 1,
            NodePayload::Collapsed { count, .. } => *count,
        }
    }

    /// Ids of every real stream in this subtree, document order.
    pub fn collect_stream_ids(&self, out: &mut Vec<String>) {
        match &self.payload {
            NodePayload::Stream(stream) => out.push(stream.id.clone()),
            NodePayload::Collapsed { original_ids, .. } => {
                out.extend(original_ids.iter().cloned())
            }
        }
        for child in &self.children {
            child.collect_stream_ids(out);
        }
    }

    /// Total streams in this subtree, placeholders counted by their fold size.
    pub fn subtree_stream_count(&self) -> usize {
        self.stream_count()
            + self
                .children
                .iter()
                .map(DisplayNode::subtree_stream_count)
                .sum::<usize>()
    }
}

/// Build the full (unfocused) display tree from the arena.
///
/// Roots and siblings come out in the arena's `created_at` order.
pub fn build_display_tree(arena: &StreamArena) -> Vec<DisplayNode> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    arena
        .roots()
        .iter()
        .filter_map(|&root| build_node(arena, root, None, &mut visited))
        .collect()
}

fn build_node(
    arena: &StreamArena,
    index: NodeIndex,
    parent_id: Option<&str>,
    visited: &mut HashSet<NodeIndex>,
) -> Option<DisplayNode> {
    if !visited.insert(index) {
        return None;
    }

    let stream = arena.stream_at(index).clone();
    let id = stream.id.clone();
    let children = arena
        .children_of(index)
        .iter()
        .filter_map(|&child| build_node(arena, child, Some(&id), visited))
        .collect();

    Some(DisplayNode {
        id,
        parent_id: parent_id.map(str::to_string),
        payload: NodePayload::Stream(stream),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_arena() -> StreamArena {
        StreamArena::build(&[
            Stream::new("a", "A").with_created_at(1),
            Stream::new("b", "B").with_parent("a").with_created_at(2),
            Stream::new("c", "C").with_parent("a").with_created_at(3),
            Stream::new("d", "D").with_parent("b").with_created_at(4),
        ])
    }

    #[test]
    fn test_build_display_tree_shape() {
        let tree = build_display_tree(&sample_arena());
        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.id, "a");
        assert!(root.parent_id.is_none());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].id, "b");
        assert_eq!(root.children[1].id, "c");
        assert_eq!(root.children[0].children[0].id, "d");
        assert_eq!(
            root.children[0].children[0].parent_id.as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_subtree_stream_count() {
        let tree = build_display_tree(&sample_arena());
        assert_eq!(tree[0].subtree_stream_count(), 4);
        assert_eq!(tree[0].children[0].subtree_stream_count(), 2);
    }

    #[test]
    fn test_collect_stream_ids_document_order() {
        let tree = build_display_tree(&sample_arena());
        let mut ids = Vec::new();
        tree[0].collect_stream_ids(&mut ids);
        assert_eq!(ids, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_placeholder_title_pluralizes() {
        let one = DisplayNode {
            id: "collapsed-x".into(),
            parent_id: None,
            payload: NodePayload::Collapsed {
                count: 1,
                original_ids: vec!["x".into()],
            },
            children: Vec::new(),
        };
        assert_eq!(one.title(), "1 stream");

        let many = DisplayNode {
            payload: NodePayload::Collapsed {
                count: 3,
                original_ids: vec!["x".into(), "y".into(), "z".into()],
            },
            ..one
        };
        assert_eq!(many.title(), "3 streams");
    }

    #[test]
    fn test_empty_arena() {
        let arena = StreamArena::build(&[]);
        assert!(build_display_tree(&arena).is_empty());
    }
}
