//! StreamArena - indexed view of the stream hierarchy.
//!
//! The hierarchy source delivers a flat record list with parent
//! back-references. The arena rebuilds an explicit tree from it: petgraph's
//! StableGraph holds the topology (one parent→child edge per back-reference),
//! and ordered child lists are precomputed so every traversal sees siblings
//! in `created_at` order without re-sorting.
//!
//! The arena is rebuilt wholesale on every hierarchy push; it never mutates
//! incrementally.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::NodeIndexable;
use petgraph::{Directed, Direction};
use std::collections::{HashMap, HashSet};

use super::record::Stream;

/// Indexed stream hierarchy.
pub struct StreamArena {
    /// Topology: nodes carry the stream record, edges point parent→child.
    graph: StableGraph<Stream, (), Directed>,

    /// Map from stream id to graph index.
    id_to_index: HashMap<String, NodeIndex>,

    /// Root indices in sibling order. A stream whose parent id does not
    /// resolve is treated as a root (orphan-safe).
    roots: Vec<NodeIndex>,

    /// Ordered children per node slot, sorted by (created_at, id).
    children: Vec<Vec<NodeIndex>>,
}

impl StreamArena {
    /// Build an arena from a record list.
    ///
    /// Records with a duplicate id are dropped (first occurrence wins).
    /// Self-references are treated as missing parents.
    pub fn build(streams: &[Stream]) -> Self {
        let mut graph: StableGraph<Stream, (), Directed> =
            StableGraph::with_capacity(streams.len(), streams.len());
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::with_capacity(streams.len());

        for stream in streams {
            if id_to_index.contains_key(&stream.id) {
                continue;
            }
            let index = graph.add_node(stream.clone());
            id_to_index.insert(stream.id.clone(), index);
        }

        // Wire parent→child edges where the back-reference resolves.
        let indices: Vec<NodeIndex> = graph.node_indices().collect();
        for &index in &indices {
            let (child_id, parent_id) = {
                let stream = &graph[index];
                (stream.id.clone(), stream.parent_stream_id.clone())
            };
            if let Some(parent_id) = parent_id {
                if parent_id != child_id {
                    if let Some(&parent_index) = id_to_index.get(&parent_id) {
                        graph.add_edge(parent_index, index, ());
                    }
                }
            }
        }

        // Precompute ordered child lists and the root list.
        let slot_count = graph.node_bound();
        let mut children: Vec<Vec<NodeIndex>> = vec![Vec::new(); slot_count];
        let mut roots: Vec<NodeIndex> = Vec::new();

        for &index in &indices {
            let mut kids: Vec<NodeIndex> = graph
                .neighbors_directed(index, Direction::Outgoing)
                .collect();
            Self::sort_siblings(&graph, &mut kids);
            children[index.index()] = kids;

            let has_parent = graph
                .neighbors_directed(index, Direction::Incoming)
                .next()
                .is_some();
            if !has_parent {
                roots.push(index);
            }
        }
        Self::sort_siblings(&graph, &mut roots);

        Self {
            graph,
            id_to_index,
            roots,
            children,
        }
    }

    fn sort_siblings(graph: &StableGraph<Stream, (), Directed>, siblings: &mut [NodeIndex]) {
        siblings.sort_by(|&a, &b| {
            let sa = &graph[a];
            let sb = &graph[b];
            sa.created_at
                .cmp(&sb.created_at)
                .then_with(|| sa.id.cmp(&sb.id))
        });
    }

    /// Number of streams in the arena.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Look up a stream by id.
    pub fn get(&self, id: &str) -> Option<&Stream> {
        self.index_of(id).map(|index| &self.graph[index])
    }

    /// The stream stored at a graph index.
    pub fn stream_at(&self, index: NodeIndex) -> &Stream {
        &self.graph[index]
    }

    /// Root indices in sibling order.
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Ordered children of a node.
    pub fn children_of(&self, index: NodeIndex) -> &[NodeIndex] {
        self.children
            .get(index.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parent of a node, if its back-reference resolved.
    pub fn parent_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .next()
    }

    /// Iterate all streams in arbitrary order.
    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.graph.node_weights()
    }

    /// Root→target id chain for a stream, inclusive. Empty if the id is not
    /// in the arena. Guarded against malformed cyclic back-references.
    pub fn ancestor_chain(&self, id: &str) -> Vec<String> {
        let Some(mut index) = self.index_of(id) else {
            return Vec::new();
        };

        let mut chain = vec![self.graph[index].id.clone()];
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        visited.insert(index);

        while let Some(parent) = self.parent_of(index) {
            if !visited.insert(parent) {
                break;
            }
            chain.push(self.graph[parent].id.clone());
            index = parent;
        }

        chain.reverse();
        chain
    }

    /// Total number of streams in the subtree rooted at `index`, inclusive.
    pub fn subtree_size(&self, index: NodeIndex) -> usize {
        let mut count = 0;
        let mut stack = vec![index];
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            count += 1;
            stack.extend(self.children_of(current).iter().copied());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Stream> {
        vec![
            Stream::new("root", "Root").with_created_at(1),
            Stream::new("b", "B").with_parent("root").with_created_at(2),
            Stream::new("c", "C").with_parent("root").with_created_at(3),
            Stream::new("d", "D").with_parent("b").with_created_at(4),
        ]
    }

    #[test]
    fn test_build_and_lookup() {
        let arena = StreamArena::build(&sample());
        assert_eq!(arena.len(), 4);
        assert!(arena.contains("root"));
        assert!(arena.contains("d"));
        assert!(!arena.contains("zzz"));
        assert_eq!(arena.get("b").map(|s| s.title.as_str()), Some("B"));
    }

    #[test]
    fn test_children_ordered_by_created_at() {
        let mut streams = sample();
        // Swap creation order so "c" precedes "b"
        streams[1].created_at = 10;
        let arena = StreamArena::build(&streams);
        let root = arena.index_of("root").unwrap();
        let kids: Vec<&str> = arena
            .children_of(root)
            .iter()
            .map(|&i| arena.stream_at(i).id.as_str())
            .collect();
        assert_eq!(kids, vec!["c", "b"]);
    }

    #[test]
    fn test_created_at_tie_breaks_on_id() {
        let streams = vec![
            Stream::new("root", "Root"),
            Stream::new("z", "Z").with_parent("root").with_created_at(5),
            Stream::new("a", "A").with_parent("root").with_created_at(5),
        ];
        let arena = StreamArena::build(&streams);
        let root = arena.index_of("root").unwrap();
        let kids: Vec<&str> = arena
            .children_of(root)
            .iter()
            .map(|&i| arena.stream_at(i).id.as_str())
            .collect();
        assert_eq!(kids, vec!["a", "z"]);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let streams = vec![
            Stream::new("root", "Root").with_created_at(1),
            Stream::new("lost", "Lost")
                .with_parent("no-such-id")
                .with_created_at(2),
        ];
        let arena = StreamArena::build(&streams);
        let root_ids: Vec<&str> = arena
            .roots()
            .iter()
            .map(|&i| arena.stream_at(i).id.as_str())
            .collect();
        assert_eq!(root_ids, vec!["root", "lost"]);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let streams = vec![Stream::new("a", "A").with_parent("a")];
        let arena = StreamArena::build(&streams);
        assert_eq!(arena.roots().len(), 1);
        assert!(arena.parent_of(arena.index_of("a").unwrap()).is_none());
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let streams = vec![Stream::new("a", "First"), Stream::new("a", "Second")];
        let arena = StreamArena::build(&streams);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get("a").map(|s| s.title.as_str()), Some("First"));
    }

    #[test]
    fn test_ancestor_chain() {
        let arena = StreamArena::build(&sample());
        assert_eq!(arena.ancestor_chain("d"), vec!["root", "b", "d"]);
        assert_eq!(arena.ancestor_chain("root"), vec!["root"]);
        assert!(arena.ancestor_chain("missing").is_empty());
    }

    #[test]
    fn test_ancestor_chain_strictly_descends() {
        let arena = StreamArena::build(&sample());
        let chain = arena.ancestor_chain("d");
        for pair in chain.windows(2) {
            let parent = arena.index_of(&pair[0]).unwrap();
            let child = arena.index_of(&pair[1]).unwrap();
            assert_eq!(arena.parent_of(child), Some(parent));
        }
    }

    #[test]
    fn test_cyclic_parents_do_not_hang() {
        let streams = vec![
            Stream::new("a", "A").with_parent("b"),
            Stream::new("b", "B").with_parent("a"),
        ];
        let arena = StreamArena::build(&streams);
        // Neither is a root; the chain walk terminates via the visited guard.
        let chain = arena.ancestor_chain("a");
        assert!(chain.len() <= 2);
    }

    #[test]
    fn test_subtree_size() {
        let arena = StreamArena::build(&sample());
        let root = arena.index_of("root").unwrap();
        let b = arena.index_of("b").unwrap();
        assert_eq!(arena.subtree_size(root), 4);
        assert_eq!(arena.subtree_size(b), 2);
        assert_eq!(arena.subtree_size(arena.index_of("d").unwrap()), 1);
    }

    #[test]
    fn test_empty() {
        let arena = StreamArena::build(&[]);
        assert!(arena.is_empty());
        assert!(arena.roots().is_empty());
    }
}
