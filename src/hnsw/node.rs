//! Graph nodes and their per-layer neighbor lists.

use smallvec::SmallVec;

/// Bounded set of neighbor ids on one layer.
///
/// Lists stay small (at most `2M`, typically well under 64 ids), so the
/// inline buffer keeps most of them off the heap. Order within a list carries
/// no meaning.
#[derive(Debug, Clone, Default)]
pub(crate) struct NeighborList {
    ids: SmallVec<[usize; 16]>,
}

impl NeighborList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Linear scan over the whole list, last element included.
    pub(crate) fn contains(&self, id: usize) -> bool {
        self.ids.iter().any(|&n| n == id)
    }

    pub(crate) fn push(&mut self, id: usize) {
        self.ids.push(id);
    }

    /// Replace the whole list after a re-selection.
    pub(crate) fn replace(&mut self, ids: Vec<usize>) {
        self.ids = SmallVec::from_vec(ids);
    }
}

/// One graph node: a fixed top layer and one neighbor list per layer.
///
/// The top layer is drawn once at allocation and never changes; the node
/// participates in layers `0..=max_layer` and only those.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    connections: Vec<NeighborList>,
}

impl Node {
    pub(crate) fn new(max_layer: usize) -> Self {
        Self {
            connections: vec![NeighborList::new(); max_layer + 1],
        }
    }

    pub(crate) fn max_layer(&self) -> usize {
        self.connections.len() - 1
    }

    pub(crate) fn layer_count(&self) -> usize {
        self.connections.len()
    }

    pub(crate) fn neighbors(&self, layer: usize) -> &NeighborList {
        &self.connections[layer]
    }

    pub(crate) fn neighbors_mut(&mut self, layer: usize) -> &mut NeighborList {
        &mut self.connections[layer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_sees_every_element() {
        let mut list = NeighborList::new();
        for id in [4, 9, 2] {
            list.push(id);
        }
        assert!(list.contains(4));
        assert!(list.contains(9));
        // The last element must be visible to the scan.
        assert!(list.contains(2));
        assert!(!list.contains(7));
    }

    #[test]
    fn replace_swaps_contents() {
        let mut list = NeighborList::new();
        list.push(1);
        list.push(2);
        list.replace(vec![8, 9]);
        assert_eq!(list.ids(), &[8, 9]);
        assert!(!list.contains(1));
    }

    #[test]
    fn node_has_one_list_per_layer() {
        let node = Node::new(3);
        assert_eq!(node.max_layer(), 3);
        assert_eq!(node.layer_count(), 4);
        for layer in 0..=3 {
            assert!(node.neighbors(layer).is_empty());
        }
    }

    #[test]
    fn lists_are_independent_across_layers() {
        let mut node = Node::new(1);
        node.neighbors_mut(0).push(5);
        assert_eq!(node.neighbors(0).len(), 1);
        assert!(node.neighbors(1).is_empty());
    }
}
