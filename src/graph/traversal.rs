//! Bounded-radius traversal over a [`TreeStore`].
//!
//! All queries are read-only and work purely on parent/child links, so none
//! of them need `TreeStore::finalize`. Recursion is replaced by explicit
//! frontiers and stacks; a long chain cannot blow the call stack.
//!
//! Generation and radius arguments are signed: a negative bound is a valid
//! input and yields an empty result, which keeps the `d - i - 2` arithmetic
//! in [`NeighborhoodQuery::neighborhood`] free of special cases.

use std::collections::HashMap;

use crate::graph::store::TreeStore;
use crate::types::NodeId;

/// Traversal primitives bound to one store.
pub struct NeighborhoodQuery<'a> {
    store: &'a TreeStore,
}

impl<'a> NeighborhoodQuery<'a> {
    /// Create a new query bound to the given store.
    pub fn new(store: &'a TreeStore) -> Self {
        Self { store }
    }

    // -------------------------------------------------------------------
    // ancestor
    // -------------------------------------------------------------------

    /// The node `i` hops up the parent chain. `ancestor(n, 0) == Some(n)`;
    /// `None` once the walk passes the root.
    pub fn ancestor(&self, node: NodeId, i: usize) -> Option<NodeId> {
        let mut current = node;
        for _ in 0..i {
            current = self.store.parent(current)?;
        }
        Some(current)
    }

    // -------------------------------------------------------------------
    // descendants
    // -------------------------------------------------------------------

    /// Nodes exactly `g` hops below `node`, left to right.
    pub fn descendants_at_generation(&self, node: NodeId, g: isize) -> Vec<NodeId> {
        if g < 0 {
            return Vec::new();
        }
        let mut frontier = vec![node];
        for _ in 0..g {
            frontier = self.next_generation(&frontier);
            if frontier.is_empty() {
                break;
            }
        }
        frontier
    }

    /// Nodes at most `g` hops below `node` (including `node`), generation by
    /// generation.
    pub fn descendants_up_to(&self, node: NodeId, g: isize) -> Vec<NodeId> {
        if g < 0 {
            return Vec::new();
        }
        let mut out = vec![node];
        let mut frontier = vec![node];
        let mut generation = 0;
        while generation < g && !frontier.is_empty() {
            frontier = self.next_generation(&frontier);
            out.extend_from_slice(&frontier);
            generation += 1;
        }
        out
    }

    fn next_generation(&self, frontier: &[NodeId]) -> Vec<NodeId> {
        frontier
            .iter()
            .flat_map(|&n| self.store.children(n).iter().copied())
            .collect()
    }

    // -------------------------------------------------------------------
    // siblings
    // -------------------------------------------------------------------

    /// The other children of `node`'s parent. Empty for the root.
    pub fn siblings(&self, node: NodeId) -> Vec<NodeId> {
        match self.store.parent(node) {
            Some(parent) => self
                .store
                .children(parent)
                .iter()
                .copied()
                .filter(|&c| c != node)
                .collect(),
            None => Vec::new(),
        }
    }

    // -------------------------------------------------------------------
    // neighborhood
    // -------------------------------------------------------------------

    /// Every node within undirected distance `d` of `node`.
    ///
    /// Walks up one ancestor at a time. At ancestor `a = ancestor(node, i)`
    /// the budget left for a sibling subtree is `d - i - 2` (one hop up to
    /// `a`'s parent, one hop down to the sibling), and only siblings of `a`
    /// are entered, so the branch the walk came from is never revisited. The
    /// result has no duplicates.
    pub fn neighborhood(&self, node: NodeId, d: isize) -> Vec<NodeId> {
        if d < 0 {
            return Vec::new();
        }
        let mut out = self.descendants_up_to(node, d);
        let mut current = node;
        let mut i: isize = 0;
        loop {
            for sibling in self.siblings(current) {
                out.extend(self.descendants_up_to(sibling, d - i - 2));
            }
            if i == d {
                break;
            }
            match self.store.parent(current) {
                Some(parent) => {
                    current = parent;
                    i += 1;
                    out.push(current);
                }
                None => break,
            }
        }
        out
    }

    // -------------------------------------------------------------------
    // distance
    // -------------------------------------------------------------------

    /// Undirected hop count between two nodes of the same tree.
    pub fn distance(&self, a: NodeId, b: NodeId) -> usize {
        let mut up_from_a = HashMap::new();
        let mut current = Some(a);
        let mut hops = 0usize;
        while let Some(n) = current {
            up_from_a.insert(n, hops);
            current = self.store.parent(n);
            hops += 1;
        }

        let mut current = Some(b);
        let mut hops = 0usize;
        while let Some(n) = current {
            if let Some(&from_a) = up_from_a.get(&n) {
                return from_a + hops;
            }
            current = self.store.parent(n);
            hops += 1;
        }
        // Different trees cannot happen inside one store.
        usize::MAX
    }

    // -------------------------------------------------------------------
    // orders
    // -------------------------------------------------------------------

    /// Post-order of the subtree at `node`: children left to right, then the
    /// node itself.
    pub fn post_order(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(node, false)];
        while let Some((n, expanded)) = stack.pop() {
            if expanded {
                out.push(n);
                continue;
            }
            stack.push((n, true));
            for &child in self.store.children(n).iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    /// Pre-order of the subtree at `node`.
    pub fn pre_order(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.store.children(n).iter().rev().copied());
        }
        out
    }
}
