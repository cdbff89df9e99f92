//! Surviving component sizes.
//!
//! `component_size(n)` is 0 for a near-failed node and otherwise
//! `1 + Σ component_size(child)`: the number of surviving nodes connected to
//! `n` from below. Sizes are not maintained incrementally; callers run a full
//! [`ComponentSizer::recompute`] whenever they need fresh values.

use crate::error::{FailSetError, Result};
use crate::graph::store::TreeStore;
use crate::graph::traversal::NeighborhoodQuery;
use crate::types::NodeId;

/// Recomputes component sizes bottom-up over a whole tree.
///
/// The post-order is captured once at construction; the tree shape must not
/// change between recomputes (flags may). [`recompute`](Self::recompute)
/// rejects a store whose shape no longer matches the captured order.
pub struct ComponentSizer {
    order: Vec<NodeId>,
}

impl ComponentSizer {
    pub fn new(store: &TreeStore) -> Self {
        let order = NeighborhoodQuery::new(store).post_order(store.root());
        Self { order }
    }

    /// The captured post-order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Refresh `component_size` on every node and return the root's size.
    ///
    /// Fails with [`FailSetError::Structural`] when `store` is not the tree
    /// the order was captured from, or has grown since.
    pub fn recompute(&self, store: &mut TreeStore) -> Result<usize> {
        self.check_shape(store)?;
        Ok(fill_sizes(store, &self.order))
    }

    /// The captured order must visit every node of `store` once, children
    /// before their parent.
    fn check_shape(&self, store: &TreeStore) -> Result<()> {
        let mismatch = || {
            FailSetError::Structural(format!(
                "sizer captured {} nodes but the tree does not match (len {})",
                self.order.len(),
                store.len()
            ))
        };
        if self.order.len() != store.len() {
            return Err(mismatch());
        }
        let mut seen = vec![false; store.len()];
        for &id in &self.order {
            let node = store.get(id).ok_or_else(mismatch)?;
            if seen[id.index()] || node.children.iter().any(|c| !seen[c.index()]) {
                return Err(mismatch());
            }
            seen[id.index()] = true;
        }
        Ok(())
    }
}

fn fill_sizes(store: &mut TreeStore, order: &[NodeId]) -> usize {
    for &id in order {
        let size = if store[id].near {
            0
        } else {
            1 + store[id]
                .children
                .iter()
                .map(|&c| store[c].component_size)
                .sum::<usize>()
        };
        store.slot_mut(id).component_size = size;
    }
    store.component_size(store.root())
}

/// One-shot recompute for callers that do not keep a sizer around.
pub fn recompute_component_sizes(store: &mut TreeStore) -> usize {
    let order = NeighborhoodQuery::new(store).post_order(store.root());
    fill_sizes(store, &order)
}
