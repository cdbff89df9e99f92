//! Brute-force census of surviving components.
//!
//! Independent of the component sizes the selection pass maintains: it flood
//! fills over parent/child links, skipping near-failed nodes. Used to check
//! the outcome of a run.

use serde::Serialize;

use crate::graph::store::TreeStore;
use crate::types::NodeId;

/// A maximal connected set of nodes that are neither selected nor near.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurvivingComponent {
    /// Topmost node of the component.
    pub top: NodeId,
    pub nodes: Vec<NodeId>,
}

impl SurvivingComponent {
    pub fn size(&self) -> usize {
        self.nodes.len()
    }
}

/// Every surviving component, largest first (ties by topmost id).
pub fn surviving_components(store: &TreeStore) -> Vec<SurvivingComponent> {
    let mut seen = vec![false; store.len()];
    let mut components = Vec::new();

    for start in store.ids() {
        if seen[start.index()] || store.is_near(start) {
            continue;
        }
        seen[start.index()] = true;
        let mut nodes = Vec::new();
        let mut top = start;
        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            nodes.push(n);
            let neighbors = store
                .parent(n)
                .into_iter()
                .chain(store.children(n).iter().copied());
            for m in neighbors {
                if !seen[m.index()] && !store.is_near(m) {
                    seen[m.index()] = true;
                    stack.push(m);
                }
            }
            let is_top = match store.parent(n) {
                Some(p) => store.is_near(p),
                None => true,
            };
            if is_top {
                top = n;
            }
        }
        nodes.sort();
        components.push(SurvivingComponent { top, nodes });
    }

    components.sort_by(|a, b| b.size().cmp(&a.size()).then(a.top.cmp(&b.top)));
    components
}

/// Size of the largest surviving component, 0 if nothing survives.
pub fn largest_surviving(store: &TreeStore) -> usize {
    surviving_components(store)
        .first()
        .map_or(0, SurvivingComponent::size)
}

/// Whether every surviving component has fewer than `k` nodes.
pub fn verify(store: &TreeStore, k: usize) -> bool {
    largest_surviving(store) < k
}
