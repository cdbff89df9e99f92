//! Read-side reporting over a finished run.
//!
//! Nothing here mutates the tree. [`FailureReport`] is the serializable
//! summary the CLI prints as JSON; [`render_tree`] is the indented text dump.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Result;
use crate::graph::census::surviving_components;
use crate::graph::selection::SelectionOutcome;
use crate::graph::store::TreeStore;
use crate::graph::traversal::NeighborhoodQuery;
use crate::labels::auto_labels;
use crate::types::{LookaheadPolicy, NodeId};

/// Number of selected nodes in the subtree rooted at `node`.
pub fn num_selected(store: &TreeStore, node: NodeId) -> usize {
    NeighborhoodQuery::new(store)
        .pre_order(node)
        .into_iter()
        .filter(|&id| store.is_selected(id))
        .count()
}

/// Number of near-failed nodes in the whole tree.
pub fn num_near(store: &TreeStore) -> usize {
    store.ids().filter(|&id| store.is_near(id)).count()
}

// ---------------------------------------------------------------------------
// FailureReport
// ---------------------------------------------------------------------------

/// Serializable summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub k: usize,
    pub l: usize,
    pub policy: LookaheadPolicy,
    pub nodes: usize,
    /// Labels of the selected nodes, in selection order.
    pub selected: Vec<String>,
    pub num_selected: usize,
    pub num_near: usize,
    pub surviving_components: usize,
    pub largest_surviving: usize,
    /// Every surviving component is smaller than `k`.
    pub guarantee_holds: bool,
    pub recompute_passes: usize,
}

impl FailureReport {
    pub fn build(store: &TreeStore, outcome: &SelectionOutcome) -> Self {
        let labels = auto_labels(store);
        let components = surviving_components(store);
        let largest = components.first().map_or(0, |c| c.size());
        Self {
            k: outcome.params.k,
            l: outcome.params.l,
            policy: outcome.policy,
            nodes: store.len(),
            selected: outcome
                .selected()
                .into_iter()
                .map(|id| labels[id.index()].clone())
                .collect(),
            num_selected: num_selected(store, store.root()),
            num_near: num_near(store),
            surviving_components: components.len(),
            largest_surviving: largest,
            guarantee_holds: largest < outcome.params.k,
            recompute_passes: outcome.recompute_passes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Indented dump of every node with its flags and children, two spaces per
/// level.
pub fn render_tree(store: &TreeStore) -> String {
    let labels = auto_labels(store);
    let mut out = String::new();
    let mut stack = vec![(store.root(), 0usize)];
    while let Some((id, level)) = stack.pop() {
        let indent = "  ".repeat(level);
        let node = &store[id];
        let _ = writeln!(out, "{indent}{}:", labels[id.index()]);
        let _ = writeln!(out, "{indent}selected = {}", node.selected);
        let _ = writeln!(out, "{indent}near = {}", node.near);
        let _ = writeln!(out, "{indent}component size = {}", node.component_size);
        if !node.is_leaf() {
            let names: Vec<&str> = node
                .children
                .iter()
                .map(|c| labels[c.index()].as_str())
                .collect();
            let _ = writeln!(out, "{indent}children: {}", names.join(", "));
        }
        for &child in node.children.iter().rev() {
            stack.push((child, level + 1));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::selection::compute_failure_set;
    use pretty_assertions::assert_eq;

    fn small() -> TreeStore {
        let mut store = TreeStore::with_root("r");
        let a = store.add_named_child(NodeId::ROOT, "a").unwrap();
        store.add_named_child(a, "a1").unwrap();
        store.add_named_child(NodeId::ROOT, "b").unwrap();
        store
    }

    #[test]
    fn num_selected_counts_subtree_only() {
        let mut store = small();
        let a = store.find_by_name("a").unwrap();
        let b = store.find_by_name("b").unwrap();
        store.slot_mut(a).selected = true;
        store.slot_mut(b).selected = true;

        assert_eq!(num_selected(&store, NodeId::ROOT), 2);
        assert_eq!(num_selected(&store, a), 1);
        assert_eq!(num_selected(&store, store.find_by_name("a1").unwrap()), 0);
    }

    #[test]
    fn report_summarises_run() {
        let mut store = small();
        let outcome = compute_failure_set(&mut store, 2, 0).unwrap();
        let report = FailureReport::build(&store, &outcome);

        assert_eq!(report.k, 2);
        assert_eq!(report.nodes, 4);
        let expected: Vec<String> = outcome
            .selected()
            .iter()
            .map(|&id| store.name(id).unwrap().to_string())
            .collect();
        assert_eq!(report.selected, expected);
        assert_eq!(report.num_selected, outcome.num_selected());
        assert!(report.guarantee_holds);
        assert!(report.largest_surviving < 2);

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["policy"], "frontier");
        assert_eq!(value["k"], 2);
    }

    #[test]
    fn render_lists_flags_and_children() {
        let store = small();
        let text = render_tree(&store);
        let expected = "\
r:
selected = false
near = false
component size = 0
children: a, b
  a:
  selected = false
  near = false
  component size = 0
  children: a1
    a1:
    selected = false
    near = false
    component size = 0
  b:
  selected = false
  near = false
  component size = 0
";
        assert_eq!(text, expected);
    }
}
