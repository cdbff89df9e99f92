//! Failure-set selection.
//!
//! One post-order pass over the tree. At every node, once all children are
//! settled, component sizes are recomputed for the whole tree and the node is
//! selected if an oversized surviving component (size ≥ k) is in sight that
//! its parent could no longer absorb:
//!
//! - **Lookahead**: some node on the lookahead horizon below it is oversized.
//!   Under [`LookaheadPolicy::Frontier`] the horizon is the generation-`l`
//!   frontier; anything closer still lies inside the parent's radius and is
//!   deferred upward. [`LookaheadPolicy::Horizon`] checks generations
//!   `0..=l`.
//! - **Root fallback**: the root has nobody to defer to and is selected if
//!   any node within `l` generations below it is oversized.
//!
//! Selecting a node marks its radius-`l` neighborhood near-failed and zeroes
//! their sizes immediately.

use serde::{Deserialize, Serialize};

use crate::error::{FailSetError, Result};
use crate::graph::sizing::ComponentSizer;
use crate::graph::store::TreeStore;
use crate::graph::traversal::NeighborhoodQuery;
use crate::types::{FailureParams, LookaheadPolicy, NodeId};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which rule forced a node into the failure set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    Lookahead,
    RootFallback,
}

/// One entry of the failure set, in the order it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub node: NodeId,
    pub reason: SelectionReason,
    /// Nodes that became near-failed because of this selection.
    pub newly_near: usize,
}

/// Summary of a finished run. The tree itself carries the per-node flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub params: FailureParams,
    pub policy: LookaheadPolicy,
    pub selections: Vec<Selection>,
    pub near_count: usize,
    pub recompute_passes: usize,
}

impl SelectionOutcome {
    /// Selected ids in selection (post-) order.
    pub fn selected(&self) -> Vec<NodeId> {
        self.selections.iter().map(|s| s.node).collect()
    }

    pub fn num_selected(&self) -> usize {
        self.selections.len()
    }
}

// ---------------------------------------------------------------------------
// SelectionEngine
// ---------------------------------------------------------------------------

/// Runs the selection pass on a tree.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    params: FailureParams,
    policy: LookaheadPolicy,
}

impl SelectionEngine {
    pub fn new(params: FailureParams) -> Self {
        Self {
            params,
            policy: LookaheadPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LookaheadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Select the failure set in place.
    ///
    /// A tree can be run exactly once; afterwards its flags describe this
    /// run and it no longer accepts new nodes.
    pub fn run(&self, store: &mut TreeStore) -> Result<SelectionOutcome> {
        if store.is_consumed() {
            return Err(FailSetError::InvariantViolation(
                "selection already ran on this tree".to_string(),
            ));
        }
        store.mark_consumed();

        let span = tracing::debug_span!(
            "select",
            k = self.params.k,
            l = self.params.l,
            policy = %self.policy
        );
        let _guard = span.enter();

        let sizer = ComponentSizer::new(store);
        let mut selections = Vec::new();
        let mut recompute_passes = 0;

        for &node in sizer.order() {
            sizer.recompute(store)?;
            recompute_passes += 1;

            if let Some(reason) = self.decide(store, node) {
                let newly_near = self.select(store, node)?;
                tracing::debug!(
                    node = %node,
                    name = store.name(node).unwrap_or(""),
                    ?reason,
                    newly_near,
                    "node selected"
                );
                selections.push(Selection {
                    node,
                    reason,
                    newly_near,
                });
            }
        }

        // Leave sizes consistent with the final flags.
        sizer.recompute(store)?;
        recompute_passes += 1;

        let near_count = store.ids().filter(|&id| store.is_near(id)).count();
        tracing::info!(
            nodes = store.len(),
            selected = selections.len(),
            near = near_count,
            "failure set computed"
        );

        Ok(SelectionOutcome {
            params: self.params,
            policy: self.policy,
            selections,
            near_count,
            recompute_passes,
        })
    }

    /// Decide on `node` from freshly recomputed sizes.
    fn decide(&self, store: &TreeStore, node: NodeId) -> Option<SelectionReason> {
        let query = NeighborhoodQuery::new(store);
        let l = self.params.radius();
        let oversized = |ids: Vec<NodeId>| {
            ids.into_iter()
                .any(|id| self.params.is_forbidden(store.component_size(id)))
        };

        let horizon = match self.policy {
            LookaheadPolicy::Frontier => query.descendants_at_generation(node, l),
            LookaheadPolicy::Horizon => query.descendants_up_to(node, l),
        };
        if oversized(horizon) {
            return Some(SelectionReason::Lookahead);
        }
        if store.is_root(node) && oversized(query.descendants_up_to(node, l)) {
            return Some(SelectionReason::RootFallback);
        }
        None
    }

    /// Mark `node` selected and its neighborhood near-failed. Returns how many
    /// nodes were not near-failed before.
    fn select(&self, store: &mut TreeStore, node: NodeId) -> Result<usize> {
        if store.node(node)?.selected {
            tracing::error!(node = %node, "node selected twice");
            return Err(FailSetError::InvariantViolation(format!(
                "node {node} is already selected"
            )));
        }
        store.slot_mut(node).selected = true;

        let blast = NeighborhoodQuery::new(store).neighborhood(node, self.params.radius());
        let mut newly_near = 0;
        for id in blast {
            let slot = store.slot_mut(id);
            if !slot.near {
                newly_near += 1;
            }
            slot.near = true;
            slot.component_size = 0;
        }
        Ok(newly_near)
    }
}

/// Validate `(k, l)` and run the default engine on `store`.
pub fn compute_failure_set(store: &mut TreeStore, k: i64, l: i64) -> Result<SelectionOutcome> {
    let params = FailureParams::new(k, l)?;
    SelectionEngine::new(params).run(store)
}
