//! Core domain types for failset.
//!
//! Nodes live in an arena ([`crate::graph::store::TreeStore`]) and refer to
//! each other by [`NodeId`], so parent back-references never own anything.

use serde::{Deserialize, Serialize};

use crate::error::{FailSetError, Result};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Index of a node inside its owning [`crate::graph::store::TreeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root of every store.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TreeNode
// ---------------------------------------------------------------------------

/// A vertex of the tree together with its per-run flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Display name; may be assigned after construction.
    pub name: Option<String>,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Insertion order is traversal order.
    pub children: Vec<NodeId>,
    /// Member of the failure set S.
    pub selected: bool,
    /// Within radius `l` of some selected node. Never cleared within a run.
    pub near: bool,
    /// Surviving component size below this node. Only valid right after a
    /// full recompute.
    pub component_size: usize,
    /// Distance from the root, assigned by `TreeStore::finalize`.
    pub depth: Option<usize>,
}

impl TreeNode {
    pub(crate) fn new(parent: Option<NodeId>, name: Option<String>) -> Self {
        Self {
            name,
            parent,
            ..Self::default()
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LookaheadPolicy
// ---------------------------------------------------------------------------

/// Which descendants a non-root node inspects before deciding it cannot
/// defer an oversized component to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookaheadPolicy {
    /// Only the nodes exactly `l` generations below. Anything closer is still
    /// inside the parent's blast radius.
    #[default]
    Frontier,
    /// Every node up to `l` generations below, including the node itself.
    Horizon,
}

impl LookaheadPolicy {
    /// Parse from a loose string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "frontier" => Some(Self::Frontier),
            "horizon" => Some(Self::Horizon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontier => "frontier",
            Self::Horizon => "horizon",
        }
    }
}

impl std::fmt::Display for LookaheadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FailureParams
// ---------------------------------------------------------------------------

/// Validated `(k, l)` pair for a selection run.
///
/// `k` is the forbidden surviving component size: a fragment of `k` or more
/// nodes is not allowed to survive. `l` is the near-failure radius around
/// each selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailureParams {
    pub k: usize,
    pub l: usize,
}

impl FailureParams {
    /// Validate raw, possibly negative, inputs.
    pub fn new(k: i64, l: i64) -> Result<Self> {
        if k <= 0 {
            return Err(FailSetError::invalid_parameter(
                "k",
                format!("must be at least 1, got {k}"),
            ));
        }
        if l < 0 {
            return Err(FailSetError::invalid_parameter(
                "l",
                format!("must be non-negative, got {l}"),
            ));
        }
        let k = usize::try_from(k)
            .map_err(|_| FailSetError::invalid_parameter("k", format!("{k} does not fit")))?;
        let l = usize::try_from(l)
            .map_err(|_| FailSetError::invalid_parameter("l", format!("{l} does not fit")))?;
        Ok(Self { k, l })
    }

    /// Whether a surviving component of `size` nodes is forbidden.
    pub fn is_forbidden(&self, size: usize) -> bool {
        size >= self.k
    }

    /// `l` as a signed radius for traversal arithmetic.
    pub fn radius(&self) -> isize {
        isize::try_from(self.l).unwrap_or(isize::MAX)
    }
}
