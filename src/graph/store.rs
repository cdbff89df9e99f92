//! Arena-backed tree store.
//!
//! Every node lives in one `Vec<TreeNode>` and is addressed by [`NodeId`].
//! The root is always `NodeId(0)`. Parent links are plain indices, so the
//! store has no reference cycles and a single owner.

use std::ops::Index;

use crate::error::{FailSetError, Result};
use crate::types::{NodeId, TreeNode};

/// Owning collection of all nodes of one rooted tree.
#[derive(Debug, Clone)]
pub struct TreeStore {
    nodes: Vec<TreeNode>,
    finalized: bool,
    consumed: bool,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore {
    /// Create a store holding a single unnamed root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(None, None)],
            finalized: false,
            consumed: false,
        }
    }

    /// Create a store holding a single root called `name`.
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.nodes[0].name = Some(name.into());
        store
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Append an unnamed node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId) -> Result<NodeId> {
        self.push_child(parent, None)
    }

    /// Append a node called `name` as the last child of `parent`.
    pub fn add_named_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.push_child(parent, Some(name.into()))
    }

    fn push_child(&mut self, parent: NodeId, name: Option<String>) -> Result<NodeId> {
        if self.consumed {
            return Err(FailSetError::Structural(
                "cannot add nodes after a selection run".to_string(),
            ));
        }
        let parent_depth = self.node(parent)?.depth;

        let id = NodeId(self.nodes.len());
        let mut node = TreeNode::new(Some(parent), name);
        node.depth = parent_depth.map(|d| d + 1);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Assign depth to every node with one pre-order pass from the root
    /// (root = 0, child = parent + 1).
    pub fn finalize(&mut self) {
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            self.nodes[id.0].depth = Some(depth);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        self.finalized = true;
        tracing::debug!(nodes = self.nodes.len(), "tree finalized");
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Rename a node.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    // -------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a store holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Like [`TreeStore::get`] but reports unknown ids as an error.
    pub fn node(&self, id: NodeId) -> Result<&TreeNode> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| FailSetError::UnknownNode(id.to_string()))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| FailSetError::UnknownNode(id.to_string()))
    }

    /// Direct mutable access for ids minted by this store.
    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// First node (in creation order) whose name is exactly `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
            .map(NodeId)
    }

    // -------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).and_then(|n| n.name.as_deref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(TreeNode::is_root)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.selected)
    }

    pub fn is_near(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.near)
    }

    /// Component size as of the last recompute.
    pub fn component_size(&self, id: NodeId) -> usize {
        self.nodes.get(id.0).map_or(0, |n| n.component_size)
    }

    /// Distance from the root. Requires [`TreeStore::finalize`] (or a parent
    /// that was finalized before this node was added).
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        self.node(id)?.depth.ok_or_else(|| {
            FailSetError::Structural(format!("depth of {id} requested before finalize"))
        })
    }

    // -------------------------------------------------------------------
    // Run bookkeeping
    // -------------------------------------------------------------------

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub(crate) fn mark_consumed(&mut self) {
        self.consumed = true;
    }
}

impl Index<NodeId> for TreeStore {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }
}
