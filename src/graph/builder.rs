//! Validating tree construction.
//!
//! Two input shapes are accepted:
//! - a flat list of [`ParentLink`]s, where each entry names its parent by
//!   position. This is where malformed input (several roots, cycles, dangling
//!   parents) can show up, and all of it is rejected here as
//!   [`FailSetError::Structural`].
//! - a nested [`TreeSpec`] document (YAML or JSON), which is a tree by
//!   construction.
//!
//! Either way the resulting [`TreeStore`] is renumbered in pre-order so the
//! root is `NodeId(0)`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FailSetError, Result};
use crate::graph::store::TreeStore;
use crate::types::NodeId;

// ---------------------------------------------------------------------------
// Input shapes
// ---------------------------------------------------------------------------

/// One entry of a flat tree description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    #[serde(default)]
    pub name: Option<String>,
    /// Position of the parent entry; `None` marks the root.
    #[serde(default)]
    pub parent: Option<usize>,
}

impl ParentLink {
    pub fn root(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            parent: None,
        }
    }

    pub fn child(name: Option<&str>, parent: usize) -> Self {
        Self {
            name: name.map(str::to_string),
            parent: Some(parent),
        }
    }
}

/// Nested tree description.
///
/// ```yaml
/// name: root
/// children:
///   - name: a
///     children:
///       - {}
///   - name: b
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSpec>,
}

impl TreeSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeSpec>) -> Self {
        self.children = children;
        self
    }
}

// ---------------------------------------------------------------------------
// TreeBuilder
// ---------------------------------------------------------------------------

/// Builds [`TreeStore`]s from untrusted descriptions.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build from a flat parent-link list.
    ///
    /// Children keep the relative order in which they appear in `links`.
    pub fn from_parent_links(links: &[ParentLink]) -> Result<TreeStore> {
        if links.is_empty() {
            return Err(FailSetError::Structural("tree has no nodes".to_string()));
        }

        let mut root = None;
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); links.len()];
        for (i, link) in links.iter().enumerate() {
            match link.parent {
                None => {
                    if let Some(existing) = root {
                        return Err(FailSetError::Structural(format!(
                            "multiple roots: entries {existing} and {i} have no parent"
                        )));
                    }
                    root = Some(i);
                }
                Some(p) if p == i => {
                    return Err(FailSetError::Structural(format!(
                        "entry {i} is its own parent"
                    )));
                }
                Some(p) if p >= links.len() => {
                    return Err(FailSetError::Structural(format!(
                        "entry {i} refers to missing parent {p}"
                    )));
                }
                Some(p) => children[p].push(i),
            }
        }
        let root = root.ok_or_else(|| {
            FailSetError::Structural("no root: every entry has a parent (cycle)".to_string())
        })?;

        // Pre-order walk from the root; whatever it misses hangs off a cycle.
        let mut store = match &links[root].name {
            Some(name) => TreeStore::with_root(name.clone()),
            None => TreeStore::new(),
        };
        let mut reached = vec![false; links.len()];
        reached[root] = true;
        let mut stack: Vec<(usize, NodeId)> = children[root]
            .iter()
            .rev()
            .map(|&c| (c, NodeId::ROOT))
            .collect();
        while let Some((entry, parent)) = stack.pop() {
            reached[entry] = true;
            let id = match &links[entry].name {
                Some(name) => store.add_named_child(parent, name.clone())?,
                None => store.add_child(parent)?,
            };
            stack.extend(children[entry].iter().rev().map(|&c| (c, id)));
        }

        if let Some(orphan) = reached.iter().position(|r| !r) {
            return Err(FailSetError::Structural(describe_unreached(links, orphan)));
        }

        tracing::debug!(nodes = store.len(), "built tree from parent links");
        Ok(store)
    }

    /// Build from a nested description.
    pub fn from_spec(spec: &TreeSpec) -> Result<TreeStore> {
        let mut store = match &spec.name {
            Some(name) => TreeStore::with_root(name.clone()),
            None => TreeStore::new(),
        };
        let mut stack: Vec<(&TreeSpec, NodeId)> = spec
            .children
            .iter()
            .rev()
            .map(|c| (c, NodeId::ROOT))
            .collect();
        while let Some((node, parent)) = stack.pop() {
            let id = match &node.name {
                Some(name) => store.add_named_child(parent, name.clone())?,
                None => store.add_child(parent)?,
            };
            stack.extend(node.children.iter().rev().map(|c| (c, id)));
        }
        Ok(store)
    }

    /// Load a nested description from a `.json`, `.yaml` or `.yml` file.
    pub fn load_file(path: &Path) -> Result<TreeStore> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FailSetError::Config(format!("cannot read tree file {}: {e}", path.display()))
        })?;
        let spec: TreeSpec = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            _ => {
                return Err(FailSetError::Config(format!(
                    "unsupported tree file extension: {}",
                    path.display()
                )))
            }
        };
        Self::from_spec(&spec)
    }
}

/// Explain why `entry` is not reachable from the root. With one parent per
/// entry and a single root, an unreachable entry always leads into a cycle.
fn describe_unreached(links: &[ParentLink], entry: usize) -> String {
    let mut seen = HashSet::new();
    let mut current = entry;
    while seen.insert(current) {
        match links[current].parent {
            Some(p) => current = p,
            None => break,
        }
    }
    let mut cycle = vec![current];
    let mut walk = links[current].parent;
    while let Some(p) = walk {
        if p == current {
            break;
        }
        cycle.push(p);
        walk = links[p].parent;
    }
    let cycle = cycle
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    format!("entry {entry} is disconnected from the root (cycle {cycle} -> {current})")
}
