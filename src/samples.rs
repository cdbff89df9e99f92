//! Built-in sample trees.
//!
//! The three demo trees (`branching`, `uniform`, `counter`) mix long chains
//! with wide fan-outs; `reference` is a small named
//! tree with a hand-checked answer. All of them go through
//! [`TreeBuilder::from_parent_links`], so they are validated like any other
//! input.

use std::collections::HashMap;

use crate::error::{FailSetError, Result};
use crate::graph::builder::{ParentLink, TreeBuilder};
use crate::graph::store::TreeStore;
use crate::types::NodeId;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// `(name, parent name)` rows; a parent always appears before its children.
/// The "aka" suffixes are alias names kept for cross-reference.
const BRANCHING: &[(&str, Option<&str>)] = &[
    ("A", None),
    ("2A", Some("A")),
    ("3A", Some("2A")),
    ("4A", Some("3A")),
    ("5A", Some("4A")),
    ("3AB", Some("3A")),
    ("3ABA", Some("3AB")),
    ("3A2B", Some("3AB")),
    ("3AC", Some("3A")),
    ("2AB", Some("2A")),
    ("2ABA aka v2", Some("2AB")),
    ("2AB2A", Some("2ABA aka v2")),
    ("2AB3A", Some("2AB2A")),
    ("2AB4A aka u2", Some("2AB3A")),
    ("2AB5A", Some("2AB4A aka u2")),
    ("2AC", Some("2A")),
    ("2ACA aka w1", Some("2AC")),
    ("2AC2A", Some("2ACA aka w1")),
    ("2ACAB", Some("2ACA aka w1")),
    ("2ACABA", Some("2ACAB")),
    ("2ACAB2A aka v1", Some("2ACABA")),
    ("2ACAB3A", Some("2ACAB2A aka v1")),
    ("2ACAB4A", Some("2ACAB3A")),
    ("2ACAB5A aka u1", Some("2ACAB4A")),
    ("2ACAB6A", Some("2ACAB5A aka u1")),
    ("2ACAB4AB", Some("2ACAB4A")),
    ("2ACAB2AB", Some("2ACAB2A aka v1")),
    ("AB", Some("A")),
    ("ABA", Some("AB")),
    ("AB2A", Some("ABA")),
    ("ABAB", Some("ABA")),
    ("ABABA", Some("ABAB")),
    ("ABA2B", Some("ABAB")),
    ("A2B", Some("AB")),
    ("ABC", Some("AB")),
    ("ABCA", Some("ABC")),
    ("ABC2A", Some("ABCA")),
    ("ABCB", Some("ABC")),
    ("ABCBA", Some("ABCB")),
    ("ABD", Some("AB")),
    ("ABDA", Some("ABD")),
    ("ABDB", Some("ABD")),
    ("ABDBA", Some("ABDB")),
    ("ABD2B", Some("ABDB")),
    ("ABDC", Some("ABD")),
    ("ABDCA", Some("ABDC")),
    ("ABDCB", Some("ABDC")),
    ("ABD2C", Some("ABDC")),
    ("AB2D", Some("ABD")),
    ("AC aka C1", Some("A")),
];

/// Three branches of depth 2, 4 and 4 under the root.
const UNIFORM: &[Option<usize>] = &[
    None,
    Some(0),
    Some(1),
    Some(0),
    Some(3),
    Some(4),
    Some(5),
    Some(0),
    Some(7),
    Some(8),
    Some(9),
];

/// A ten-link chain and a thirteen-leaf fan under the same grandparent.
const COUNTER: &[Option<usize>] = &[
    None,
    Some(0),
    Some(1),
    Some(1),
    Some(3),
    Some(3),
    Some(5),
    Some(6),
    Some(7),
    Some(8),
    Some(9),
    Some(10),
    Some(11),
    Some(12),
    Some(13),
    Some(14),
    Some(14),
    Some(5),
    Some(17),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(18),
    Some(3),
    Some(1),
];

/// The 14-node reference tree.
///
/// ```text
/// root
/// ├── a
/// │   ├── a1
/// │   │   ├── a11
/// │   │   └── a12
/// │   └── a2
/// ├── b
/// │   └── b1
/// │       └── b11
/// │           └── b111
/// │               └── b1111
/// └── c
///     ├── c1
///     └── c2
/// ```
const REFERENCE: &[(&str, Option<&str>)] = &[
    ("root", None),
    ("a", Some("root")),
    ("a1", Some("a")),
    ("a11", Some("a1")),
    ("a12", Some("a1")),
    ("a2", Some("a")),
    ("b", Some("root")),
    ("b1", Some("b")),
    ("b11", Some("b1")),
    ("b111", Some("b11")),
    ("b1111", Some("b111")),
    ("c", Some("root")),
    ("c1", Some("c")),
    ("c2", Some("c")),
];

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

fn from_named_rows(rows: &[(&str, Option<&str>)]) -> Result<TreeStore> {
    let positions: HashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (*name, i))
        .collect();
    let links = rows
        .iter()
        .map(|(name, parent)| match parent {
            None => Ok(ParentLink::root(Some(*name))),
            Some(p) => positions
                .get(p)
                .map(|&pos| ParentLink::child(Some(*name), pos))
                .ok_or_else(|| FailSetError::UnknownNode((*p).to_string())),
        })
        .collect::<Result<Vec<_>>>()?;
    TreeBuilder::from_parent_links(&links)
}

fn from_shape(shape: &[Option<usize>]) -> Result<TreeStore> {
    let links: Vec<ParentLink> = shape
        .iter()
        .map(|parent| ParentLink {
            name: None,
            parent: *parent,
        })
        .collect();
    TreeBuilder::from_parent_links(&links)
}

/// 50 named nodes, several long chains of varying depth.
pub fn branching_sample() -> Result<TreeStore> {
    from_named_rows(BRANCHING)
}

/// 11 unnamed nodes.
pub fn uniform_sample() -> Result<TreeStore> {
    from_shape(UNIFORM)
}

/// 34 unnamed nodes.
pub fn counter_sample() -> Result<TreeStore> {
    from_shape(COUNTER)
}

pub fn reference_tree() -> Result<TreeStore> {
    from_named_rows(REFERENCE)
}

/// A chain of `len` nodes named `p0` (root) to `p{len-1}`.
pub fn path(len: usize) -> Result<TreeStore> {
    if len == 0 {
        return Err(FailSetError::Structural("a path needs at least one node".to_string()));
    }
    let mut store = TreeStore::with_root("p0");
    let mut tip = NodeId::ROOT;
    for i in 1..len {
        tip = store.add_named_child(tip, format!("p{i}"))?;
    }
    Ok(store)
}

/// A hub with `leaves` children named `s1..`.
pub fn star(leaves: usize) -> Result<TreeStore> {
    let mut store = TreeStore::with_root("hub");
    for i in 1..=leaves {
        store.add_named_child(NodeId::ROOT, format!("s{i}"))?;
    }
    Ok(store)
}

// ---------------------------------------------------------------------------
// SampleTree
// ---------------------------------------------------------------------------

/// Named handle on the fixed samples, for the CLI and config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleTree {
    Branching,
    Uniform,
    Counter,
    Reference,
}

impl SampleTree {
    pub const ALL: [SampleTree; 4] = [
        SampleTree::Branching,
        SampleTree::Uniform,
        SampleTree::Counter,
        SampleTree::Reference,
    ];

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "branching" => Some(Self::Branching),
            "uniform" => Some(Self::Uniform),
            "counter" => Some(Self::Counter),
            "reference" => Some(Self::Reference),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branching => "branching",
            Self::Uniform => "uniform",
            Self::Counter => "counter",
            Self::Reference => "reference",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Branching => "50 named nodes with long chains of different depths",
            Self::Uniform => "11 unnamed nodes in three branches",
            Self::Counter => "34 unnamed nodes: a long chain next to a wide fan-out",
            Self::Reference => "14 named nodes with a hand-checked answer for k=3, l=2",
        }
    }

    pub fn build(&self) -> Result<TreeStore> {
        match self {
            Self::Branching => branching_sample(),
            Self::Uniform => uniform_sample(),
            Self::Counter => counter_sample(),
            Self::Reference => reference_tree(),
        }
    }
}

impl std::fmt::Display for SampleTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
