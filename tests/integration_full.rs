//! End-to-end tests for failset.
//!
//! These build trees through the public API (samples, builder, tree files),
//! run selection, and check the outcome against a census of the surviving
//! components and against known answers.

use std::collections::BTreeSet;

use failset::config::FailSetConfig;
use failset::graph::census::{largest_surviving, verify};
use failset::labels::auto_labels;
use failset::report::{num_near, FailureReport};
use failset::samples::{self, SampleTree};
use failset::{
    compute_failure_set, num_selected, FailSetError, FailureParams, LookaheadPolicy,
    NeighborhoodQuery, NodeId, SelectionEngine, TreeBuilder, TreeStore,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use test_case::test_case;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run with the default policy and return the selected labels, sorted.
fn selected_labels(mut tree: TreeStore, k: i64, l: i64) -> BTreeSet<String> {
    let outcome = compute_failure_set(&mut tree, k, l).unwrap();
    let labels = auto_labels(&tree);
    outcome
        .selected()
        .into_iter()
        .map(|id| labels[id.index()].clone())
        .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn count(sample: SampleTree, k: i64, l: i64, policy: LookaheadPolicy) -> usize {
    let mut tree = sample.build().unwrap();
    let params = FailureParams::new(k, l).unwrap();
    SelectionEngine::new(params)
        .with_policy(policy)
        .run(&mut tree)
        .unwrap();
    num_selected(&tree, tree.root())
}

/// Largest group of connected nodes outside the radius-`l` balls of
/// `chosen`, computed without touching the tree's flags.
fn largest_after_failing(tree: &TreeStore, chosen: &[NodeId], l: isize) -> usize {
    let query = NeighborhoodQuery::new(tree);
    let mut knocked = vec![false; tree.len()];
    for &c in chosen {
        for n in query.neighborhood(c, l) {
            knocked[n.index()] = true;
        }
    }
    let mut seen = knocked.clone();
    let mut largest = 0;
    for start in tree.ids() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut size = 0;
        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            size += 1;
            for m in tree.parent(n).into_iter().chain(tree.children(n).iter().copied()) {
                if !seen[m.index()] {
                    seen[m.index()] = true;
                    stack.push(m);
                }
            }
        }
        largest = largest.max(size);
    }
    largest
}

// ===========================================================================
// 1. Reference tree
// ===========================================================================

#[test]
fn reference_tree_selects_root_and_b() {
    let mut tree = samples::reference_tree().unwrap();
    let outcome = compute_failure_set(&mut tree, 3, 2).unwrap();

    let names: BTreeSet<&str> = outcome
        .selected()
        .into_iter()
        .filter_map(|id| tree.name(id))
        .collect();
    assert_eq!(names, BTreeSet::from(["root", "b"]));
    assert_eq!(num_selected(&tree, tree.root()), 2);
    assert!(verify(&tree, 3));
}

#[test]
fn reference_tree_matches_brute_force_minimum() {
    let tree = samples::reference_tree().unwrap();
    let n = tree.len();
    let mut best = usize::MAX;
    for mask in 0u32..(1 << n) {
        let size = mask.count_ones() as usize;
        if size >= best {
            continue;
        }
        let chosen: Vec<NodeId> = (0..n).filter(|&i| mask & (1u32 << i) != 0).map(NodeId).collect();
        if largest_after_failing(&tree, &chosen, 2) < 3 {
            best = size;
        }
    }
    assert_eq!(best, 2);

    let mut run = samples::reference_tree().unwrap();
    let outcome = compute_failure_set(&mut run, 3, 2).unwrap();
    assert_eq!(outcome.num_selected(), best);
}

#[test_case(3, 1, &["root", "a", "b1"] ; "k3 l1")]
#[test_case(2, 1, &["root", "a", "b11"] ; "k2 l1")]
#[test_case(3, 0, &["root", "a1", "b11", "c"] ; "k3 l0")]
#[test_case(4, 1, &["root", "b"] ; "k4 l1")]
#[test_case(5, 2, &["root"] ; "k5 l2")]
fn reference_tree_parameter_grid(k: i64, l: i64, expected: &[&str]) {
    let tree = samples::reference_tree().unwrap();
    assert_eq!(selected_labels(tree, k, l), set(expected));
}

// ===========================================================================
// 2. Paths and single nodes
// ===========================================================================

#[test]
fn eleven_node_path_with_zero_radius() {
    let mut tree = samples::path(11).unwrap();
    let outcome = compute_failure_set(&mut tree, 3, 0).unwrap();
    let names: Vec<&str> = outcome
        .selected()
        .into_iter()
        .filter_map(|id| tree.name(id))
        .collect();
    assert_eq!(names, vec!["p8", "p5", "p2"]);
    assert!(largest_surviving(&tree) < 3);
}

#[test_case(0, &["p1", "p4", "p7"] ; "l0")]
#[test_case(1, &["p1", "p6"] ; "l1")]
#[test_case(2, &["p0", "p5"] ; "l2")]
#[test_case(3, &["p4"] ; "l3")]
fn ten_node_path_radii(l: i64, expected: &[&str]) {
    let tree = samples::path(10).unwrap();
    assert_eq!(selected_labels(tree, 3, l), set(expected));
}

#[test]
fn short_path_falls_back_to_root() {
    let tree = samples::path(3).unwrap();
    assert_eq!(selected_labels(tree, 3, 0), set(&["p0"]));
}

#[test_case(1, 1 ; "k1 selects the node")]
#[test_case(2, 0 ; "k2 leaves it")]
#[test_case(7, 0 ; "k7 leaves it")]
fn single_node_tree(k: i64, expected: usize) {
    let mut tree = TreeStore::with_root("only");
    compute_failure_set(&mut tree, k, 0).unwrap();
    assert_eq!(num_selected(&tree, tree.root()), expected);
}

#[test]
fn star_is_handled_at_the_hub() {
    let mut tree = samples::star(6).unwrap();
    let outcome = compute_failure_set(&mut tree, 3, 1).unwrap();
    assert_eq!(outcome.selected(), vec![tree.root()]);
    assert_eq!(num_near(&tree), 7);
}

// ===========================================================================
// 3. Built-in samples
// ===========================================================================

#[test]
fn branching_sample_k3_l2() {
    let tree = samples::branching_sample().unwrap();
    assert_eq!(
        selected_labels(tree, 3, 2),
        set(&["2A", "2ABA aka v2", "2ACAB2A aka v1", "AB"])
    );
}

#[test]
fn uniform_sample_k3_l2() {
    let tree = samples::uniform_sample().unwrap();
    assert_eq!(selected_labels(tree, 3, 2), set(&["a"]));
}

#[test]
fn counter_sample_k3_l2() {
    let tree = samples::counter_sample().unwrap();
    assert_eq!(selected_labels(tree, 3, 2), set(&["2a2b", "2a2b7a"]));
}

#[test_case(SampleTree::Branching, &[14, 7, 4, 3, 2] ; "branching")]
#[test_case(SampleTree::Uniform, &[3, 2, 1, 1, 1] ; "uniform")]
#[test_case(SampleTree::Counter, &[7, 4, 2, 2, 2] ; "counter")]
fn sample_counts_over_radius(sample: SampleTree, expected: &[usize]) {
    let counts: Vec<usize> = (0..5)
        .map(|l| count(sample, 3, l, LookaheadPolicy::Frontier))
        .collect();
    assert_eq!(counts, expected);
}

#[test]
fn every_sample_satisfies_the_guarantee() {
    for sample in SampleTree::ALL {
        for policy in [LookaheadPolicy::Frontier, LookaheadPolicy::Horizon] {
            for k in 1..=6 {
                for l in 0..=3 {
                    let mut tree = sample.build().unwrap();
                    let params = FailureParams::new(k, l).unwrap();
                    SelectionEngine::new(params)
                        .with_policy(policy)
                        .run(&mut tree)
                        .unwrap();
                    assert!(
                        verify(&tree, k as usize),
                        "{sample} {policy} k={k} l={l}: largest {}",
                        largest_surviving(&tree)
                    );
                }
            }
        }
    }
}

#[test]
fn branching_selection_is_monotone_in_k_and_l() {
    for policy in [LookaheadPolicy::Frontier, LookaheadPolicy::Horizon] {
        for k in 1..=7 {
            for l in 0..=4 {
                let here = count(SampleTree::Branching, k, l, policy);
                if k < 7 {
                    let larger_k = count(SampleTree::Branching, k + 1, l, policy);
                    assert!(here >= larger_k, "{policy}: k={k} l={l} {here} < {larger_k}");
                }
                if l < 4 {
                    let larger_l = count(SampleTree::Branching, k, l + 1, policy);
                    assert!(here >= larger_l, "{policy}: k={k} l={l} {here} < {larger_l}");
                }
            }
        }
    }
}

// ===========================================================================
// 4. Errors
// ===========================================================================

#[test]
fn second_run_is_rejected() {
    let mut tree = samples::path(4).unwrap();
    compute_failure_set(&mut tree, 2, 0).unwrap();
    let err = compute_failure_set(&mut tree, 2, 0).unwrap_err();
    assert!(matches!(err, FailSetError::InvariantViolation(_)));
    assert!(tree.add_child(tree.root()).is_err());
}

#[test_case(0, 1, "k" ; "zero k")]
#[test_case(-3, 1, "k" ; "negative k")]
#[test_case(3, -1, "l" ; "negative l")]
fn invalid_parameters_leave_tree_untouched(k: i64, l: i64, param: &str) {
    let mut tree = samples::reference_tree().unwrap();
    match compute_failure_set(&mut tree, k, l) {
        Err(FailSetError::InvalidParameter { name, .. }) => assert_eq!(name, param),
        other => panic!("expected invalid parameter, got {other:?}"),
    }
    assert!(!tree.is_consumed());
    assert!(compute_failure_set(&mut tree, 3, 2).is_ok());
}

// ===========================================================================
// 5. Files and config
// ===========================================================================

#[test]
fn yaml_tree_and_config_file() {
    let dir = TempDir::new().unwrap();
    let tree_path = dir.path().join("tree.yaml");
    std::fs::write(
        &tree_path,
        r#"
name: root
children:
  - name: a
    children:
      - name: a1
        children: [{ name: a11 }, { name: a12 }]
      - name: a2
  - name: b
    children:
      - name: b1
        children:
          - name: b11
            children:
              - name: b111
                children: [{ name: b1111 }]
  - name: c
    children: [{ name: c1 }, { name: c2 }]
"#,
    )
    .unwrap();
    let config_path = dir.path().join("failset.yaml");
    std::fs::write(&config_path, "selection:\n  k: 3\n  l: 2\noutput:\n  format: json\n").unwrap();

    let config = FailSetConfig::load_file(&config_path).unwrap();
    let mut tree = TreeBuilder::load_file(&tree_path).unwrap();
    assert_eq!(tree.len(), 14);

    let outcome = SelectionEngine::new(config.selection.params().unwrap())
        .with_policy(config.selection.lookahead)
        .run(&mut tree)
        .unwrap();
    let report = FailureReport::build(&tree, &outcome);
    assert_eq!(report.num_selected, 2);
    assert!(report.guarantee_holds);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["nodes"], 14);
    assert_eq!(json["k"], 3);
}

#[test]
fn json_tree_file_with_unnamed_nodes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.json");
    std::fs::write(&path, r#"{"children": [{"children": [{}, {}]}, {}]}"#).unwrap();

    let tree = TreeBuilder::load_file(&path).unwrap();
    let labels = auto_labels(&tree);
    let in_pre_order: Vec<&str> = NeighborhoodQuery::new(&tree)
        .pre_order(tree.root())
        .into_iter()
        .map(|id| labels[id.index()].as_str())
        .collect();
    assert_eq!(in_pre_order, vec!["a", "2a", "3a", "2ab", "ab"]);
}

#[test]
fn unsupported_tree_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.toml");
    std::fs::write(&path, "").unwrap();
    assert!(matches!(
        TreeBuilder::load_file(&path),
        Err(FailSetError::Config(_))
    ));
}
