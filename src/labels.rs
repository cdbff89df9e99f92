//! Auto-labels for unnamed nodes.
//!
//! Presentation only; the selection pass never looks at names. The root is
//! `a` and child `i` of `p` is `p` followed by the `i`-th letter. When that
//! letter repeats the last letter of `p`, the run count in front of it is
//! bumped instead, so labels stay short along long single-letter chains:
//! `a` → `2a` → `3a`, and `2aba` → `2ab2a`.

use crate::graph::store::TreeStore;
use crate::graph::traversal::NeighborhoodQuery;
use crate::types::NodeId;

const ROOT_LABEL: &str = "a";

/// Label of the `index`-th child of a node labelled `parent`.
pub fn child_label(parent: &str, index: usize) -> String {
    if index >= 26 {
        return format!("{parent}.{index}");
    }
    let letter = char::from(b'a' + index as u8);
    if parent.chars().last() == Some(letter) {
        bump_run(parent)
    } else {
        format!("{parent}{letter}")
    }
}

/// Increment the decimal run count in front of the last character
/// (an absent count means 1).
fn bump_run(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    let Some((&last, head)) = chars.split_last() else {
        return String::new();
    };
    let mut i = head.len();
    while i > 0 && head[i - 1].is_ascii_digit() {
        i -= 1;
    }
    let digits: String = head[i..].iter().collect();
    let count = if digits.is_empty() {
        1
    } else {
        digits.parse::<u64>().unwrap_or(u64::MAX)
    };
    let prefix: String = head[..i].iter().collect();
    format!("{prefix}{}{last}", count.saturating_add(1))
}

/// Effective label of every node, indexed by `NodeId`. Explicit names win;
/// children derive from their parent's effective label.
pub fn auto_labels(store: &TreeStore) -> Vec<String> {
    let mut labels = vec![String::new(); store.len()];
    for id in NeighborhoodQuery::new(store).pre_order(store.root()) {
        let label = match (store.name(id), store.parent(id)) {
            (Some(name), _) => name.to_string(),
            (None, None) => ROOT_LABEL.to_string(),
            (None, Some(parent)) => {
                let index = store
                    .children(parent)
                    .iter()
                    .position(|&c| c == id)
                    .unwrap_or(0);
                child_label(&labels[parent.index()], index)
            }
        };
        labels[id.index()] = label;
    }
    labels
}
