//! failset: failure-set selection on rooted trees.
//!
//! Given a rooted tree and parameters `k` (forbidden component size) and `l`
//! (near-failure radius), picks a set of nodes to fail so that once every
//! node within distance `l` of a failed node is also knocked out, no
//! connected group of surviving nodes has `k` or more members.
//!
//! ```
//! use failset::{compute_failure_set, samples};
//!
//! let mut tree = samples::reference_tree().unwrap();
//! let outcome = compute_failure_set(&mut tree, 3, 2).unwrap();
//! assert_eq!(outcome.num_selected(), 2);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod labels;
pub mod observability;
pub mod report;
pub mod samples;
pub mod types;

pub use error::{FailSetError, Result};
pub use graph::builder::{ParentLink, TreeBuilder, TreeSpec};
pub use graph::selection::{compute_failure_set, SelectionEngine, SelectionOutcome};
pub use graph::sizing::ComponentSizer;
pub use graph::store::TreeStore;
pub use graph::traversal::NeighborhoodQuery;
pub use report::{num_selected, FailureReport};
pub use types::{FailureParams, LookaheadPolicy, NodeId, TreeNode};
