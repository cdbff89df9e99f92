//! Structured logging and run metrics.
//!
//! - [`init_logging`]: one-time `tracing` setup with `RUST_LOG` support
//! - [`RunMetrics`]: counters for a single selection run

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::graph::selection::SelectionOutcome;
use crate::graph::store::TreeStore;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "failset=info";

/// Initialize structured logging to stderr.
///
/// `RUST_LOG` wins over `fallback`, which wins over [`DEFAULT_FILTER`].
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Counters for one selection run. Serializable via [`RunMetrics::to_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetrics {
    pub duration_ms: Option<u64>,
    pub nodes: usize,
    pub recompute_passes: usize,
    pub selected: usize,
    pub near: usize,
}

impl RunMetrics {
    /// Capture the counters of a finished run.
    pub fn record(store: &TreeStore, outcome: &SelectionOutcome, elapsed: Duration) -> Self {
        Self {
            duration_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
            nodes: store.len(),
            recompute_passes: outcome.recompute_passes,
            selected: outcome.num_selected(),
            near: outcome.near_count,
        }
    }

    /// Share of nodes that ended up selected, `0.0` for an empty run.
    pub fn selection_ratio(&self) -> f64 {
        if self.nodes == 0 {
            return 0.0;
        }
        self.selected as f64 / self.nodes as f64
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "duration_ms": self.duration_ms,
            "nodes": self.nodes,
            "recompute_passes": self.recompute_passes,
            "selected": self.selected,
            "near": self.near,
            "selection_ratio": self.selection_ratio(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
