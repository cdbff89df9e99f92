//! Graph layer: arena tree store, traversal, sizing and selection.

pub mod builder;
pub mod census;
pub mod selection;
pub mod sizing;
pub mod store;
pub mod traversal;
