//! Configuration: YAML schema and layered loading.

pub mod loader;
pub mod schema;

pub use schema::{FailSetConfig, LoggingConfig, OutputConfig, OutputFormat, SelectionConfig};
