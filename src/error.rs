//! Error types for failset.
//!
//! Every fallible operation in the crate returns [`Result`]. Nothing is
//! retried: selection is a deterministic function of the tree and `(k, l)`,
//! so any error is a caller or construction defect and surfaces immediately.

use thiserror::Error;

/// All errors produced by the library.
#[derive(Debug, Error)]
pub enum FailSetError {
    /// Internal consistency was broken (e.g. a node selected twice). Fatal.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// `k` or `l` outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The parent/child links do not describe a single rooted tree, or the
    /// tree can no longer be modified.
    #[error("structural error: {0}")]
    Structural(String),

    /// A node id or name that does not exist in the tree.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// Configuration or tree description could not be used.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FailSetError {
    /// Shorthand for a [`FailSetError::InvalidParameter`].
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FailSetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_display_names_the_parameter() {
        let err = FailSetError::invalid_parameter("k", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "invalid parameter `k`: must be at least 1, got 0"
        );
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here/failset.yaml")?)
        }
        assert!(matches!(read_missing(), Err(FailSetError::Io(_))));
    }
}
