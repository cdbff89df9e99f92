//! Configuration data structures for failset.
//!
//! Defines the YAML config format: selection parameters, output options and
//! logging. Every field has a serde default so partial files are valid.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{FailureParams, LookaheadPolicy};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for failset.
///
/// Loaded from YAML files, environment variables, and CLI flags.
/// Multiple sources are merged with well-defined priority (see
/// [`crate::config::loader`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailSetConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FailSetConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            selection: SelectionConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionConfig
// ---------------------------------------------------------------------------

/// Parameters of the selection run.
///
/// `k` and `l` are kept signed so a bad value in a file is reported as an
/// invalid parameter rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Forbidden surviving component size.
    #[serde(default = "default_k")]
    pub k: i64,

    /// Near-failure radius.
    #[serde(default = "default_l")]
    pub l: i64,

    #[serde(default)]
    pub lookahead: LookaheadPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            l: default_l(),
            lookahead: LookaheadPolicy::default(),
        }
    }
}

impl SelectionConfig {
    /// Validated `(k, l)`.
    pub fn params(&self) -> Result<FailureParams> {
        FailureParams::new(self.k, self.l)
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// How the CLI prints a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree dump followed by a summary.
    #[default]
    Text,
    /// Pretty-printed `FailureReport`.
    Json,
}

impl OutputFormat {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Run the brute-force census after selection and fail if a surviving
    /// component reaches `k`.
    #[serde(default = "default_verify")]
    pub verify: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verify: default_verify(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_k() -> i64 {
    3
}

fn default_l() -> i64 {
    2
}

fn default_verify() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
