//! Multi-source config loading.
//!
//! Priority, highest first: CLI flags (applied by the caller), environment
//! (`FAILSET_K`, `FAILSET_L`, `FAILSET_LOOKAHEAD`, `FAILSET_FORMAT`), an
//! explicit config file, the user config file, built-in defaults.

use std::path::{Path, PathBuf};

use crate::config::schema::{FailSetConfig, OutputFormat};
use crate::error::{FailSetError, Result};
use crate::types::LookaheadPolicy;

/// Name of the config file in the user config directory.
pub const CONFIG_FILE_NAME: &str = "failset.yaml";

pub const ENV_K: &str = "FAILSET_K";
pub const ENV_L: &str = "FAILSET_L";
pub const ENV_LOOKAHEAD: &str = "FAILSET_LOOKAHEAD";
pub const ENV_FORMAT: &str = "FAILSET_FORMAT";

impl FailSetConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| FailSetError::Config(format!("failed to parse config: {e}")))
    }

    /// Read and parse a YAML file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FailSetError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// `<user config dir>/failset.yaml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "failset")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from `explicit` (which must exist) or else the user config file
    /// (if present), then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => match Self::user_config_path().filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!("loading user config from {}", path.display());
                    Self::load_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_overrides_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_K) {
            self.selection.k = parse_int(ENV_K, &raw)?;
        }
        if let Some(raw) = lookup(ENV_L) {
            self.selection.l = parse_int(ENV_L, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOOKAHEAD) {
            self.selection.lookahead = LookaheadPolicy::from_str_loose(&raw).ok_or_else(|| {
                FailSetError::Config(format!("{ENV_LOOKAHEAD}: unknown lookahead policy `{raw}`"))
            })?;
        }
        if let Some(raw) = lookup(ENV_FORMAT) {
            self.output.format = OutputFormat::from_str_loose(&raw).ok_or_else(|| {
                FailSetError::Config(format!("{ENV_FORMAT}: unknown output format `{raw}`"))
            })?;
        }
        Ok(())
    }
}

fn parse_int(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|e| FailSetError::Config(format!("{key}: `{raw}` is not an integer ({e})")))
}
