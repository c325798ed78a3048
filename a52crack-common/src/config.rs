//! Tool configuration.
//!
//! The attack and precompute commands share a small YAML-loadable
//! configuration; command-line flags override individual fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::logging::LogLevel;

fn default_dictionary() -> PathBuf {
    PathBuf::from("a52crack.dict")
}

fn default_workers() -> usize {
    4
}

/// Configuration for the a52crack tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Path of the resolution-matrix dictionary store.
    #[serde(default = "default_dictionary")]
    pub dictionary: PathBuf,
    /// Number of parallel workers for dictionary build and attack.
    /// Must evenly divide the hypothesis space being scanned.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Log level for the tracing subscriber.
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            dictionary: default_dictionary(),
            workers: default_workers(),
            log_level: LogLevel::default(),
        }
    }
}

impl ToolConfig {
    /// Loads a configuration from a YAML file and validates it.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let config: ToolConfig = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration invariants.
    ///
    /// The even-partition constraint on the worker count is enforced
    /// against the concrete index range by the dictionary build and the
    /// attack themselves.
    pub fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::Config("worker count must be at least 1".into()));
        }
        Ok(())
    }
}
