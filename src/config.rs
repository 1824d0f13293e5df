//! Engine configuration.
//! Loaded from a JSON file and validated before use.

use crate::core::record::LytafSource;
use crate::error::{Error, Result};
use crate::storage::CachePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "LYTAF_CONFIG";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Runtime configuration for `LytafDB` and the `lytaf` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LytafConfig {
    /// Directory holding `annotation_<source>.lytaf` files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Sources merged when a call names none
    #[serde(default = "default_sources")]
    pub default_sources: Vec<LytafSource>,
    #[serde(default)]
    pub cache_policy: CachePolicy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Daily rolling log files go here when set
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./lytaf-data")
}

fn default_sources() -> Vec<LytafSource> {
    LytafSource::ALL.to_vec()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LytafConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_sources: default_sources(),
            cache_policy: CachePolicy::default(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl LytafConfig {
    /// Loads and validates a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: LytafConfig = serde_json::from_str(contents)
            .map_err(|e| Error::Configuration(format!("Failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `LYTAF_CONFIG`, or fall back to defaults
    pub fn from_env_or_default() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_sources.is_empty() {
            return Err(Error::Configuration(
                "default_sources must name at least one source".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(Error::Configuration(format!(
                "Unknown log_level '{}'; use one of {:?}",
                self.log_level, LOG_LEVELS
            )));
        }
        Ok(())
    }
}
