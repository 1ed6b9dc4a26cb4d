//! Engine configuration.

use abiscope_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level engine configuration, loadable from YAML or JSON.
///
/// ```yaml
/// table_path: data/selectors.json
/// max_calldata_bytes: 131072
/// batch_chunk_size: 10000
/// log:
///   level: info
///   components:
///     abiscope-index: debug
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Selector table to load in `DecodeEngine::from_config`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_path: Option<PathBuf>,
    /// Calldata (and log data) above this size is refused
    #[serde(default = "default_max_calldata_bytes")]
    pub max_calldata_bytes: usize,
    /// Max requests per rayon chunk in `decode_batch`
    #[serde(default = "default_batch_chunk_size")]
    pub batch_chunk_size: usize,
    /// Check each table key against its record's own selectors
    #[serde(default = "bool_true")]
    pub verify_table_keys: bool,
    /// Skip table records with unparseable keys or ABIs instead of failing
    #[serde(default)]
    pub skip_invalid_records: bool,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_max_calldata_bytes() -> usize { 128 * 1024 }
fn default_batch_chunk_size() -> usize { 10_000 }
fn bool_true() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            max_calldata_bytes: default_max_calldata_bytes(),
            batch_chunk_size: default_batch_chunk_size(),
            verify_table_keys: true,
            skip_invalid_records: false,
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default config reading the table at `path`.
    pub fn with_table(path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file, choosing the format by extension.
    ///
    /// A relative `table_path` is resolved against the config file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => {
                return Err(ConfigError::UnknownFormat {
                    path: path.display().to_string(),
                })
            }
        };
        if let (Some(table), Some(dir)) = (config.table_path.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = dir.join(&*table);
            }
        }
        Ok(config)
    }
}
