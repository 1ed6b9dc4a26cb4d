use abiscope_core::error::IndexError;
use thiserror::Error;

/// Errors loading an `EngineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown config format for '{path}': expected .yaml, .yml or .json")]
    UnknownFormat { path: String },
}

/// Errors surfaced by `DecodeEngine`.
///
/// Per-candidate decode failures are not engine errors; they are reported
/// in `Resolution::rejected`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("calldata too large: {len} bytes exceeds the {max}-byte limit")]
    CalldataTooLarge { len: usize, max: usize },

    #[error("no selector table configured")]
    MissingTablePath,

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
