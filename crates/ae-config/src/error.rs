//! Error types for automation definitions

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or compiling a definition
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("failed to parse JSON in {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// File extension is neither JSON nor YAML
    #[error("unsupported definition format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// No constructor registered for an action type
    #[error("unknown action type '{action_type}' for action '{alias}'")]
    UnknownActionType { action_type: String, alias: String },

    /// Malformed provider configuration
    #[error("invalid provider '{name}': {reason}")]
    InvalidProvider { name: String, reason: String },

    /// Two siblings share an alias
    #[error("duplicate action alias '{alias}'")]
    DuplicateAlias { alias: String },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn provider(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidProvider {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
