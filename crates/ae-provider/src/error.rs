//! Provider errors

use ae_core::{ConfiguredError, Value};
use thiserror::Error;

pub const PATH_NOT_FOUND: &str = "automation.provider.path.not.found";
pub const TYPE_MISMATCH: &str = "automation.provider.type.mismatch";
pub const INVALID_PROPERTY_NAME: &str = "automation.provider.invalid.property.name";
pub const INVALID_VALUE: &str = "automation.provider.invalid.value";

/// Provider errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("No value found at path \"{path}\"")]
    PathNotFound { path: String },

    #[error("Expected a {expected} value but found a {found} value")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Object property key must have a valid property name")]
    InvalidPropertyName { name: String },

    #[error("Invalid value: {reason}")]
    InvalidValue { reason: String },
}

/// Result type for provider resolution
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        ProviderError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::PathNotFound { .. } => PATH_NOT_FOUND,
            ProviderError::TypeMismatch { .. } => TYPE_MISMATCH,
            ProviderError::InvalidPropertyName { .. } => INVALID_PROPERTY_NAME,
            ProviderError::InvalidValue { .. } => INVALID_VALUE,
        }
    }
}

impl From<ProviderError> for ConfiguredError {
    fn from(error: ProviderError) -> Self {
        let (title, details) = match &error {
            ProviderError::PathNotFound { path } => {
                ("Value not found", vec![format!("Path: {path}")])
            }
            ProviderError::TypeMismatch { .. } => ("Value has the wrong type", Vec::new()),
            ProviderError::InvalidPropertyName { name } => (
                "Invalid property name",
                vec![format!("Property name: {name}")],
            ),
            ProviderError::InvalidValue { .. } => ("Invalid value", Vec::new()),
        };
        ConfiguredError::new(error.code(), title, error.to_string(), 400).with_details(details)
    }
}
