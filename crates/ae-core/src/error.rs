//! Configured errors
//!
//! Every failure that crosses an action boundary is a [`ConfiguredError`]:
//! business errors raised by error conditions or raise-error actions, local
//! leaf failures, and wrapped unexpected failures alike.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used throughout action execution
pub type AutomationResult<T> = Result<T, ConfiguredError>;

/// Structured, user-facing error payload
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct ConfiguredError {
    /// Dotted namespaced identifier, stable across locales
    pub code: String,

    pub title: String,

    pub message: String,

    pub http_status_code: u16,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_details: Vec<String>,

    /// Structured key/value payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ConfiguredError {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        http_status_code: u16,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            message: message.into(),
            http_status_code,
            additional_details: Vec::new(),
            data: None,
        }
    }

    pub fn with_details(mut self, details: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.additional_details = details.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Check the error invariants: non-empty code and a valid HTTP status
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("error code must not be empty".to_string());
        }
        if !(100..=599).contains(&self.http_status_code) {
            return Err(format!(
                "{} is not a valid HTTP status code",
                self.http_status_code
            ));
        }
        Ok(())
    }
}

impl From<ConfiguredError> for Value {
    fn from(error: ConfiguredError) -> Self {
        serde_json::to_value(&error)
            .map(Value::from)
            .unwrap_or(Value::Null)
    }
}

/// Error codes raised by the engine itself
pub mod codes {
    use super::ConfiguredError;
    use crate::value::Value;

    pub const ACTION_FAILED: &str = "automation.action.failed";
    pub const ACTION_CANCELLED: &str = "automation.action.cancelled";
    pub const INVALID_STATE_TRANSITION: &str = "automation.action.invalid.state.transition";
    pub const SET_VARIABLE_FAILED: &str = "automation.action.set.variable.failed";
    pub const ITERATE_INDEX_OUT_OF_RANGE: &str = "automation.action.iterate.index.out.of.range";

    /// Generic failure wrapping an unexpected error raised by an action
    pub fn action_failed(alias: &str, reason: impl std::fmt::Display) -> ConfiguredError {
        ConfiguredError::new(
            ACTION_FAILED,
            "Action failed",
            format!("The action \"{alias}\" failed unexpectedly: {reason}"),
            500,
        )
        .with_data(Value::Object(
            [("actionAlias".to_string(), Value::from(alias))]
                .into_iter()
                .collect(),
        ))
    }

    pub fn action_cancelled(alias: &str) -> ConfiguredError {
        ConfiguredError::new(
            ACTION_CANCELLED,
            "Automation cancelled",
            format!("The automation run was cancelled before \"{alias}\" could run"),
            499,
        )
    }

    pub fn set_variable_failed(
        property_name: &str,
        path: &str,
        reason: impl std::fmt::Display,
    ) -> ConfiguredError {
        ConfiguredError::new(
            SET_VARIABLE_FAILED,
            "Set variable failed",
            format!("Could not set variable \"{property_name}\" at path \"{path}\": {reason}"),
            400,
        )
        .with_details([format!("Property name: {property_name}"), format!("Path: {path}")])
    }

    pub fn iterate_index_out_of_range(alias: &str, index: i64, len: usize) -> ConfiguredError {
        ConfiguredError::new(
            ITERATE_INDEX_OUT_OF_RANGE,
            "Iteration index out of range",
            format!(
                "The iterate action \"{alias}\" was given index {index} for a list of {len} items"
            ),
            400,
        )
    }
}
