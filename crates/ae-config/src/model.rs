//! Serde model of automation documents
//!
//! Type-specific action settings stay as raw JSON until the matching
//! constructor in the [`ActionRegistry`](crate::ActionRegistry) reads them.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A whole automation: a name and its top-level actions
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// Common action envelope plus type-specific settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    /// Type discriminator
    #[serde(rename = "type")]
    pub action_type: String,

    /// Display name; defaults to the alias
    #[serde(default)]
    pub name: String,

    pub alias: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub asynchronous: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_condition: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before_run_error_conditions: Vec<ErrorConditionConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after_run_error_conditions: Vec<ErrorConditionConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_actions: Vec<ActionConfig>,

    /// Everything else
    #[serde(flatten)]
    pub settings: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorConditionConfig {
    pub condition: JsonValue,
    pub error: JsonValue,
}

impl ActionConfig {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.alias
        } else {
            &self.name
        }
    }

    pub fn setting(&self, key: &str) -> Option<&JsonValue> {
        self.settings.get(key).filter(|value| !value.is_null())
    }

    pub fn required(&self, key: &str) -> ConfigResult<&JsonValue> {
        self.setting(key)
            .ok_or_else(|| ConfigError::invalid(self.key(key), "required setting is missing"))
    }

    /// Nested action configurations stored under `key`
    pub fn child_actions(&self, key: &str) -> ConfigResult<Vec<ActionConfig>> {
        match self.setting(key) {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ConfigError::invalid(self.key(key), e.to_string())),
        }
    }

    /// Literal boolean setting
    pub fn flag(&self, key: &str) -> ConfigResult<bool> {
        match self.setting(key) {
            None => Ok(false),
            Some(JsonValue::Bool(flag)) => Ok(*flag),
            Some(other) => Err(ConfigError::invalid(
                self.key(key),
                format!("expected true or false, found {other}"),
            )),
        }
    }

    /// Qualified key used in error messages
    pub fn key(&self, setting: &str) -> String {
        format!("{}.{}", self.alias, setting)
    }
}
