//! Compiles configuration into immutable actions

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ActionConfig, AutomationConfig, ErrorConditionConfig};
use crate::provider::ProviderBuilder;
use crate::registry::ActionRegistry;
use ae_action::{duplicate_alias, Action, Automation, ErrorCondition};
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds actions through an [`ActionRegistry`]
#[derive(Debug, Clone, Default)]
pub struct ActionBuilder {
    registry: ActionRegistry,
    providers: ProviderBuilder,
}

impl ActionBuilder {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            providers: ProviderBuilder::new(),
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn providers(&self) -> &ProviderBuilder {
        &self.providers
    }

    pub fn build_automation(&self, config: &AutomationConfig) -> ConfigResult<Automation> {
        debug!(automation = %config.name, "Building automation");
        let actions = self.build_all(&config.actions)?;
        Ok(Automation::new(&config.name, actions))
    }

    /// Build sibling actions, rejecting duplicate aliases
    pub fn build_all(&self, configs: &[ActionConfig]) -> ConfigResult<Vec<Arc<Action>>> {
        let actions = configs
            .iter()
            .map(|config| self.build(config))
            .collect::<ConfigResult<Vec<_>>>()?;

        if let Some(alias) = duplicate_alias(&actions) {
            return Err(ConfigError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }
        Ok(actions)
    }

    pub fn build(&self, config: &ActionConfig) -> ConfigResult<Arc<Action>> {
        if config.alias.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("{}.alias", config.action_type),
                "alias must not be empty",
            ));
        }
        trace!(alias = %config.alias, action_type = %config.action_type, "Building action");

        let kind = self.registry.build_kind(config, self)?;
        let mut action = Action::new(config.display_name(), &config.alias, kind)
            .with_asynchronous(config.asynchronous);

        if let Some(description) = &config.description {
            action = action.with_description(description);
        }
        if let Some(condition) = &config.run_condition {
            action = action.with_run_condition(self.providers.condition(condition)?);
        }
        for condition in &config.before_run_error_conditions {
            action = action.with_before_run_error_condition(self.error_condition(condition)?);
        }
        for condition in &config.after_run_error_conditions {
            action = action.with_after_run_error_condition(self.error_condition(condition)?);
        }
        if !config.error_actions.is_empty() {
            action = action.with_error_actions(self.build_all(&config.error_actions)?);
        }

        Ok(Arc::new(action))
    }

    fn error_condition(&self, config: &ErrorConditionConfig) -> ConfigResult<ErrorCondition> {
        Ok(ErrorCondition::new(
            self.providers.condition(&config.condition)?,
            self.providers.configured_error(&config.error)?,
        ))
    }
}
