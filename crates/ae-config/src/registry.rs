//! Action type registry

use crate::builder::ActionBuilder;
use crate::error::{ConfigError, ConfigResult};
use crate::model::ActionConfig;
use ae_action::{
    action_types, ActionHandler, ActionKind, GroupAction, IterateAction, RaiseErrorAction,
    SetVariableAction,
};
use ae_core::Value;
use ae_provider::{ProviderExt, StaticProvider};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds the type-specific part of an action from its configuration
pub type ActionFactory =
    Arc<dyn Fn(&ActionConfig, &ActionBuilder) -> ConfigResult<ActionKind> + Send + Sync>;

/// Maps type discriminators to action constructors
#[derive(Clone)]
pub struct ActionRegistry {
    factories: HashMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// Registry without any action types
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in action types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(action_types::GROUP, build_group);
        registry.register(action_types::ITERATE, build_iterate);
        registry.register(action_types::RAISE_ERROR, build_raise_error);
        registry.register(action_types::SET_VARIABLE, build_set_variable);
        registry
    }

    /// Register a constructor, replacing any previous one for the type
    pub fn register<F>(&mut self, action_type: impl Into<String>, factory: F)
    where
        F: Fn(&ActionConfig, &ActionBuilder) -> ConfigResult<ActionKind> + Send + Sync + 'static,
    {
        let action_type = action_type.into();
        debug!(action_type = %action_type, "Registering action type");
        self.factories.insert(action_type, Arc::new(factory));
    }

    /// Register a handler that needs no settings under its own type name
    pub fn register_handler(&mut self, handler: Arc<dyn ActionHandler>) {
        let action_type = handler.type_name().to_string();
        self.register(action_type, move |_, _| {
            Ok(ActionKind::External(Arc::clone(&handler)))
        });
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.factories.contains_key(action_type)
    }

    /// Registered type names, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub(crate) fn build_kind(
        &self,
        config: &ActionConfig,
        builder: &ActionBuilder,
    ) -> ConfigResult<ActionKind> {
        let factory =
            self.factories
                .get(&config.action_type)
                .ok_or_else(|| ConfigError::UnknownActionType {
                    action_type: config.action_type.clone(),
                    alias: config.alias.clone(),
                })?;
        factory(config, builder)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("types", &self.types())
            .finish()
    }
}

fn build_group(config: &ActionConfig, builder: &ActionBuilder) -> ConfigResult<ActionKind> {
    let actions = builder.build_all(&config.child_actions("actions")?)?;
    Ok(ActionKind::Group(GroupAction::new(
        actions,
        config.flag("parallel")?,
    )))
}

fn build_iterate(config: &ActionConfig, builder: &ActionBuilder) -> ConfigResult<ActionKind> {
    let providers = builder.providers();
    let actions = builder.build_all(&config.child_actions("actions")?)?;
    let mut iterate = IterateAction::new(providers.typed(config.required("list")?)?, actions);

    if let Some(start) = config.setting("startIndex") {
        iterate = iterate.with_start_index(providers.integer(start)?);
    }
    if let Some(end) = config.setting("endIndex") {
        iterate = iterate.with_end_index(providers.integer(end)?);
    }
    if let Some(reverse) = config.setting("reverse") {
        iterate = iterate.with_reverse(providers.condition(reverse)?);
    }
    if let Some(condition) = config.setting("doWhile") {
        iterate = iterate.with_do_while(providers.condition(condition)?);
    }
    Ok(ActionKind::Iterate(iterate))
}

fn build_raise_error(config: &ActionConfig, builder: &ActionBuilder) -> ConfigResult<ActionKind> {
    let error = builder
        .providers()
        .configured_error(config.required("error")?)?;
    Ok(ActionKind::RaiseError(RaiseErrorAction::new(error)))
}

fn build_set_variable(config: &ActionConfig, builder: &ActionBuilder) -> ConfigResult<ActionKind> {
    let providers = builder.providers();
    let property_name = config.required("propertyName")?;
    if let Some(name) = property_name.as_str() {
        if !ae_core::is_valid_property_name(name) {
            return Err(ConfigError::invalid(
                config.key("propertyName"),
                ae_core::INVALID_PROPERTY_NAME_MESSAGE,
            ));
        }
    }

    let value = match config.setting("value") {
        Some(value) => providers.value(value)?,
        None => StaticProvider::<Value>::new(Value::Null).boxed(),
    };
    let mut action = SetVariableAction::new(providers.typed(property_name)?, value);
    if let Some(path) = config.setting("path") {
        action = action.with_path(providers.typed(path)?);
    }
    Ok(ActionKind::SetVariable(action))
}
