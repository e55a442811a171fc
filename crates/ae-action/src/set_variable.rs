//! Set-variable action

use ae_core::{
    is_valid_property_name, ActionData, AutomationData, AutomationResult, ObjectPath, Value,
};
use ae_provider::{BoxProvider, ProviderError};

/// Writes a value into the run's variables, optionally beneath a path.
///
/// Missing objects along the path are created. Writing beneath a non-object
/// value fails with `automation.action.set.variable.failed`.
#[derive(Debug)]
pub struct SetVariableAction {
    property_name: BoxProvider<String>,
    value: BoxProvider<Value>,
    path: Option<BoxProvider<String>>,
}

impl SetVariableAction {
    pub fn new(property_name: BoxProvider<String>, value: BoxProvider<Value>) -> Self {
        Self {
            property_name,
            value,
            path: None,
        }
    }

    pub fn with_path(mut self, path: BoxProvider<String>) -> Self {
        self.path = Some(path);
        self
    }

    pub(crate) async fn run(
        &self,
        ctx: &AutomationData,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        let property_name = self.property_name.resolve(ctx).await?;
        if !is_valid_property_name(&property_name) {
            return Err(ProviderError::InvalidPropertyName {
                name: property_name,
            }
            .into());
        }

        let path = match &self.path {
            Some(path) => Some(path.resolve(ctx).await?),
            None => None,
        };
        let value = self.value.resolve(ctx).await?;

        if let Some(detail) = data.set_variable_mut() {
            detail.property_name = Some(property_name.clone());
            detail.path = path.clone();
            detail.value = Some(value.clone());
        }

        let path = path.as_deref().map(ObjectPath::parse);
        ctx.set_variable(&property_name, path.as_ref(), value).await
    }
}
