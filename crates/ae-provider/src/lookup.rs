//! Object path lookups into the run context

use crate::error::{ProviderError, ProviderResult};
use crate::provider::Provider;
use ae_core::{AutomationData, ObjectPath, Value};
use async_trait::async_trait;
use tracing::trace;

/// Resolves the value at a path of `{ trigger, variables, actions }`
#[derive(Debug, Clone)]
pub struct ObjectPathLookup {
    path: ObjectPath,
    default: Option<Value>,
}

impl ObjectPathLookup {
    pub fn new(path: impl Into<ObjectPath>) -> Self {
        Self {
            path: path.into(),
            default: None,
        }
    }

    /// Value used when nothing exists at the path
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }
}

#[async_trait]
impl Provider<Value> for ObjectPathLookup {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<Value> {
        let found = ctx.lookup(&self.path).await;
        trace!(path = %self.path, found = found.is_some(), "Object path lookup");
        match (found, &self.default) {
            (Some(value), _) => Ok(value),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) => Err(ProviderError::PathNotFound {
                path: self.path.to_string(),
            }),
        }
    }
}

/// Whether a non-null value exists at a path
#[derive(Debug, Clone)]
pub struct ObjectPathLookupExists {
    path: ObjectPath,
}

impl ObjectPathLookupExists {
    pub fn new(path: impl Into<ObjectPath>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Provider<bool> for ObjectPathLookupExists {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        Ok(ctx
            .lookup(&self.path)
            .await
            .is_some_and(|value| !value.is_null()))
    }
}
