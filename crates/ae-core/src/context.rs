//! Shared execution context for one automation run

use crate::error::{codes, AutomationResult};
use crate::path::ObjectPath;
use crate::roots;
use crate::value::Value;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use ulid::Ulid;

/// State shared by every provider resolution and action execution in a run.
///
/// The trigger payload is read-only. Variables and the action registry are
/// only mutated through [`AutomationData::set_variable`] and
/// [`AutomationData::publish_action`], which serialize writers behind a lock
/// so parallel children cannot lose each other's updates.
#[derive(Debug)]
pub struct AutomationData {
    run_id: String,
    trigger: Value,
    variables: RwLock<IndexMap<String, Value>>,
    actions: RwLock<IndexMap<String, Value>>,
    services: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    cancellation: CancellationToken,
}

impl AutomationData {
    /// Create a context for a run started by the given trigger payload
    pub fn new(trigger: impl Into<Value>) -> Self {
        Self {
            run_id: Ulid::new().to_string(),
            trigger: trigger.into(),
            variables: RwLock::new(IndexMap::new()),
            actions: RwLock::new(IndexMap::new()),
            services: DashMap::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Seed the variable store
    pub fn with_variables(mut self, variables: IndexMap<String, Value>) -> Self {
        self.variables = RwLock::new(variables);
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Make a service available to actions and providers
    pub fn with_service<T: Any + Send + Sync>(self, service: Arc<T>) -> Self {
        self.services.insert(TypeId::of::<T>(), service);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn trigger(&self) -> &Value {
        &self.trigger
    }

    /// Look up a registered service by type
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().clone().downcast::<T>().ok())
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cooperative cancellation check, made between children and iterations
    pub fn ensure_not_cancelled(&self, alias: &str) -> AutomationResult<()> {
        if self.is_cancelled() {
            debug!(alias, "Run cancelled");
            return Err(codes::action_cancelled(alias));
        }
        Ok(())
    }

    /// Copy of the current variables
    pub async fn variables(&self) -> IndexMap<String, Value> {
        self.variables.read().await.clone()
    }

    /// Snapshot of an action's data, by alias
    pub async fn action(&self, alias: &str) -> Option<Value> {
        self.actions.read().await.get(alias).cloned()
    }

    /// Publish an action data snapshot under its alias
    pub async fn publish_action(&self, alias: &str, snapshot: Value) {
        trace!(alias, "Publishing action data");
        self.actions.write().await.insert(alias.to_string(), snapshot);
    }

    /// Resolve a path against `{ trigger, variables, actions }`
    pub async fn lookup(&self, path: &ObjectPath) -> Option<Value> {
        let Some((root, rest)) = path.split_first() else {
            return Some(self.to_value().await);
        };
        match root {
            roots::TRIGGER => self.trigger.lookup(rest),
            roots::VARIABLES => {
                let variables = self.variables.read().await;
                lookup_in_map(&variables, rest)
            }
            roots::ACTIONS => {
                let actions = self.actions.read().await;
                lookup_in_map(&actions, rest)
            }
            _ => None,
        }
    }

    /// Whole context as a value
    pub async fn to_value(&self) -> Value {
        let mut root = IndexMap::new();
        root.insert(roots::TRIGGER.to_string(), self.trigger.clone());
        root.insert(
            roots::VARIABLES.to_string(),
            Value::Object(self.variables.read().await.clone()),
        );
        root.insert(
            roots::ACTIONS.to_string(),
            Value::Object(self.actions.read().await.clone()),
        );
        Value::Object(root)
    }

    /// Write a variable, creating missing intermediate objects along `path`.
    ///
    /// Fails with `automation.action.set.variable.failed` when a segment of
    /// the path already holds a non-object value.
    pub async fn set_variable(
        &self,
        property_name: &str,
        path: Option<&ObjectPath>,
        value: Value,
    ) -> AutomationResult<()> {
        let segments = path.map(ObjectPath::segments).unwrap_or_default();
        let mut variables = self.variables.write().await;
        let target = container_at(&mut variables, segments).map_err(|reason| {
            codes::set_variable_failed(
                property_name,
                &path.map(ToString::to_string).unwrap_or_default(),
                reason,
            )
        })?;
        debug!(property_name, path = ?path.map(ToString::to_string), "Setting variable");
        target.insert(property_name.to_string(), value);
        Ok(())
    }
}

fn lookup_in_map(map: &IndexMap<String, Value>, segments: &[String]) -> Option<Value> {
    match segments.split_first() {
        None => Some(Value::Object(map.clone())),
        Some((first, rest)) => map.get(first)?.lookup(rest),
    }
}

fn container_at<'a>(
    root: &'a mut IndexMap<String, Value>,
    segments: &[String],
) -> Result<&'a mut IndexMap<String, Value>, String> {
    let mut current = root;
    for segment in segments {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(Value::object);
        current = match entry {
            Value::Object(map) => map,
            other => {
                return Err(format!(
                    "\"{}\" holds a {} value and cannot contain properties",
                    segment,
                    other.type_name()
                ))
            }
        };
    }
    Ok(current)
}
