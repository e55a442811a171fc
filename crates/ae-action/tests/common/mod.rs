//! Shared builders and test handlers for action tests

#![allow(dead_code)]

use ae_action::{Action, ActionHandler, ActionKind, GroupAction, HandlerError, RaiseErrorAction};
use ae_action::{IterateAction, SetVariableAction};
use ae_core::{AutomationData, ConfiguredError, ExternalData, ObjectPath, Value};
use ae_provider::{BoxProvider, ObjectPathLookup, ProviderExt, StaticProvider, Typed};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn ctx() -> Arc<AutomationData> {
    Arc::new(AutomationData::new(Value::Null))
}

pub fn literal<T>(value: impl Into<T>) -> BoxProvider<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    StaticProvider::<T>::new(value).boxed()
}

pub fn lookup(path: &str) -> BoxProvider<Value> {
    ObjectPathLookup::new(path).boxed()
}

pub fn error(code: &str) -> ConfiguredError {
    ConfiguredError::new(code, "Test error", format!("{code} was raised"), 400)
}

pub fn raise(alias: &str, code: &str) -> Action {
    Action::new(
        "Raise",
        alias,
        ActionKind::RaiseError(RaiseErrorAction::new(literal(error(code)))),
    )
}

pub fn set_var(alias: &str, name: &str, value: impl Into<Value>) -> Action {
    set_var_from(alias, name, literal(value.into()))
}

pub fn set_var_from(alias: &str, name: &str, value: BoxProvider<Value>) -> Action {
    Action::new(
        "Set variable",
        alias,
        ActionKind::SetVariable(SetVariableAction::new(literal(name), value)),
    )
}

pub fn group(alias: &str, actions: Vec<Action>, parallel: bool) -> Action {
    let actions = actions.into_iter().map(Arc::new).collect();
    Action::new(
        "Group",
        alias,
        ActionKind::Group(GroupAction::new(actions, parallel)),
    )
}

pub fn iterate(list: Vec<Value>, actions: Vec<Action>) -> IterateAction {
    IterateAction::new(literal(list), actions.into_iter().map(Arc::new).collect())
}

pub fn iterate_action(alias: &str, iterate: IterateAction) -> Action {
    Action::new("Iterate", alias, ActionKind::Iterate(iterate))
}

pub fn as_list(path: &str) -> BoxProvider<Vec<Value>> {
    Typed::<Vec<Value>>::new(lookup(path)).boxed()
}

pub async fn variable(ctx: &AutomationData, name: &str) -> Option<Value> {
    ctx.lookup(&ObjectPath::from_segments(["variables", name]))
        .await
}

/// Sleeps, then records the order in which it finished
#[derive(Debug)]
pub struct Sleep {
    pub name: String,
    pub duration: Duration,
    pub finished: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ActionHandler for Sleep {
    fn type_name(&self) -> &str {
        "sleep"
    }

    fn is_read_only(&self) -> bool {
        true
    }

    async fn handle(
        &self,
        _ctx: &AutomationData,
        output: &mut ExternalData,
    ) -> Result<(), HandlerError> {
        tokio::time::sleep(self.duration).await;
        self.finished.lock().unwrap().push(self.name.clone());
        output.output = Some(Value::from(self.name.as_str()));
        Ok(())
    }
}

pub fn sleep(alias: &str, millis: u64, finished: &Arc<Mutex<Vec<String>>>) -> Action {
    Action::new(
        "Sleep",
        alias,
        ActionKind::External(Arc::new(Sleep {
            name: alias.to_string(),
            duration: Duration::from_millis(millis),
            finished: Arc::clone(finished),
        })),
    )
}

/// Records the value found at a path each time it runs
#[derive(Debug)]
pub struct Record {
    pub path: ObjectPath,
    pub seen: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl ActionHandler for Record {
    fn type_name(&self) -> &str {
        "record"
    }

    fn is_read_only(&self) -> bool {
        true
    }

    async fn handle(
        &self,
        ctx: &AutomationData,
        _output: &mut ExternalData,
    ) -> Result<(), HandlerError> {
        let value = ctx.lookup(&self.path).await.unwrap_or(Value::Null);
        self.seen.lock().unwrap().push(value);
        Ok(())
    }
}

pub fn record(alias: &str, path: &str, seen: &Arc<Mutex<Vec<Value>>>) -> Action {
    Action::new(
        "Record",
        alias,
        ActionKind::External(Arc::new(Record {
            path: ObjectPath::parse(path),
            seen: Arc::clone(seen),
        })),
    )
}

/// Panics instead of returning
#[derive(Debug)]
pub struct Panic;

#[async_trait]
impl ActionHandler for Panic {
    fn type_name(&self) -> &str {
        "panic"
    }

    async fn handle(
        &self,
        _ctx: &AutomationData,
        _output: &mut ExternalData,
    ) -> Result<(), HandlerError> {
        panic!("handler gave up")
    }
}

pub fn panicking(alias: &str) -> Action {
    Action::new("Panic", alias, ActionKind::External(Arc::new(Panic)))
}
