//! Action configuration
//!
//! An [`Action`] is immutable once built and may be shared by many concurrent
//! runs. Everything that changes during a run lives in the caller-owned
//! [`ActionData`].

use crate::group::GroupAction;
use crate::iterate::IterateAction;
use crate::raise_error::RaiseErrorAction;
use crate::set_variable::SetVariableAction;
use ae_core::{
    codes, ActionData, ActionDetail, ActionState, AutomationData, AutomationResult,
    ConfiguredError, ExternalData, GroupData, IterateData, SetVariableData,
};
use ae_provider::BoxProvider;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Type names of the built-in actions
pub mod action_types {
    pub const GROUP: &str = "group";
    pub const ITERATE: &str = "iterate";
    pub const RAISE_ERROR: &str = "raiseError";
    pub const SET_VARIABLE: &str = "setVariable";
}

/// A condition that, when true, raises the paired error
#[derive(Debug, Clone)]
pub struct ErrorCondition {
    pub condition: BoxProvider<bool>,
    pub error: BoxProvider<ConfiguredError>,
}

impl ErrorCondition {
    pub fn new(condition: BoxProvider<bool>, error: BoxProvider<ConfiguredError>) -> Self {
        Self { condition, error }
    }

    /// Resolve the error if the condition holds
    pub async fn check(&self, ctx: &AutomationData) -> AutomationResult<Option<ConfiguredError>> {
        if !self.condition.resolve(ctx).await? {
            return Ok(None);
        }
        Ok(Some(self.error.resolve(ctx).await?))
    }
}

/// Failure reported by an [`ActionHandler`]
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Business error, surfaced unchanged
    #[error(transparent)]
    Configured(#[from] ConfiguredError),

    /// Anything else, wrapped as `automation.action.failed`
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Logic of an action type implemented outside this crate.
///
/// Handlers are shared between runs and must keep per-run state in the
/// [`ExternalData`] they are handed.
#[async_trait]
pub trait ActionHandler: Send + Sync + Debug {
    /// Type name recorded in the action data
    fn type_name(&self) -> &str;

    /// Whether the handler never writes to the context or the outside world
    fn is_read_only(&self) -> bool {
        false
    }

    async fn handle(
        &self,
        ctx: &AutomationData,
        output: &mut ExternalData,
    ) -> Result<(), HandlerError>;
}

/// Type-specific configuration of an action
#[derive(Debug)]
pub enum ActionKind {
    Group(GroupAction),
    Iterate(IterateAction),
    RaiseError(RaiseErrorAction),
    SetVariable(SetVariableAction),
    External(Arc<dyn ActionHandler>),
}

impl ActionKind {
    pub fn type_name(&self) -> &str {
        match self {
            ActionKind::Group(_) => action_types::GROUP,
            ActionKind::Iterate(_) => action_types::ITERATE,
            ActionKind::RaiseError(_) => action_types::RAISE_ERROR,
            ActionKind::SetVariable(_) => action_types::SET_VARIABLE,
            ActionKind::External(handler) => handler.type_name(),
        }
    }

    fn create_detail(&self) -> ActionDetail {
        match self {
            ActionKind::Group(group) => ActionDetail::Group(GroupData {
                parallel: group.is_parallel(),
                ..Default::default()
            }),
            ActionKind::Iterate(_) => ActionDetail::Iterate(IterateData::default()),
            ActionKind::RaiseError(_) => ActionDetail::RaiseError,
            ActionKind::SetVariable(_) => ActionDetail::SetVariable(SetVariableData::default()),
            ActionKind::External(_) => ActionDetail::External(ExternalData::default()),
        }
    }
}

/// Immutable configuration of one action
#[derive(Debug)]
pub struct Action {
    pub name: String,

    /// Unique among siblings; the key under which the action's data is published
    pub alias: String,

    pub description: Option<String>,

    /// Informational only; parallelism is decided by the enclosing group
    pub asynchronous: bool,

    pub run_condition: Option<BoxProvider<bool>>,

    pub before_run_error_conditions: Vec<ErrorCondition>,

    pub after_run_error_conditions: Vec<ErrorCondition>,

    pub error_actions: Vec<Arc<Action>>,

    pub kind: ActionKind,
}

impl Action {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            description: None,
            asynchronous: false,
            run_condition: None,
            before_run_error_conditions: Vec::new(),
            after_run_error_conditions: Vec::new(),
            error_actions: Vec::new(),
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_asynchronous(mut self, asynchronous: bool) -> Self {
        self.asynchronous = asynchronous;
        self
    }

    pub fn with_run_condition(mut self, condition: BoxProvider<bool>) -> Self {
        self.run_condition = Some(condition);
        self
    }

    pub fn with_before_run_error_condition(mut self, condition: ErrorCondition) -> Self {
        self.before_run_error_conditions.push(condition);
        self
    }

    pub fn with_after_run_error_condition(mut self, condition: ErrorCondition) -> Self {
        self.after_run_error_conditions.push(condition);
        self
    }

    pub fn with_error_actions(mut self, actions: Vec<Arc<Action>>) -> Self {
        self.error_actions = actions;
        self
    }

    pub fn action_type(&self) -> &str {
        self.kind.type_name()
    }

    /// Fresh, not-started execution record for this action
    pub fn create_action_data(&self) -> ActionData {
        ActionData::new(
            &self.name,
            &self.alias,
            self.action_type(),
            self.kind.create_detail(),
        )
    }

    /// True when this action and everything nested in it never writes.
    ///
    /// Composite actions are read-only only if every child and every error
    /// action is.
    pub fn is_read_only(&self) -> bool {
        let own = match &self.kind {
            ActionKind::Group(group) => group.actions().iter().all(|a| a.is_read_only()),
            ActionKind::Iterate(iterate) => iterate.actions().iter().all(|a| a.is_read_only()),
            ActionKind::RaiseError(_) | ActionKind::SetVariable(_) => true,
            ActionKind::External(handler) => handler.is_read_only(),
        };
        own && self.error_actions.iter().all(|a| a.is_read_only())
    }

    /// Run this action's type-specific logic.
    ///
    /// With `is_internal` set the caller is the [`ActionRunner`], which owns
    /// the lifecycle; only the action's own behavior runs. Otherwise the
    /// action drives a minimal lifecycle of its own (no run condition, no
    /// error conditions, no error actions), publishes its data and reports
    /// the outcome.
    ///
    /// [`ActionRunner`]: crate::ActionRunner
    pub fn execute<'a>(
        &'a self,
        ctx: &'a Arc<AutomationData>,
        data: &'a mut ActionData,
        is_internal: bool,
    ) -> BoxFuture<'a, AutomationResult<()>> {
        Box::pin(async move {
            if is_internal {
                return self.run_kind(ctx, data).await;
            }

            let result = self.run_direct(ctx, data).await;
            if let Err(error) = &result {
                data.record_error(error.clone());
                data.finish(false);
            }
            ctx.publish_action(&self.alias, data.to_value()).await;
            result
        })
    }

    async fn run_direct(
        &self,
        ctx: &Arc<AutomationData>,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        data.transition(ActionState::Started)?;
        data.transition(ActionState::BeforeRunErrorChecking)?;
        data.transition(ActionState::Running)?;
        self.run_kind(ctx, data).await?;
        data.transition(ActionState::AfterRunErrorChecking)?;
        data.transition(ActionState::Completed)?;
        data.succeeded = true;
        Ok(())
    }

    async fn run_kind(&self, ctx: &Arc<AutomationData>, data: &mut ActionData) -> AutomationResult<()> {
        match &self.kind {
            ActionKind::Group(group) => group.run(ctx, data).await,
            ActionKind::Iterate(iterate) => iterate.run(ctx, &self.alias, data).await,
            ActionKind::RaiseError(raise) => raise.run(ctx, data).await,
            ActionKind::SetVariable(set) => set.run(ctx, data).await,
            ActionKind::External(handler) => self.run_handler(handler.as_ref(), ctx, data).await,
        }
    }

    async fn run_handler(
        &self,
        handler: &dyn ActionHandler,
        ctx: &AutomationData,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        let mut output = ExternalData::default();
        let result = AssertUnwindSafe(handler.handle(ctx, &mut output))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Unexpected(panic_error(panic))));
        if let Some(slot) = data.external_mut() {
            *slot = output;
        }

        result.map_err(|e| match e {
            HandlerError::Configured(error) => error,
            HandlerError::Unexpected(error) => {
                warn!(alias = %self.alias, error = %error, "Action failed unexpectedly");
                codes::action_failed(&self.alias, format!("{error:#}"))
            }
        })
    }
}

/// A handler panic, reported like any other unexpected failure
fn panic_error(panic: Box<dyn Any + Send>) -> anyhow::Error {
    let message = panic
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow::anyhow!("handler panicked: {message}")
}

/// First alias that occurs more than once among siblings, if any
pub fn duplicate_alias(actions: &[Arc<Action>]) -> Option<&str> {
    let mut seen = HashSet::new();
    actions
        .iter()
        .map(|action| action.alias.as_str())
        .find(|alias| !seen.insert(*alias))
}
