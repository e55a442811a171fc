//! Action runner
//!
//! Drives one action through its lifecycle:
//!
//! ```text
//! Started → (run condition false) → Skipped
//!         → BeforeRunErrorChecking → Running → AfterRunErrorChecking → Completed
//! ```
//!
//! Any error raised along the way is recorded on the action data. If the
//! action has error actions they run in order; the error is absorbed when
//! they all succeed and replaced by the handler's error otherwise.
//!
//! Action data reaches the context's registry only once the action is in a
//! terminal state, so parallel siblings never see each other mid-run. The one
//! exception is an iterate action, which publishes its own progress so nested
//! actions can read the current item.

use crate::action::{Action, ErrorCondition};
use ae_core::{codes, ActionData, ActionState, AutomationData, AutomationResult, ConfiguredError};
use futures::future::{join_all, BoxFuture};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, debug_span, trace, Instrument};

/// Executes actions against a shared context
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionRunner;

impl ActionRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run one action, filling in the caller-owned data.
    ///
    /// Returns the error that escaped the action: either its own error when no
    /// error actions are configured, or the failure of an error action.
    pub fn handle_action<'a>(
        &'a self,
        ctx: &'a Arc<AutomationData>,
        action: &'a Action,
        data: &'a mut ActionData,
    ) -> BoxFuture<'a, AutomationResult<()>> {
        let span = debug_span!(
            "action",
            alias = %action.alias,
            action_type = %action.action_type(),
            run_id = %ctx.run_id()
        );

        Box::pin(
            async move {
                let result = match self.run_lifecycle(ctx, action, data).await {
                    Ok(()) => Ok(()),
                    Err(error) => self.intercept_error(ctx, action, data, error).await,
                };
                ctx.publish_action(&action.alias, data.to_value()).await;
                result
            }
            .instrument(span),
        )
    }

    /// Run actions one after another, stopping at the first escaped error
    pub async fn run_sequence(
        &self,
        ctx: &Arc<AutomationData>,
        actions: &[Arc<Action>],
        records: &mut IndexMap<String, ActionData>,
    ) -> AutomationResult<()> {
        for action in actions {
            let mut data = action.create_action_data();
            let result = self.handle_action(ctx, action, &mut data).await;
            records.insert(action.alias.clone(), data);
            result?;
        }
        Ok(())
    }

    /// Run actions concurrently and wait for all of them.
    ///
    /// Every action runs to completion even if a sibling fails. Records keep
    /// declaration order and the first error in that order is returned.
    pub async fn run_parallel(
        &self,
        ctx: &Arc<AutomationData>,
        actions: &[Arc<Action>],
        records: &mut IndexMap<String, ActionData>,
    ) -> AutomationResult<()> {
        let handles = actions.iter().map(|action| {
            let ctx = Arc::clone(ctx);
            let action = Arc::clone(action);
            let runner = *self;
            tokio::spawn(
                async move {
                    let mut data = action.create_action_data();
                    let result = runner.handle_action(&ctx, &action, &mut data).await;
                    (data, result)
                }
                .in_current_span(),
            )
        });
        let outcomes = join_all(handles).await;

        let mut first_error = None;
        for (action, outcome) in actions.iter().zip(outcomes) {
            let (data, result) = match outcome {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let error = codes::action_failed(&action.alias, join_error);
                    let mut data = action.create_action_data();
                    data.record_error(error.clone());
                    data.finish(false);
                    (data, Err(error))
                }
            };
            records.insert(action.alias.clone(), data);
            if let Err(error) = result {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn run_lifecycle(
        &self,
        ctx: &Arc<AutomationData>,
        action: &Action,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        data.transition(ActionState::Started)?;
        ctx.ensure_not_cancelled(&action.alias)?;

        if let Some(condition) = &action.run_condition {
            if !condition.resolve(ctx).await? {
                debug!("Run condition not met, skipping");
                data.transition(ActionState::Skipped)?;
                data.succeeded = true;
                return Ok(());
            }
        }

        data.transition(ActionState::BeforeRunErrorChecking)?;
        check_error_conditions(ctx, &action.before_run_error_conditions).await?;

        data.transition(ActionState::Running)?;
        trace!("Running action");
        action.execute(ctx, data, true).await?;

        data.transition(ActionState::AfterRunErrorChecking)?;
        check_error_conditions(ctx, &action.after_run_error_conditions).await?;

        data.transition(ActionState::Completed)?;
        data.succeeded = true;
        debug!("Action completed");
        Ok(())
    }

    async fn intercept_error(
        &self,
        ctx: &Arc<AutomationData>,
        action: &Action,
        data: &mut ActionData,
        error: ConfiguredError,
    ) -> AutomationResult<()> {
        debug!(code = %error.code, state = ?data.state, "Action raised an error");
        data.record_error(error.clone());
        data.finish(false);

        if action.error_actions.is_empty() {
            return Err(error);
        }

        // error actions observe the failed action through the registry
        ctx.publish_action(&action.alias, data.to_value()).await;
        debug!(count = action.error_actions.len(), "Running error actions");
        let mut records = IndexMap::new();
        let handled = self
            .run_sequence(ctx, &action.error_actions, &mut records)
            .await;
        data.error_actions = records;

        match handled {
            Ok(()) => {
                debug!(code = %error.code, "Error handled by error actions");
                Ok(())
            }
            Err(handler_error) => {
                debug!(code = %handler_error.code, "Error action failed");
                Err(handler_error)
            }
        }
    }
}

/// Raise the error of the first condition that holds
async fn check_error_conditions(
    ctx: &AutomationData,
    conditions: &[ErrorCondition],
) -> AutomationResult<()> {
    for condition in conditions {
        if let Some(error) = condition.check(ctx).await? {
            return Err(error);
        }
    }
    Ok(())
}
