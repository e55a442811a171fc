//! Group action

use crate::action::Action;
use crate::runner::ActionRunner;
use ae_core::{ActionData, AutomationData, AutomationResult};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Runs its children sequentially or concurrently.
///
/// Sequential groups stop at the first child error. Parallel groups let every
/// child finish and then surface the first error in declaration order. An
/// empty group succeeds immediately.
#[derive(Debug)]
pub struct GroupAction {
    actions: Vec<Arc<Action>>,
    parallel: bool,
}

impl GroupAction {
    pub fn new(actions: Vec<Arc<Action>>, parallel: bool) -> Self {
        Self { actions, parallel }
    }

    pub fn sequential(actions: Vec<Arc<Action>>) -> Self {
        Self::new(actions, false)
    }

    pub fn parallel(actions: Vec<Arc<Action>>) -> Self {
        Self::new(actions, true)
    }

    pub fn actions(&self) -> &[Arc<Action>] {
        &self.actions
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub(crate) async fn run(
        &self,
        ctx: &Arc<AutomationData>,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        debug!(
            children = self.actions.len(),
            parallel = self.parallel,
            "Running group"
        );

        let runner = ActionRunner::new();
        let mut children = IndexMap::new();
        let result = if self.parallel {
            runner.run_parallel(ctx, &self.actions, &mut children).await
        } else {
            runner.run_sequence(ctx, &self.actions, &mut children).await
        };

        if let Some(group) = data.group_mut() {
            group.children = children;
        }
        result
    }
}
