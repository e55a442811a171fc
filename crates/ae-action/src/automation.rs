//! Automation definitions

use crate::action::Action;
use crate::runner::ActionRunner;
use ae_core::{ActionData, AutomationData, ConfiguredError};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// A named, ordered list of top-level actions run sequentially
#[derive(Debug)]
pub struct Automation {
    pub name: String,
    pub actions: Vec<Arc<Action>>,
}

/// Result of one automation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationOutcome {
    pub run_id: String,

    /// Top-level action records keyed by alias
    pub actions: IndexMap<String, ActionData>,

    /// The error that escaped the top-level actions, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ConfiguredError>,
}

impl AutomationOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

impl Automation {
    pub fn new(name: impl Into<String>, actions: Vec<Arc<Action>>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    /// Whether no action in the automation writes anything
    pub fn is_read_only(&self) -> bool {
        self.actions.iter().all(|action| action.is_read_only())
    }

    /// Run every top-level action in order, stopping at the first error
    pub async fn run(&self, ctx: &Arc<AutomationData>) -> AutomationOutcome {
        info!(automation = %self.name, run_id = %ctx.run_id(), "Starting automation run");

        let mut actions = IndexMap::new();
        let result = ActionRunner::new()
            .run_sequence(ctx, &self.actions, &mut actions)
            .await;

        let error = match result {
            Ok(()) => {
                info!(automation = %self.name, "Automation run completed");
                None
            }
            Err(error) => {
                warn!(
                    automation = %self.name,
                    code = %error.code,
                    "Automation run ended with an unhandled error"
                );
                Some(error)
            }
        };

        AutomationOutcome {
            run_id: ctx.run_id().to_string(),
            actions,
            error,
        }
    }
}
