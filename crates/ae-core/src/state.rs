//! Action lifecycle state machine
//!
//! Enforces valid state transitions for one action execution:
//!
//! ```text
//! NotStarted → Started → BeforeRunErrorChecking → Running → AfterRunErrorChecking → Completed
//!                     ↘ Skipped (run condition false)
//!
//! Started/BeforeRunErrorChecking/Running/AfterRunErrorChecking → Completed (on error)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of an action execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActionState {
    #[default]
    NotStarted,
    Started,
    Skipped,
    BeforeRunErrorChecking,
    Running,
    AfterRunErrorChecking,
    Completed,
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid state transition from {from:?} to {to:?}: {reason}")]
pub struct InvalidTransition {
    pub from: ActionState,
    pub to: ActionState,
    pub reason: &'static str,
}

impl ActionState {
    /// Attempt a transition to a new state.
    pub fn try_transition(self, to: ActionState) -> Result<ActionState, InvalidTransition> {
        use ActionState::*;

        let valid = match (self, to) {
            (NotStarted, Started) => true,

            (Started, Skipped) => true,
            (Started, BeforeRunErrorChecking) => true,
            (BeforeRunErrorChecking, Running) => true,
            (Running, AfterRunErrorChecking) => true,
            (AfterRunErrorChecking, Completed) => true,

            // Error paths
            (Started, Completed) => true,
            (BeforeRunErrorChecking, Completed) => true,
            (Running, Completed) => true,

            (Skipped, _) => false,
            (Completed, _) => false,

            _ => false,
        };

        if valid {
            Ok(to)
        } else {
            Err(InvalidTransition {
                from: self,
                to,
                reason: Self::transition_error_reason(self, to),
            })
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition_to(self, to: ActionState) -> bool {
        self.try_transition(to).is_ok()
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::Skipped | ActionState::Completed)
    }

    fn transition_error_reason(from: ActionState, to: ActionState) -> &'static str {
        use ActionState::*;

        match (from, to) {
            (Completed, _) => "Completed is terminal",
            (Skipped, _) => "Skipped is terminal",
            (NotStarted, _) => "Action must be started first",
            (_, Skipped) => "Only a started action can be skipped",
            (Started, Running) => "Before-run error checking must happen first",
            (Running, Running) => "Action is already running",
            _ => "Invalid state transition",
        }
    }
}
