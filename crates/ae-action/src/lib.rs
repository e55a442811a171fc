//! Action Engine
//!
//! This crate executes trees of configured actions against a shared
//! [`AutomationData`] context. Each action runs through a lifecycle driven by
//! the [`ActionRunner`]: run condition, before-run error conditions, the
//! action's own logic, after-run error conditions, and error interception
//! with the action's error-handling actions.
//!
//! # Action Types
//!
//! - Group (sequential or parallel children)
//! - Iterate (nested actions once per list item)
//! - Raise error
//! - Set variable
//! - External actions implemented through [`ActionHandler`]
//!
//! # Key Types
//!
//! - [`Action`] - Immutable action configuration
//! - [`ActionRunner`] - Drives the lifecycle of one action execution
//! - [`Automation`] - A named list of top-level actions
//!
//! [`AutomationData`]: ae_core::AutomationData

pub mod action;
pub mod automation;
pub mod group;
pub mod iterate;
pub mod raise_error;
pub mod runner;
pub mod set_variable;

pub use action::{
    action_types, duplicate_alias, Action, ActionHandler, ActionKind, ErrorCondition,
    HandlerError,
};
pub use automation::{Automation, AutomationOutcome};
pub use group::GroupAction;
pub use iterate::{IterateAction, IterationRange};
pub use raise_error::RaiseErrorAction;
pub use runner::ActionRunner;
pub use set_variable::SetVariableAction;
