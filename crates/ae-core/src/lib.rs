//! Core types for the automation engine
//!
//! This crate provides the fundamental types shared by providers and actions:
//! the [`Value`] model, [`ConfiguredError`], the [`ActionState`] lifecycle,
//! the per-run [`ActionData`] record and the shared [`AutomationData`] context.

mod action_data;
mod context;
mod error;
mod path;
mod state;
mod value;

pub use action_data::{
    ActionData, ActionDetail, ExternalData, GroupData, IterateData, IterationItem,
    IterationRecord, SetVariableData,
};
pub use context::AutomationData;
pub use error::{codes, AutomationResult, ConfiguredError};
pub use path::{is_valid_property_name, ObjectPath, INVALID_PROPERTY_NAME_MESSAGE};
pub use state::{ActionState, InvalidTransition};
pub use value::{FileValue, Value};

/// Root keys of the object exposed to path lookups
pub mod roots {
    /// Trigger payload of the run
    pub const TRIGGER: &str = "trigger";

    /// Variables written by set-variable actions
    pub const VARIABLES: &str = "variables";

    /// Action data snapshots keyed by alias
    pub const ACTIONS: &str = "actions";
}
